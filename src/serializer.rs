//! 过滤 [`Part`] 序列的规范字符串
//!
//! 只保留语义结构，原输入中的空白和多余括号不会保留，
//! 但重新解析输出会得到相同的序列。

use crate::ast::{Connector, Part, Value};
use crate::masker::{escape_literal, QUOTE};

/// 一个未结束分组的序列化上下文
struct Context {
    connector: Connector,
    has_items: bool,
}

pub fn serialize_filters(parts: &[Part]) -> String {
    let mut tokens: Vec<String> = Vec::with_capacity(parts.len() * 2);
    // 顶层按 AND 上下文处理
    let mut stack = vec![Context {
        connector: Connector::And,
        has_items: false,
    }];

    for part in parts {
        match part {
            Part::OpenGroup(connector) => {
                push_item(&mut stack, &mut tokens);
                tokens.push("(".to_string());
                stack.push(Context {
                    connector: *connector,
                    has_items: false,
                });
            }
            Part::CloseGroup(_) => {
                tokens.push(")".to_string());
                if stack.len() > 1 {
                    stack.pop();
                }
            }
            Part::Leaf {
                field,
                value,
                operator,
            } => {
                push_item(&mut stack, &mut tokens);
                tokens.push(format!(
                    "{} {} {}",
                    field,
                    operator.keyword(),
                    serialize_value(value)
                ));
            }
        }
    }

    tokens.join(" ")
}

/// 当前上下文已有子项时先输出连接词
fn push_item(stack: &mut [Context], tokens: &mut Vec<String>) {
    if let Some(context) = stack.last_mut() {
        if context.has_items {
            tokens.push(context.connector.keyword().to_string());
        }
        context.has_items = true;
    }
}

/// 值类型转换的逆操作
pub fn serialize_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Int(n) => n.to_string(),
        Value::Float(n) => serialize_float(*n),
        Value::Str(s) => format!("{QUOTE}{}{QUOTE}", escape_literal(s)),
        Value::List(values) => values
            .iter()
            .map(serialize_value)
            .collect::<Vec<_>>()
            .join(","),
    }
}

/// 浮点数总是带小数部分，重新解析时仍是浮点数
fn serialize_float(n: f64) -> String {
    if !n.is_finite() {
        return format!("{QUOTE}{n}{QUOTE}");
    }
    let text = n.to_string();
    if text.contains(['.', 'e', 'E']) {
        text
    } else {
        format!("{text}.0")
    }
}
