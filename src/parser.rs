//! 过滤表达式的语法分析器
//!
//! ## 解析流程图
//!
//! ```text
//! parse_filters()
//!   ├─ StringMasker: 屏蔽单引号字面量 → '0', '1', ...
//!   └─ parse_parts()
//!        ├─ 不含括号 → parse_condition_string()
//!        └─ segment_brackets(): 按顶层括号切分为文本段 / 分组段
//!             ├─ 仅一个分组段 → 去掉括号后递归 parse_parts()
//!             └─ 逐段拼接扁平条件串
//!                  ├─ 分组段 → 递归 parse_parts()，结果存入分组表，
//!                  │           用占位符替换
//!                  ├─ 单独的 and / or → 作为连接词保留
//!                  └─ 粘在分组前后的连接词 → 拆出来单独保留
//!
//! parse_condition_string()
//!   ├─ 按 " or " 切分 (多于一支时包裹 OpenGroup(OR) … CloseGroup(OR))
//!   │    └─ 按 " and " 切分 (多于一支时包裹 OpenGroup(AND) … CloseGroup(AND))
//!   │         └─ parse_condition()
//!   │              ├─ 单个占位符 → 原样拼回分组表中的子序列
//!   │              └─ [not] field operator value...
//!   │                   └─ coerce_value() (列表展开为 OR 分组)
//! ```
//!
//! ## 语法优先级（从高到低）
//!
//! 1. **括号分组** `(expression)`
//! 2. **NOT** 只作用于单个条件，直接翻转运算符
//! 3. **AND**
//! 4. **OR**
//!
//! ## 解析示例
//!
//! ```text
//! a eq 'b' and (c eq 'd' or e gt 3)
//!   → OpenGroup(AND)
//!       Leaf(a = "b")
//!       OpenGroup(OR) Leaf(c = "d") Leaf(e > 3) CloseGroup(OR)
//!     CloseGroup(AND)
//!
//! not a gt 3   → Leaf(a <= 3)
//! a eq 1,2,3   → OpenGroup(OR) Leaf(a = 1) Leaf(a = 2) Leaf(a = 3) CloseGroup(OR)
//! ```

use crate::ast::{Connector, Operator, Part, Value};
use crate::coerce::coerce_value;
use crate::error::{ParseError, Result};
use crate::masker::{mask, quoted_inner, MaskedString, ESCAPE, GROUP_SENTINEL};
use log::{debug, trace};

const NOT: &str = "not";

/// 顶层括号切分出的一段
#[derive(Debug, Clone, Copy, PartialEq)]
enum Segment<'s> {
    /// 括号外的条件文本
    Text(&'s str),
    /// 括号分组，已去掉外层括号
    Group(&'s str),
}

/// 解析一个过滤表达式字符串。空字符串得到空序列。
pub fn parse_filters(input: &str) -> Result<Vec<Part>> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(Vec::new());
    }

    let masked = mask(input)?;
    let mut parser = FilterParser::new(&masked);
    let parts = parser.parse_parts(masked.as_str())?;

    debug!(
        "parsed filter expression ({} bytes, {} literal(s), {} group(s)) into {} part(s)",
        input.len(),
        masked.literal_count(),
        parser.groups.len(),
        parts.len()
    );
    Ok(parts)
}

pub struct FilterParser<'m> {
    masked: &'m MaskedString,
    /// 分组表：占位符序号 → 子序列，拼回时取走，每个子序列只使用一次
    groups: Vec<Option<Vec<Part>>>,
}

impl<'m> FilterParser<'m> {
    pub fn new(masked: &'m MaskedString) -> Self {
        Self {
            masked,
            groups: Vec::new(),
        }
    }

    /// 解析已屏蔽字面量的表达式（可含括号）
    pub fn parse_parts(&mut self, text: &str) -> Result<Vec<Part>> {
        if !text.contains(['(', ')']) {
            return self.parse_condition_string(text);
        }

        let segments = segment_brackets(text)?;
        trace!("segmented {:?} into {:?}", text, segments);

        // 整个输入就是一个分组，不需要占位符
        if let [Segment::Group(inner)] = segments.as_slice() {
            return self.parse_parts(inner);
        }

        let mut conditions: Vec<String> = Vec::new();
        let mut after_connector = true;

        for segment in segments {
            match segment {
                Segment::Text(text) => {
                    if let Some(connector) = as_connector(text) {
                        if after_connector {
                            return Err(ParseError::new(format!(
                                "unexpected connector '{}'",
                                connector.keyword()
                            )));
                        }
                        conditions.push(connector.keyword().to_string());
                        after_connector = true;
                        continue;
                    }

                    let mut text = text;

                    // 分组之后的连接词: `) and ...`
                    if !after_connector {
                        let (connector, rest) = strip_leading_connector(text).ok_or_else(|| {
                            ParseError::new(format!(
                                "missing connector before '{}'",
                                self.masked.restore(text)
                            ))
                        })?;
                        if as_connector(rest).is_some() {
                            return Err(ParseError::new("two adjacent connectors"));
                        }
                        conditions.push(connector.keyword().to_string());
                        text = rest;
                    }

                    // 分组之前的连接词: `... or (`
                    let trailing = strip_trailing_connector(text);
                    if let Some((_, rest)) = trailing {
                        text = rest;
                    }

                    conditions.push(text.to_string());

                    match trailing {
                        Some((connector, _)) => {
                            conditions.push(connector.keyword().to_string());
                            after_connector = true;
                        }
                        None => after_connector = false,
                    }
                }
                Segment::Group(inner) => {
                    if !after_connector {
                        return Err(ParseError::new("missing connector before group"));
                    }
                    let sub_parts = self.parse_parts(inner)?;
                    conditions.push(self.store_group(sub_parts));
                    after_connector = false;
                }
            }
        }

        if after_connector {
            return Err(ParseError::new("expression ends with a connector"));
        }

        self.parse_condition_string(&conditions.join(" "))
    }

    fn store_group(&mut self, parts: Vec<Part>) -> String {
        let key = format!("{}g{}", GROUP_SENTINEL, self.groups.len());
        self.groups.push(Some(parts));
        key
    }

    fn take_group(&mut self, token: &str) -> Option<Vec<Part>> {
        let index: usize = token.strip_prefix(GROUP_SENTINEL)?.strip_prefix('g')?.parse().ok()?;
        self.groups.get_mut(index)?.take()
    }

    /// 解析不含括号的扁平条件串。`and` 的优先级高于 `or`。
    fn parse_condition_string(&mut self, text: &str) -> Result<Vec<Part>> {
        let mut parts = Vec::new();

        let ors: Vec<&str> = text.split(" or ").collect();
        if ors.len() > 1 {
            parts.push(Part::OpenGroup(Connector::Or));
        }

        for or in ors.iter() {
            let ands: Vec<&str> = or.split(" and ").collect();
            if ands.len() > 1 {
                parts.push(Part::OpenGroup(Connector::And));
            }

            for and in ands.iter() {
                self.parse_condition(and, &mut parts)?;
            }

            if ands.len() > 1 {
                parts.push(Part::CloseGroup(Connector::And));
            }
        }

        if ors.len() > 1 {
            parts.push(Part::CloseGroup(Connector::Or));
        }

        Ok(parts)
    }

    /// 解析单个条件 `[not] field operator value...`，或拼回一个分组占位符
    fn parse_condition(&mut self, text: &str, parts: &mut Vec<Part>) -> Result<()> {
        let mut tokens: Vec<&str> = text.split_whitespace().collect();

        match tokens.as_slice() {
            [] => return Err(ParseError::new("empty condition")),
            [single] => {
                return match self.take_group(single) {
                    Some(sub_parts) => {
                        parts.extend(sub_parts);
                        Ok(())
                    }
                    None => Err(ParseError::new(format!(
                        "incomplete condition '{}'",
                        self.masked.restore(single)
                    ))),
                };
            }
            _ => {}
        }

        let negated = tokens[0] == NOT;
        if negated {
            tokens.remove(0);
        }

        let [field, keyword, rest @ ..] = tokens.as_slice() else {
            return Err(ParseError::new(format!(
                "incomplete condition '{}'",
                self.masked.restore(text.trim())
            )));
        };

        if as_connector(field).is_some() {
            return Err(ParseError::new("two adjacent connectors"));
        }
        // 理论上字段名可以带引号，但更可能是输入错误
        if quoted_inner(field).is_some() {
            return Err(ParseError::new(format!(
                "field name cannot be a string literal: {}",
                self.masked.restore(field)
            )));
        }
        if field.starts_with(GROUP_SENTINEL) {
            return Err(ParseError::new("group used where a field name was expected"));
        }

        // 值的首尾不能是连接词: `a eq 1 and`、`a eq 1 and or b eq 2`
        if let Some(connector) = [rest.first(), rest.last()]
            .into_iter()
            .flatten()
            .find_map(|token| as_connector(token))
        {
            return Err(ParseError::new(format!(
                "connector '{}' without a condition",
                connector.keyword()
            )));
        }

        let operator = Operator::from_keyword(keyword)
            .ok_or_else(|| ParseError::new(format!("unknown operator '{}'", keyword)))?;
        let operator = if negated { operator.negate() } else { operator };

        let field = self.masked.restore(field);
        match coerce_value(&rest.join(" "), self.masked) {
            Value::List(values) => {
                parts.push(Part::OpenGroup(Connector::Or));
                for value in values {
                    parts.push(Part::Leaf {
                        field: field.clone(),
                        value,
                        operator,
                    });
                }
                parts.push(Part::CloseGroup(Connector::Or));
            }
            value => parts.push(Part::Leaf {
                field,
                value,
                operator,
            }),
        }

        Ok(())
    }
}

/// 按顶层括号切分。括号不配对时返回错误。
fn segment_brackets(text: &str) -> Result<Vec<Segment<'_>>> {
    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            ESCAPE => escaped = true,
            '(' => {
                if depth == 0 {
                    let before = text[start..i].trim();
                    if !before.is_empty() {
                        segments.push(Segment::Text(before));
                    }
                    start = i + 1;
                }
                depth += 1;
            }
            ')' => {
                if depth == 0 {
                    return Err(ParseError::new("unbalanced ')'"));
                }
                depth -= 1;
                if depth == 0 {
                    segments.push(Segment::Group(text[start..i].trim()));
                    start = i + 1;
                }
            }
            _ => {}
        }
    }

    if depth != 0 {
        return Err(ParseError::new("unclosed '('"));
    }

    let last = text[start..].trim();
    if !last.is_empty() {
        segments.push(Segment::Text(last));
    }

    Ok(segments)
}

fn as_connector(text: &str) -> Option<Connector> {
    match text {
        "and" => Some(Connector::And),
        "or" => Some(Connector::Or),
        _ => None,
    }
}

fn strip_leading_connector(text: &str) -> Option<(Connector, &str)> {
    if let Some(rest) = text.strip_prefix("or ") {
        Some((Connector::Or, rest.trim_start()))
    } else {
        text.strip_prefix("and ")
            .map(|rest| (Connector::And, rest.trim_start()))
    }
}

fn strip_trailing_connector(text: &str) -> Option<(Connector, &str)> {
    if let Some(rest) = text.strip_suffix(" or") {
        Some((Connector::Or, rest.trim_end()))
    } else {
        text.strip_suffix(" and")
            .map(|rest| (Connector::And, rest.trim_end()))
    }
}
