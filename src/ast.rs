//! 三种查询参数的结构化结果
//!
//! 过滤表达式被展平为 [`Part`] 序列：分组用 `OpenGroup`/`CloseGroup`
//! 标记界定而不是嵌套，查询构建器可以按流的方式遍历。

use serde::Serialize;
use std::fmt;

/// 过滤条件的比较运算符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Operator {
    Eq, // =
    Ne, // !=
    Gt, // >
    Ge, // >=
    Lt, // <
    Le, // <=
}

impl Operator {
    /// 关键字 (`eq`, `ne`, ...) 到运算符的映射
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "eq" => Some(Operator::Eq),
            "ne" => Some(Operator::Ne),
            "gt" => Some(Operator::Gt),
            "ge" => Some(Operator::Ge),
            "lt" => Some(Operator::Lt),
            "le" => Some(Operator::Le),
            _ => None,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Operator::Eq => "eq",
            Operator::Ne => "ne",
            Operator::Gt => "gt",
            Operator::Ge => "ge",
            Operator::Lt => "lt",
            Operator::Le => "le",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "=" => Some(Operator::Eq),
            "!=" => Some(Operator::Ne),
            ">" => Some(Operator::Gt),
            ">=" => Some(Operator::Ge),
            "<" => Some(Operator::Lt),
            "<=" => Some(Operator::Le),
            _ => None,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::Gt => ">",
            Operator::Ge => ">=",
            Operator::Lt => "<",
            Operator::Le => "<=",
        }
    }

    /// `not (field self value)` 对应的运算符
    pub fn negate(self) -> Self {
        match self {
            Operator::Eq => Operator::Ne,
            Operator::Ne => Operator::Eq,
            Operator::Gt => Operator::Le,
            Operator::Ge => Operator::Lt,
            Operator::Lt => Operator::Ge,
            Operator::Le => Operator::Gt,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// 类型转换后的过滤值
///
/// `List` 只在解析过程中短暂出现，进入 [`Part`] 序列前会展开为 OR 分组，
/// 且不会嵌套。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n.into())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

/// 分组内子项的组合方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Connector {
    And,
    Or,
}

impl Connector {
    pub fn keyword(self) -> &'static str {
        match self {
            Connector::And => "and",
            Connector::Or => "or",
        }
    }
}

/// 展平后的过滤表达式中的一项
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Part {
    /// 开始一个分组，由同一深度、同一连接词的 `CloseGroup` 结束
    OpenGroup(Connector),
    CloseGroup(Connector),
    /// 单个 `field operator value` 比较
    Leaf {
        field: String,
        value: Value,
        operator: Operator,
    },
}

impl Part {
    pub fn leaf(field: impl Into<String>, value: impl Into<Value>, operator: Operator) -> Self {
        Part::Leaf {
            field: field.into(),
            value: value.into(),
            operator,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Part::Leaf { .. })
    }
}

/// 排序方向
///
/// 符号是与排序执行方约定的：`>` 表示升序，`<` 表示降序。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "asc" => Some(Direction::Asc),
            "desc" => Some(Direction::Desc),
            _ => None,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Direction::Asc => '>',
            Direction::Desc => '<',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct OrderByPart {
    pub field: String,
    pub direction: Direction,
}

impl OrderByPart {
    pub fn new(field: impl Into<String>, direction: Direction) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }
}
