//! 查询参数解析和配置加载的错误类型

use std::path::PathBuf;

/// 表示原始查询参数字符串中的一个范围
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    /// 起始字节位置
    pub start: usize,
    /// 结束字节位置
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn at(offset: usize) -> Self {
        Self::new(offset, offset + 1)
    }
}

/// 查询参数字符串格式错误。整个字符串都应被拒绝，不能部分生效。
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid syntax: {message}")]
    InvalidSyntax { message: String, span: Option<Span> },
}

impl ParseError {
    pub fn new(message: impl Into<String>) -> Self {
        ParseError::InvalidSyntax {
            message: message.into(),
            span: None,
        }
    }

    pub fn at_position(message: impl Into<String>, span: Span) -> Self {
        ParseError::InvalidSyntax {
            message: message.into(),
            span: Some(span),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ParseError::InvalidSyntax { message, .. } => message,
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            ParseError::InvalidSyntax { span, .. } => *span,
        }
    }
}

pub type Result<T> = std::result::Result<T, ParseError>;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    NotFound(PathBuf),

    #[error("cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
