//! 字符串字面量屏蔽器
//!
//! 把单引号包围的字面量替换为带序号的占位符（引号保留），
//! 后续的括号扫描、关键字切分就不会误伤字面量内部的文本。
//!
//! ```text
//! name eq 'a (b) or c' and x eq 'it\'s'
//!   → name eq '0' and x eq '1'
//!     literals = ["a (b) or c", "it's"]
//! ```

use crate::error::{ParseError, Result, Span};
use log::trace;

/// 字面量的界定符
pub const QUOTE: char = '\'';
/// 转义符，转义下一个字符
pub const ESCAPE: char = '\\';
/// 过滤器解析器给括号分组占位符保留的前缀，输入中不允许出现
pub(crate) const GROUP_SENTINEL: char = '\u{0}';

/// 屏蔽后的字符串以及占位符到原始内容的映射
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaskedString {
    masked: String,
    literals: Vec<String>,
}

impl MaskedString {
    pub fn as_str(&self) -> &str {
        &self.masked
    }

    pub fn literal_count(&self) -> usize {
        self.literals.len()
    }

    /// 根据引号内的占位符文本取回字面量内容（已反转义）
    pub fn literal(&self, placeholder: &str) -> Option<&str> {
        placeholder
            .parse::<usize>()
            .ok()
            .and_then(|index| self.literals.get(index))
            .map(String::as_str)
    }

    /// 若 token 整体是一个被屏蔽的字面量 `'N'`，返回其内容
    ///
    /// `'0' '1'` 这类由多个字面量组成的 token 返回 `None`，由调用者用
    /// [`MaskedString::restore`] 还原。
    pub fn unquote(&self, token: &str) -> Option<&str> {
        self.literal(quoted_inner(token)?)
    }

    /// 把文本中的占位符还原为原始的（重新转义的）带引号字面量
    pub fn restore(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut chars = text.chars();
        while let Some(c) = chars.next() {
            match c {
                ESCAPE => {
                    out.push(c);
                    if let Some(next) = chars.next() {
                        out.push(next);
                    }
                }
                QUOTE => {
                    let placeholder: String = chars.by_ref().take_while(|&c| c != QUOTE).collect();
                    let content = self.literal(&placeholder).unwrap_or(&placeholder);
                    out.push(QUOTE);
                    out.push_str(&escape_literal(content));
                    out.push(QUOTE);
                }
                _ => out.push(c),
            }
        }
        out
    }
}

/// `'...'` 形式（长度大于 1）时返回引号内的文本
pub fn quoted_inner(token: &str) -> Option<&str> {
    if token.len() > 1 && token.starts_with(QUOTE) && token.ends_with(QUOTE) {
        Some(&token[1..token.len() - 1])
    } else {
        None
    }
}

/// 序列化时对字面量内容重新转义
pub fn escape_literal(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    for c in content.chars() {
        if c == QUOTE || c == ESCAPE {
            out.push(ESCAPE);
        }
        out.push(c);
    }
    out
}

pub struct StringMasker<'a> {
    input: &'a str,
    /// 输入字符串中的当前位置（字节索引）
    position: usize,
}

impl<'a> StringMasker<'a> {
    pub fn new(input: &'a str) -> Self {
        StringMasker { input, position: 0 }
    }

    /// 返回当前位置的字符，不推进位置
    fn peek(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    /// 推进位置一个字符并返回该字符
    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if let Some(c) = c {
            self.position += c.len_utf8();
        }
        c
    }

    /// 读取字面量内容直到未转义的结束引号
    /// 注意：开始的引号已经被调用者消费
    fn read_literal(&mut self, start: usize) -> Result<String> {
        let mut content = String::new();
        loop {
            match self.bump() {
                Some(QUOTE) => return Ok(content),
                Some(ESCAPE) => match self.bump() {
                    Some(c @ (QUOTE | ESCAPE)) => content.push(c),
                    Some(c) => {
                        content.push(ESCAPE);
                        content.push(c);
                    }
                    None => break,
                },
                Some(c) => content.push(c),
                None => break,
            }
        }
        Err(ParseError::at_position(
            "unterminated string literal",
            Span::new(start, self.input.len()),
        ))
    }

    pub fn mask(mut self) -> Result<MaskedString> {
        let mut masked = String::with_capacity(self.input.len());
        let mut literals = Vec::new();

        while let Some(c) = self.bump() {
            match c {
                ESCAPE => {
                    masked.push(c);
                    if let Some(next) = self.bump() {
                        masked.push(next);
                    }
                }
                QUOTE => {
                    let start = self.position - c.len_utf8();
                    let content = self.read_literal(start)?;
                    masked.push(QUOTE);
                    masked.push_str(&literals.len().to_string());
                    masked.push(QUOTE);
                    literals.push(content);
                }
                GROUP_SENTINEL => {
                    return Err(ParseError::at_position(
                        "unexpected control character",
                        Span::at(self.position - 1),
                    ));
                }
                _ => masked.push(c),
            }
        }

        trace!("masked {} literal(s): {:?}", literals.len(), masked);
        Ok(MaskedString { masked, literals })
    }
}

pub fn mask(input: &str) -> Result<MaskedString> {
    StringMasker::new(input).mask()
}

/// 按分隔符切分，引号内的分隔符不生效。
///
/// 每段去除首尾空白，空段丢弃；整段是一个字面量时去掉引号，
/// 否则原样还原。
pub fn split_unquoted(input: &str, delimiter: char) -> Result<Vec<String>> {
    let masked = mask(input)?;
    Ok(masked
        .as_str()
        .split(delimiter)
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(|piece| match masked.unquote(piece) {
            Some(content) => content.to_string(),
            None => masked.restore(piece),
        })
        .collect())
}
