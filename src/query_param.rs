//! 过滤、选项、排序三种参数的公共部分
//!
//! [`QueryParam`] 持有原始字符串、延迟解析的结果，以及调用 `clean` 之后
//! 单独缓存的清理结果。延迟解析会写入实例，所以读取方法需要 `&mut self`；
//! 跨线程共享实例时需要加锁。

use crate::error::Result;
use log::debug;
use std::fmt;

/// 各参数特有的解析与合并规则
pub trait Dialect: Clone + fmt::Debug + Default {
    type Part: Clone + fmt::Debug + PartialEq;

    /// 日志中使用的名称
    const NAME: &'static str;

    fn parse(&self, input: &str) -> Result<Vec<Self::Part>>;

    /// 合并两个非空原始字符串
    fn merge_strings(&self, first: &str, second: &str) -> String;

    /// 按 `merge_strings` 的规则合并两个解析结果
    fn merge_parts(&self, first: Vec<Self::Part>, second: Vec<Self::Part>) -> Vec<Self::Part>;

    fn build_string(&self, parts: &[Self::Part]) -> String;
}

#[derive(Debug, Clone, Default)]
pub struct QueryParam<D: Dialect> {
    query_param_string: String,
    parts: Option<Vec<D::Part>>,
    clean_parts: Option<Vec<D::Part>>,
    dialect: D,
}

impl<D: Dialect> QueryParam<D> {
    pub fn new(query_param_string: &str) -> Self {
        Self::with_dialect(query_param_string, D::default())
    }

    pub fn with_dialect(query_param_string: &str, dialect: D) -> Self {
        let mut param = Self {
            query_param_string: String::new(),
            parts: None,
            clean_parts: None,
            dialect,
        };
        param.set_query_param_string(query_param_string);
        param
    }

    pub fn dialect(&self) -> &D {
        &self.dialect
    }

    /// 原始字符串（已去除首尾空白）
    pub fn query_param_string(&self) -> &str {
        &self.query_param_string
    }

    /// 替换原始字符串，同时丢弃解析结果和清理结果
    pub fn set_query_param_string(&mut self, value: &str) -> &mut Self {
        self.query_param_string = value.trim().to_string();
        self.parts = None;
        self.clean_parts = None;
        self
    }

    /// 合并另一个原始字符串
    ///
    /// 已经清理过时，清理结果会与 `value` 的解析结果合并，之前的清理不会丢失。
    pub fn add_query_param_string(&mut self, value: &str) -> Result<&mut Self> {
        let value = value.trim();
        if self.query_param_string.is_empty() {
            self.set_query_param_string(value);
            return Ok(self);
        }
        if value.is_empty() {
            return Ok(self);
        }

        let merged_clean = match self.clean_parts.take() {
            Some(clean) => match self.dialect.parse(value) {
                Ok(other) => Some(self.dialect.merge_parts(clean, other)),
                Err(err) => {
                    self.clean_parts = Some(clean);
                    return Err(err);
                }
            },
            None => None,
        };

        self.query_param_string = self.dialect.merge_strings(&self.query_param_string, value);
        self.parts = None;
        self.clean_parts = merged_clean;

        debug!(
            "merged {} string, cleaned parts {}",
            D::NAME,
            if self.clean_parts.is_some() { "kept" } else { "absent" }
        );
        Ok(self)
    }

    /// 合并另一个同类参数。任一方清理过时，结果由双方当前的解析结果合并得到。
    pub fn add_query_param(&mut self, mut other: Self) -> Result<&mut Self> {
        let merged_clean = if self.has_cleaned() || other.has_cleaned() {
            let first = self.parts()?.to_vec();
            let second = other.parts()?.to_vec();
            Some(self.dialect.merge_parts(first, second))
        } else {
            None
        };

        self.query_param_string = match (
            self.query_param_string.is_empty(),
            other.query_param_string.is_empty(),
        ) {
            (true, _) => other.query_param_string,
            (_, true) => std::mem::take(&mut self.query_param_string),
            _ => self
                .dialect
                .merge_strings(&self.query_param_string, &other.query_param_string),
        };
        self.parts = None;
        self.clean_parts = merged_clean;
        Ok(self)
    }

    /// 调用过 `clean` 时返回清理结果，否则返回原始字符串的解析结果
    pub fn parts(&mut self) -> Result<&[D::Part]> {
        if self.clean_parts.is_none() {
            self.ensure_parsed()?;
        }
        Ok(self
            .clean_parts
            .as_deref()
            .or(self.parts.as_deref())
            .unwrap_or_default())
    }

    /// 原始字符串的解析结果，不考虑清理
    pub fn raw_parts(&mut self) -> Result<&[D::Part]> {
        self.ensure_parsed()?;
        Ok(self.parts.as_deref().unwrap_or_default())
    }

    fn ensure_parsed(&mut self) -> Result<()> {
        if self.parts.is_none() {
            self.parts = Some(self.dialect.parse(&self.query_param_string)?);
        }
        Ok(())
    }

    pub fn has_cleaned(&self) -> bool {
        self.clean_parts.is_some()
    }

    /// 当前结果的规范字符串
    pub fn clean_query_param_string(&mut self) -> Result<String> {
        let dialect = self.dialect.clone();
        Ok(dialect.build_string(self.parts()?))
    }

    /// 用 `clean(当前结果)` 替换清理结果。`reset` 为真时当前结果重新取原始解析结果。
    pub(crate) fn clean_with<F>(&mut self, reset: bool, clean: F) -> Result<()>
    where
        F: FnOnce(&D, &[D::Part]) -> Vec<D::Part>,
    {
        if reset {
            self.clean_parts = None;
        }
        let dialect = self.dialect.clone();
        let cleaned = clean(&dialect, self.parts()?);
        self.clean_parts = Some(cleaned);
        Ok(())
    }
}

impl<D: Dialect> From<&str> for QueryParam<D> {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl<D: Dialect> fmt::Display for QueryParam<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.query_param_string)
    }
}
