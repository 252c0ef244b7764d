//! `$filters` 参数

use crate::ast::{Connector, Operator, Part, Value};
use crate::error::Result;
use crate::parser::parse_filters;
use crate::prune::{prune, PruneMode};
use crate::query_param::{Dialect, QueryParam};
use crate::serializer::serialize_filters;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Filters {
    pub prune_mode: PruneMode,
}

impl Dialect for Filters {
    type Part = Part;

    const NAME: &'static str = "filters";

    fn parse(&self, input: &str) -> Result<Vec<Part>> {
        parse_filters(input)
    }

    /// `(first) and (second)`
    fn merge_strings(&self, first: &str, second: &str) -> String {
        format!("({first}) and ({second})")
    }

    fn merge_parts(&self, first: Vec<Part>, second: Vec<Part>) -> Vec<Part> {
        if first.is_empty() {
            return second;
        }
        if second.is_empty() {
            return first;
        }
        let mut merged = Vec::with_capacity(first.len() + second.len() + 2);
        merged.push(Part::OpenGroup(Connector::And));
        merged.extend(first);
        merged.extend(second);
        merged.push(Part::CloseGroup(Connector::And));
        merged
    }

    fn build_string(&self, parts: &[Part]) -> String {
        serialize_filters(parts)
    }
}

pub type FiltersQueryParam = QueryParam<Filters>;

impl QueryParam<Filters> {
    pub fn with_prune_mode(query_param_string: &str, prune_mode: PruneMode) -> Self {
        Self::with_dialect(query_param_string, Filters { prune_mode })
    }

    /// 删除 `validate(field, value, operator)` 返回 false 的条件，并折叠因此变空的分组。
    ///
    /// 被拒绝的条件会静默删除；要区分“没有过滤”和“全部被拒绝”，
    /// 需要自行检查 `parts()` 是否为空。
    pub fn clean<F>(&mut self, validate: F, reset: bool) -> Result<()>
    where
        F: FnMut(&str, &Value, Operator) -> bool,
    {
        self.clean_with(reset, |dialect, parts| {
            prune(parts, validate, dialect.prune_mode)
        })
    }

    /// 顶层或顶层分组内第一个字段为 `name` 的条件
    pub fn get_filter(&mut self, name: &str) -> Result<Option<&Part>> {
        let mut depth = 0usize;
        for part in self.parts()? {
            match part {
                Part::OpenGroup(_) => depth += 1,
                Part::CloseGroup(_) => depth = depth.saturating_sub(1),
                Part::Leaf { field, .. } if depth <= 1 && field == name => {
                    return Ok(Some(part));
                }
                Part::Leaf { .. } => {}
            }
        }
        Ok(None)
    }

    pub fn has_filter(&mut self, name: &str) -> Result<bool> {
        Ok(self.get_filter(name)?.is_some())
    }

    /// `name` 是否被限定为单个值 (`eq`)
    pub fn has_filter_value(&mut self, name: &str) -> Result<bool> {
        Ok(self.get_filter_value(name)?.is_some())
    }

    pub fn get_filter_value(&mut self, name: &str) -> Result<Option<&Value>> {
        Ok(match self.get_filter(name)? {
            Some(Part::Leaf {
                value,
                operator: Operator::Eq,
                ..
            }) => Some(value),
            _ => None,
        })
    }
}
