//! 从查询字符串的键值对中取出各查询参数
//!
//! 键名为 `$filters`、`$options`、`$orderBy` 和 `$queryMode`；带前缀 `foo` 时
//! 为 `$fooFilters`、`$fooOptions`、`$fooOrderBy` 和 `$fooQueryMode`。

use crate::filters::FiltersQueryParam;
use crate::options::OptionsQueryParam;
use crate::order_by::OrderByQueryParam;
use crate::prune::PruneMode;
use log::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Filters,
    Options,
    OrderBy,
    QueryMode,
}

impl ParamKind {
    fn suffix(self) -> &'static str {
        match self {
            ParamKind::Filters => "Filters",
            ParamKind::Options => "Options",
            ParamKind::OrderBy => "OrderBy",
            ParamKind::QueryMode => "QueryMode",
        }
    }
}

/// `prefix` 下 `kind` 对应的查询参数名
pub fn param_name(prefix: &str, kind: ParamKind) -> String {
    let suffix = kind.suffix();
    if prefix.is_empty() {
        let mut chars = suffix.chars();
        let first = chars.next().map(|c| c.to_ascii_lowercase());
        format!("${}{}", first.map(String::from).unwrap_or_default(), chars.as_str())
    } else {
        format!("${prefix}{suffix}")
    }
}

/// 一次请求中未解析的原始参数
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pub filters: Option<String>,
    pub options: Option<String>,
    pub order_by: Option<String>,
    pub query_mode: Option<String>,
}

impl QueryParams {
    pub fn new(
        filters: Option<&str>,
        options: Option<&str>,
        order_by: Option<&str>,
        query_mode: Option<&str>,
    ) -> Self {
        Self {
            filters: filters.map(str::to_string),
            options: options.map(str::to_string),
            order_by: order_by.map(str::to_string),
            query_mode: query_mode.map(str::to_string),
        }
    }

    /// 从键值对中收集参数，重复的键取最后一个值
    pub fn from_pairs<I, K, V>(pairs: I, prefix: &str) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let filters_key = param_name(prefix, ParamKind::Filters);
        let options_key = param_name(prefix, ParamKind::Options);
        let order_by_key = param_name(prefix, ParamKind::OrderBy);
        let query_mode_key = param_name(prefix, ParamKind::QueryMode);

        let mut params = QueryParams::default();
        for (key, value) in pairs {
            let key = key.as_ref();
            let value = Some(value.as_ref().to_string());
            if key == filters_key {
                params.filters = value;
            } else if key == options_key {
                params.options = value;
            } else if key == order_by_key {
                params.order_by = value;
            } else if key == query_mode_key {
                params.query_mode = value;
            }
        }

        debug!(
            "query params (prefix {:?}): filters={} options={} order_by={} query_mode={:?}",
            prefix,
            params.filters.is_some(),
            params.options.is_some(),
            params.order_by.is_some(),
            params.query_mode
        );
        params
    }

    pub fn filters(&self) -> Option<FiltersQueryParam> {
        self.filters.as_deref().map(FiltersQueryParam::new)
    }

    pub fn filters_with(&self, prune_mode: PruneMode) -> Option<FiltersQueryParam> {
        self.filters
            .as_deref()
            .map(|filters| FiltersQueryParam::with_prune_mode(filters, prune_mode))
    }

    pub fn options(&self) -> Option<OptionsQueryParam> {
        self.options.as_deref().map(OptionsQueryParam::new)
    }

    pub fn order_by(&self) -> Option<OrderByQueryParam> {
        self.order_by.as_deref().map(OrderByQueryParam::new)
    }

    pub fn query_mode(&self) -> Option<&str> {
        self.query_mode.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_none()
            && self.options.is_none()
            && self.order_by.is_none()
            && self.query_mode.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_param_names() {
        assert_eq!(param_name("", ParamKind::Filters), "$filters");
        assert_eq!(param_name("", ParamKind::Options), "$options");
        assert_eq!(param_name("", ParamKind::OrderBy), "$orderBy");
        assert_eq!(param_name("foo", ParamKind::Filters), "$fooFilters");
        assert_eq!(param_name("foo", ParamKind::OrderBy), "$fooOrderBy");
        assert_eq!(param_name("", ParamKind::QueryMode), "$queryMode");
        assert_eq!(param_name("foo", ParamKind::QueryMode), "$fooQueryMode");
    }

    #[test]
    fn test_from_pairs() {
        let pairs = [
            ("$filters", "id eq 1"),
            ("$orderBy", "id desc"),
            ("$fooOptions", "ignored"),
            ("page", "2"),
        ];
        let params = QueryParams::from_pairs(pairs, "");
        assert_eq!(params.filters.as_deref(), Some("id eq 1"));
        assert_eq!(params.options, None);
        assert_eq!(params.order_by.as_deref(), Some("id desc"));
        assert!(!params.is_empty());

        let mut filters = params.filters().unwrap();
        assert_eq!(filters.parts().unwrap().len(), 1);
        assert!(params.options().is_none());
    }

    #[test]
    fn test_from_pairs_with_prefix() {
        let pairs = vec![
            ("$filters".to_string(), "id eq 1".to_string()),
            ("$fooOptions".to_string(), "a,b".to_string()),
        ];
        let params = QueryParams::from_pairs(pairs, "foo");
        assert_eq!(params.filters, None);
        assert_eq!(params.options.as_deref(), Some("a,b"));
    }

    #[test]
    fn test_empty() {
        assert!(QueryParams::from_pairs(Vec::<(&str, &str)>::new(), "").is_empty());
        assert!(!QueryParams::new(None, Some(""), None, None).is_empty());
    }

    #[test]
    fn test_query_mode() {
        let params = QueryParams::from_pairs([("$queryMode", "count")], "");
        assert_eq!(params.query_mode(), Some("count"));
        assert!(params.filters().is_none());
        // 只有查询模式也不算空
        assert!(!params.is_empty());
        assert!(!QueryParams::new(None, None, None, Some("list")).is_empty());
    }
}
