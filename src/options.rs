//! `$options` 参数：逗号分隔的选项列表

use crate::error::Result;
use crate::masker::{escape_literal, split_unquoted, ESCAPE, QUOTE};
use crate::query_param::{Dialect, QueryParam};
use std::collections::HashSet;

const SEPARATOR: char = ',';

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Options;

impl Dialect for Options {
    type Part = String;

    const NAME: &'static str = "options";

    fn parse(&self, input: &str) -> Result<Vec<String>> {
        split_unquoted(input, SEPARATOR)
    }

    fn merge_strings(&self, first: &str, second: &str) -> String {
        format!("{first}{SEPARATOR}{second}")
    }

    fn merge_parts(&self, mut first: Vec<String>, second: Vec<String>) -> Vec<String> {
        first.extend(second);
        dedupe(first)
    }

    fn build_string(&self, parts: &[String]) -> String {
        parts
            .iter()
            .map(|option| quote_if_needed(option))
            .collect::<Vec<_>>()
            .join(&SEPARATOR.to_string())
    }
}

/// 给无法直接按逗号切分还原的选项加引号
pub(crate) fn quote_if_needed(token: &str) -> String {
    let needs_quotes = token.is_empty()
        || token.trim() != token
        || token.contains([SEPARATOR, QUOTE, ESCAPE]);
    if needs_quotes {
        format!("{QUOTE}{}{QUOTE}", escape_literal(token))
    } else {
        token.to_string()
    }
}

/// 去重，保留每个选项第一次出现的位置
fn dedupe(options: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    options
        .into_iter()
        .filter(|option| seen.insert(option.clone()))
        .collect()
}

pub type OptionsQueryParam = QueryParam<Options>;

impl QueryParam<Options> {
    /// 保留 `validate` 接受的选项并去重
    pub fn clean<F>(&mut self, mut validate: F, reset: bool) -> Result<()>
    where
        F: FnMut(&str) -> bool,
    {
        self.clean_with(reset, |_, parts| {
            dedupe(
                parts
                    .iter()
                    .filter(|option| validate(option))
                    .cloned()
                    .collect(),
            )
        })
    }

    pub fn has_option(&mut self, option: &str) -> Result<bool> {
        Ok(self.parts()?.iter().any(|part| part == option))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_option() {
        let mut options = OptionsQueryParam::new("include-test");
        assert_eq!(options.parts().unwrap(), &["include-test".to_string()]);
        assert_eq!(options.clean_query_param_string().unwrap(), "include-test");
    }

    #[test]
    fn test_clean_filters_options() {
        let mut options = OptionsQueryParam::new("include-test,include-foo,include-bar");
        options.clean(|option| option != "include-foo", false).unwrap();
        assert_eq!(
            options.parts().unwrap(),
            &["include-test".to_string(), "include-bar".to_string()]
        );
        assert_eq!(
            options.clean_query_param_string().unwrap(),
            "include-test,include-bar"
        );
        assert!(options.has_option("include-bar").unwrap());
        assert!(!options.has_option("include-foo").unwrap());
    }

    #[test]
    fn test_duplicates_collapse_on_clean() {
        let mut options = OptionsQueryParam::new("x,x,y");
        assert_eq!(options.parts().unwrap().len(), 3);
        options.clean(|_| true, false).unwrap();
        assert_eq!(options.parts().unwrap(), &["x".to_string(), "y".to_string()]);
    }

    #[test]
    fn test_quoted_options() {
        let mut options = OptionsQueryParam::new("a, 'b,c' ,,'d\\'e'");
        assert_eq!(
            options.parts().unwrap(),
            &["a".to_string(), "b,c".to_string(), "d'e".to_string()]
        );
        assert_eq!(options.clean_query_param_string().unwrap(), "a,'b,c','d\\'e'");
        assert!(OptionsQueryParam::new("a,'b").parts().is_err());
    }

    #[test]
    fn test_add_query_param_string() {
        let mut options = OptionsQueryParam::new("a,b");
        options.clean(|option| option != "b", false).unwrap();
        options.add_query_param_string("a,c").unwrap();
        assert_eq!(options.query_param_string(), "a,b,a,c");
        assert_eq!(options.parts().unwrap(), &["a".to_string(), "c".to_string()]);
    }

    #[test]
    fn test_empty() {
        let mut options = OptionsQueryParam::new("");
        assert!(options.parts().unwrap().is_empty());
        assert_eq!(options.clean_query_param_string().unwrap(), "");
    }
}
