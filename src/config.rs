//! 配置模块，负责加载JSON配置文件

use crate::ast::{Direction, Operator, Value};
use crate::error::ConfigError;
use crate::prune::PruneMode;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// 查询参数配置结构
///
/// 白名单为空表示不做限制。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParamConfig {
    /// 查询参数名前缀，例如 `foo` 对应 `$fooFilters`
    pub prefix: String,
    /// 清理后删除哪些分组
    pub prune_mode: PruneMode,
    /// 允许过滤的字段
    pub filter_fields: Vec<String>,
    /// 允许的选项
    pub options: Vec<String>,
    /// 允许排序的字段
    pub order_by_fields: Vec<String>,
}

fn allows(allowed: &[String], name: &str) -> bool {
    allowed.is_empty() || allowed.iter().any(|entry| entry == name)
}

impl ParamConfig {
    /// 从JSON文件加载配置
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_ref = path.as_ref();

        // 检查文件是否存在
        if !path_ref.exists() {
            return Err(ConfigError::NotFound(path_ref.to_path_buf()));
        }

        let content = fs::read_to_string(path_ref).map_err(|source| ConfigError::Io {
            path: path_ref.to_path_buf(),
            source,
        })?;

        let config: ParamConfig =
            serde_json::from_str(&content).map_err(|source| ConfigError::Json {
                path: path_ref.to_path_buf(),
                source,
            })?;

        debug!(
            "loaded {}: {} filter fields, {} options, {} order by fields",
            path_ref.display(),
            config.filter_fields.len(),
            config.options.len(),
            config.order_by_fields.len()
        );
        Ok(config)
    }

    /// 过滤条件校验器，配合 `FiltersQueryParam::clean` 使用
    pub fn filter_predicate(&self) -> impl Fn(&str, &Value, Operator) -> bool + '_ {
        move |field: &str, _: &Value, _: Operator| allows(&self.filter_fields, field)
    }

    pub fn option_predicate(&self) -> impl Fn(&str) -> bool + '_ {
        move |option: &str| allows(&self.options, option)
    }

    pub fn order_by_predicate(&self) -> impl Fn(&str, Direction) -> bool + '_ {
        move |field: &str, _: Direction| allows(&self.order_by_fields, field)
    }
}
