//! `$filters`、`$options`、`$orderBy` 查询参数的解析、校验与重新序列化

pub mod ast;
pub mod coerce;
pub mod config;
pub mod error;
pub mod filters;
pub mod masker;
pub mod options;
pub mod order_by;
pub mod parser;
pub mod prune;
pub mod query_param;
pub mod query_params;
pub mod serializer;
pub mod where_builder;

pub use ast::{Connector, Direction, Operator, OrderByPart, Part, Value};
pub use config::ParamConfig;
pub use error::{ConfigError, ParseError, Span};
pub use filters::{Filters, FiltersQueryParam};
pub use options::{Options, OptionsQueryParam};
pub use order_by::{OrderBy, OrderByQueryParam};
pub use parser::parse_filters;
pub use prune::{prune, PruneMode};
pub use query_param::{Dialect, QueryParam};
pub use query_params::{param_name, ParamKind, QueryParams};
pub use serializer::serialize_filters;
pub use where_builder::{apply_filters, apply_order_by, OrderByBuilder, WhereBuilder};
