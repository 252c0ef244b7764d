use anyhow::Result;
use log::debug;
use query_params::config::ParamConfig;
use query_params::{
    param_name, FiltersQueryParam, OptionsQueryParam, OrderByQueryParam, ParamKind,
};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

const DEFAULT_CONFIG: &str = "query_params.json";

/// 加载配置，失败时使用默认配置
fn load_config(path: &str) -> ParamConfig {
    match ParamConfig::from_json_file(path) {
        Ok(config) => {
            println!("✅ 成功加载配置文件: {}", path);
            print_config(&config);
            config
        }
        Err(e) => {
            println!("⚠️ 无法加载配置文件 ({}), 使用默认配置", e);
            ParamConfig::default()
        }
    }
}

fn print_config(config: &ParamConfig) {
    let list = |entries: &[String]| {
        if entries.is_empty() {
            "(不限制)".to_string()
        } else {
            entries.join(", ")
        }
    };
    println!(
        "  参数名: {}, {}, {}",
        param_name(&config.prefix, ParamKind::Filters),
        param_name(&config.prefix, ParamKind::Options),
        param_name(&config.prefix, ParamKind::OrderBy),
    );
    println!("  分组清理: {:?}", config.prune_mode);
    println!("  过滤字段: {}", list(&config.filter_fields));
    println!("  选项: {}", list(&config.options));
    println!("  排序字段: {}", list(&config.order_by_fields));
}

fn run_filters(input: &str, config: &ParamConfig) -> Result<()> {
    let mut filters = FiltersQueryParam::with_prune_mode(input, config.prune_mode);
    println!("[解析结果]: {:#?}", filters.parts()?);
    println!("[规范字符串]: {}", filters.clean_query_param_string()?);

    filters.clean(config.filter_predicate(), false)?;
    println!("[清理结果]: {:#?}", filters.parts()?);
    println!("[清理后字符串]: {}", filters.clean_query_param_string()?);
    Ok(())
}

fn run_options(input: &str, config: &ParamConfig) -> Result<()> {
    let mut options = OptionsQueryParam::new(input);
    println!("[解析结果]: {:?}", options.parts()?);

    options.clean(config.option_predicate(), false)?;
    println!("[清理后字符串]: {}", options.clean_query_param_string()?);
    Ok(())
}

fn run_order_by(input: &str, config: &ParamConfig) -> Result<()> {
    let mut order_by = OrderByQueryParam::new(input);
    println!("[解析结果]: {:?}", order_by.parts()?);

    order_by.clean(config.order_by_predicate(), false)?;
    println!("[清理后字符串]: {}", order_by.clean_query_param_string()?);
    Ok(())
}

fn print_help() {
    println!("命令:");
    println!("  filters <表达式>   例如 filters a eq 'b' and (c eq 'd' or e gt 3)");
    println!("  options <列表>     例如 options include-test,include-foo");
    println!("  order <列表>       例如 order name desc, id");
    println!("  :config <路径>     重新加载配置");
    println!("  :quit              退出");
}

fn main() -> Result<()> {
    env_logger::init();

    println!("--- Query Params: 查询参数解析器 ---");
    let mut config = load_config(DEFAULT_CONFIG);
    print_help();

    let mut editor = DefaultEditor::new()?;
    loop {
        let line = match editor.readline(">> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        editor.add_history_entry(line)?;

        let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
        debug!("command {:?}, argument {:?}", command, rest);
        let result = match command {
            "filters" => run_filters(rest, &config),
            "options" => run_options(rest, &config),
            "order" => run_order_by(rest, &config),
            ":config" => {
                config = load_config(rest.trim());
                Ok(())
            }
            ":quit" | ":q" => break,
            _ => {
                print_help();
                Ok(())
            }
        };

        if let Err(e) = result {
            println!("✗ 解析失败: {}", e);
            if let Some(span) = e
                .downcast_ref::<query_params::ParseError>()
                .and_then(|e| e.span())
            {
                println!("  位置 {}-{}", span.start, span.end);
            }
        }
    }

    Ok(())
}
