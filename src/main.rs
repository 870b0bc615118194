use std::process;
use std::time::Duration;

use jsonparam_core::{Delimiters, Dialect, ParameterSet, ParameterizeConfig};
use jsonparam_rust::documents::{load_document, load_params, render};
use jsonparam_rust::errors::CoreError;
use jsonparam_rust::output::{to_text, OutputFormat};
use log::info;

const USAGE: &str = "Uso: jsonparam render --template <FILE> [--params <FILE>] [--dialect expression|pipeline] \
                     [--open <TOK> --close <TOK>] [--lenient] [--timeout-ms <N>] \
                     [--format pretty|compact|canonical | --compact | --canonical]";

/// Opciones de `jsonparam render`. Las no indicadas se toman del entorno
/// (`JSONPARAM_*`, con `.env` opcional).
#[derive(Default)]
struct RenderArgs {
    template: Option<String>,
    params: Option<String>,
    dialect: Option<Dialect>,
    open: Option<String>,
    close: Option<String>,
    lenient: bool,
    timeout_ms: Option<u64>,
    format: OutputFormat,
}

fn usage_error(msg: &str) -> ! {
    eprintln!("[jsonparam] {msg}");
    eprintln!("{USAGE}");
    process::exit(2);
}

fn parse_render_args(args: &[String]) -> RenderArgs {
    let mut out = RenderArgs::default();
    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        let mut value = || -> String {
            i += 1;
            match args.get(i) {
                Some(v) => v.clone(),
                None => usage_error(&format!("falta el valor de {flag}")),
            }
        };
        match flag {
            "--template" => out.template = Some(value()),
            "--params" => out.params = Some(value()),
            "--dialect" => {
                let v = value();
                out.dialect = Some(v.parse().unwrap_or_else(|e| usage_error(&format!("{e}"))));
            }
            "--open" => out.open = Some(value()),
            "--close" => out.close = Some(value()),
            "--timeout-ms" => {
                let v = value();
                out.timeout_ms = Some(v.parse().unwrap_or_else(|_| usage_error(&format!("--timeout-ms inválido: {v}"))));
            }
            "--lenient" => out.lenient = true,
            "--format" => {
                let v = value();
                out.format = v.parse().unwrap_or_else(|e| usage_error(&format!("{e}")));
            }
            "--compact" => out.format = OutputFormat::Compact,
            "--canonical" => out.format = OutputFormat::Canonical,
            other => usage_error(&format!("opción desconocida: {other}")),
        }
        i += 1;
    }
    out
}

fn build_config(args: &RenderArgs) -> Result<ParameterizeConfig, CoreError> {
    let mut config = ParameterizeConfig::from_env()?;
    if let Some(dialect) = args.dialect {
        config = config.with_dialect(dialect);
    }
    if args.open.is_some() || args.close.is_some() {
        let open = args.open.clone().unwrap_or_else(|| config.delimiters.open().to_string());
        let close = args.close.clone().unwrap_or_else(|| config.delimiters.close().to_string());
        config = config.with_delimiters(Delimiters::new(open, close)?);
    }
    if args.lenient {
        config = config.lenient();
    }
    if let Some(ms) = args.timeout_ms {
        config = config.with_timeout(Duration::from_millis(ms));
    }
    Ok(config)
}

fn run_render(args: &RenderArgs) -> Result<String, CoreError> {
    let template_path = args.template.as_deref().unwrap_or_else(|| usage_error("falta --template"));
    let config = build_config(args)?;
    let template = load_document(template_path)?;
    let params = match &args.params {
        Some(path) => load_params(path)?,
        None => ParameterSet::new().with_standard_filters(),
    };
    info!("render {template_path} ({:?}, {:?}, {}ms)", config.dialect, config.policy, config.timeout_ms);
    let value = render(&template, &params, config)?;
    to_text(&value, args.format)
}

fn main() {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("warn"));
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 || args[1] != "render" {
        usage_error("comando desconocido");
    }
    let render_args = parse_render_args(&args[2..]);
    match run_render(&render_args) {
        Ok(text) => println!("{text}"),
        Err(e) => {
            eprintln!("[jsonparam] {e}");
            process::exit(e.exit_code());
        }
    }
}
