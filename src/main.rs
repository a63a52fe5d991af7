use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use rescall::cloud::auth::StaticSession;
use rescall::cloud::http::ApiClient;
use rescall::config::Config;
use rescall::resource::{
    Dispatcher, OperationKind, Params, RequestBuilder, RequestError, ResourceKind,
};
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Apply one operation to a cloud resource
#[derive(Parser, Debug)]
#[command(name = "rescall", version, about, long_about = None)]
struct Args {
    /// Resource kind (VM, EIP, Disk, AP)
    resource: ResourceKind,

    /// Operation (Create, Get, Delete, GetStatus, ChangeBandwidth, ...)
    operation: OperationKind,

    /// Target resource id; empty means "first match" for Get
    #[arg(long, default_value = "")]
    id: String,

    /// Call parameter, KEY=VALUE (VALUE parsed as JSON when possible)
    #[arg(short, long = "param", value_parser = parse_key_value)]
    params: Vec<(String, Value)>,

    /// Default parameter, KEY=VALUE; overrides --param for the same key
    #[arg(short, long = "default", value_parser = parse_key_value)]
    defaults: Vec<(String, Value)>,

    /// API base URL
    #[arg(long)]
    endpoint: Option<String>,

    /// Bearer token
    #[arg(long)]
    token: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    output: OutputFormat,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off")]
    log_level: LogLevel,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Yaml,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn as_filter(self) -> Option<&'static str> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some("error"),
            LogLevel::Warn => Some("warn"),
            LogLevel::Info => Some("info"),
            LogLevel::Debug => Some("debug"),
            LogLevel::Trace => Some("trace"),
        }
    }
}

#[derive(Serialize)]
struct Output<'a> {
    info: &'a rescall::resource::ExternalInfo,
    object: &'a Value,
}

fn parse_key_value(raw: &str) -> Result<(String, Value), String> {
    let Some((key, value)) = raw.split_once('=') else {
        return Err(format!("expected KEY=VALUE, got '{}'", raw));
    };
    if key.is_empty() {
        return Err(format!("empty key in '{}'", raw));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

fn to_params(pairs: Vec<(String, Value)>) -> Params {
    pairs.into_iter().collect()
}

fn setup_logging(level: LogLevel) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let Some(filter) = level.as_filter() else {
        return Ok(None);
    };

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {:?}", log_path))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("rescall started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Ok(Some(guard))
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("rescall").join("rescall.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".rescall").join("rescall.log");
    }
    PathBuf::from("rescall.log")
}

/// Exit code per error class, so scripts can branch without parsing text
fn exit_code(err: &RequestError) -> ExitCode {
    let code = match err {
        RequestError::UnknownResource { .. } => 1,
        e if e.is_not_found(e.resource()) => 2,
        e if e.is_client_error() => 3,
        e if e.is_server_error() => 4,
        RequestError::Transport { .. } => 5,
        RequestError::Remote(_) => 1,
    };
    ExitCode::from(code)
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level)?;

    let config = Config::load();
    let endpoint = config.effective_endpoint(args.endpoint.clone()).context(
        "No API endpoint configured. Set RESCALL_ENDPOINT or use --endpoint",
    )?;
    let sessions = StaticSession::from_token(config.effective_token(args.token.clone()));

    tracing::info!("Using endpoint: {}", endpoint);

    let api = ApiClient::new()?;
    let registry = config.build_registry(&api, &endpoint)?;
    let dispatcher = Dispatcher::new(registry, Arc::new(sessions));

    let mut request = RequestBuilder::new(args.resource, args.operation);
    if !args.defaults.is_empty() {
        request = request.with_default_params(to_params(args.defaults));
    }
    let params = Some(to_params(args.params)).filter(|p| !p.is_empty());

    match request.apply(&dispatcher, &args.id, params).await {
        Ok(applied) => {
            let output = Output {
                info: &applied.info,
                object: &applied.object,
            };
            let rendered = match args.output {
                OutputFormat::Json => serde_json::to_string_pretty(&output)?,
                OutputFormat::Yaml => serde_yaml::to_string(&output)?,
            };
            println!("{}", rendered);
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            eprintln!("Error: {}", err);
            Ok(exit_code(&err))
        }
    }
}
