use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;
use workspace_bridge::config::BridgeConfig;
use workspace_bridge::engine;
use workspace_bridge::gateway::FailurePolicy;
use workspace_bridge::session::{EngineSession, SessionOptions};
use workspace_bridge::variant::{transpose_variant, Variant};

#[derive(Parser, Debug)]
#[command(
    name = "wsbridge_cli",
    about = "Drive the workspace bridge against the configured engine"
)]
struct Cli {
    /// Directory for the daily audit files (defaults to the configured one)
    #[arg(long, global = true)]
    audit_dir: Option<PathBuf>,
    /// Bridge configuration file (defaults to $WSBRIDGE_CONFIG or bridge_config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Call a workspace function through the dispatch gateway
    Invoke {
        #[arg(long)]
        function: String,
        /// Parameter bundle as JSON
        #[arg(long)]
        params: Option<String>,
        /// Run the session in debug mode so calls are audited
        #[arg(long)]
        debug: bool,
        /// Report failures as `[1, message]` instead of an error
        #[arg(long)]
        degrade: bool,
    },
    /// Print the engine identity properties
    Info,
    /// Transpose a JSON matrix locally
    Transpose {
        #[arg(long)]
        matrix: String,
    },
}

fn main() -> ExitCode {
    workspace_bridge::init_logging();
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => BridgeConfig::load_from_file(path),
        None => BridgeConfig::load(),
    };
    if cli.audit_dir.is_some() {
        config.audit_dir = cli.audit_dir;
    }

    match cli.command {
        Commands::Invoke {
            function,
            params,
            debug,
            degrade,
        } => run_invoke(config, &function, params.as_deref(), debug, degrade),
        Commands::Info => run_info(&config),
        Commands::Transpose { matrix } => run_transpose(&matrix),
    }
}

fn run_invoke(
    mut config: BridgeConfig,
    function: &str,
    params: Option<&str>,
    debug: bool,
    degrade: bool,
) -> Result<ExitCode> {
    if degrade {
        config.failure_policy = FailurePolicy::DegradeToValue;
    }
    let parameters = params.map(parse_variant).transpose()?;

    let options = SessionOptions::from_config(&config)?.with_debug(debug);
    let mut session = EngineSession::open(|| engine::create(&config.engine), options)?;

    let result = session
        .invoke(function, parameters)
        .with_context(|| format!("invoking {}", function))?;
    session.teardown()?;

    println!("{}", result.to_json());
    Ok(ExitCode::from(0))
}

fn run_info(config: &BridgeConfig) -> Result<ExitCode> {
    let mut session = EngineSession::from_config(config)?;
    let report = InfoPayload {
        sys_dir: session.sys_dir()?,
        user_dir: session.user_dir()?,
        product_version: session.product_version()?,
        engine_version: session.engine_version()?,
        current_client: session.current_client()?,
    };
    session.teardown()?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(ExitCode::from(0))
}

fn run_transpose(matrix: &str) -> Result<ExitCode> {
    let value = parse_variant(matrix)?;
    println!("{}", transpose_variant(&value).to_json());
    Ok(ExitCode::from(0))
}

fn parse_variant(text: &str) -> Result<Variant> {
    let json: Value = serde_json::from_str(text).with_context(|| format!("parsing {}", text))?;
    Ok(Variant::from_json(&json)?)
}

#[derive(Serialize)]
struct InfoPayload {
    sys_dir: String,
    user_dir: String,
    product_version: String,
    engine_version: String,
    current_client: String,
}
