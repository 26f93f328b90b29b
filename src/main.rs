//! `tmrwdao` command-line front end.
//!
//! Every invocation prints exactly one `ToolResult` JSON document to stdout
//! and exits non-zero when it reports a failure. Logs go to stderr.

use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::process::ExitCode;

use tmrwdao_skill::blockchain::ExecutionMode;
use tmrwdao_skill::config::{load_config, SkillConfig};
use tmrwdao_skill::domains::chain::{self, ContractInput, TxResultInput};
use tmrwdao_skill::domains::fail_traced;
use tmrwdao_skill::observability::logging;
use tmrwdao_skill::{dispatch, SkillContext, SkillError, ToolResult, TOOL_NAMES};

#[derive(Parser)]
#[command(name = "tmrwdao")]
#[command(about = "TMRW DAO and aelf network governance tools", long_about = None)]
struct Cli {
    /// TOML configuration file; defaults plus TMRW_* environment variables otherwise
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read-only contract call
    View {
        #[arg(long)]
        chain_id: String,
        #[arg(long)]
        contract: String,
        #[arg(long)]
        method: String,
        /// JSON arguments
        #[arg(long, default_value = "{}")]
        args: String,
    },
    /// State-changing contract call, previewed unless --mode send
    Send {
        #[arg(long)]
        chain_id: String,
        #[arg(long)]
        contract: String,
        #[arg(long)]
        method: String,
        #[arg(long, default_value = "{}")]
        args: String,
        #[arg(long, default_value = "simulate")]
        mode: ExecutionMode,
        /// Report SUBMITTED instead of polling for the mined status
        #[arg(long)]
        no_wait: bool,
    },
    /// Base64 protobuf bytes of a method input
    PackInput {
        #[arg(long)]
        chain_id: String,
        #[arg(long)]
        contract: String,
        #[arg(long)]
        method: String,
        #[arg(long, default_value = "{}")]
        args: String,
    },
    /// Poll a transaction until it reaches a terminal status
    TxResult {
        #[arg(long)]
        chain_id: String,
        #[arg(long)]
        tx_id: String,
        #[arg(long)]
        poll_interval_ms: Option<u64>,
        #[arg(long)]
        max_attempts: Option<u32>,
    },
    /// GET a backend path under /api/app
    ApiGet {
        path: String,
        /// JSON object of query parameters
        #[arg(long)]
        query: Option<String>,
        #[arg(long)]
        auth: bool,
    },
    /// Exchange the configured key for an access token and show its metadata
    Token {
        #[arg(long)]
        refresh: bool,
    },
    /// List governance tool names
    Tools,
    #[command(external_subcommand)]
    Tool(Vec<String>),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match cli.config.as_deref() {
        Some(path) => load_config(path),
        None => SkillConfig::from_env(),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => return emit(&fail_traced("startup", &SkillError::from(e))),
    };

    logging::init(&config.observability.log_level, config.observability.log_json);

    let ctx = match SkillContext::new(config) {
        Ok(ctx) => ctx,
        Err(e) => return emit(&fail_traced("startup", &SkillError::from(e))),
    };

    let result = match run(&ctx, cli.command).await {
        Ok(result) => result,
        Err(e) => fail_traced("cli", &e),
    };
    emit(&result)
}

async fn run(ctx: &SkillContext, command: Commands) -> Result<ToolResult<Value>, SkillError> {
    let result = match command {
        Commands::View {
            chain_id,
            contract,
            method,
            args,
        } => {
            let input = contract_input(chain_id, contract, method, &args)?;
            chain::contract_view(ctx, input).await
        }
        Commands::Send {
            chain_id,
            contract,
            method,
            args,
            mode,
            no_wait,
        } => {
            let input = ContractInput {
                mode,
                no_wait,
                ..contract_input(chain_id, contract, method, &args)?
            };
            chain::contract_send(ctx, input).await
        }
        Commands::PackInput {
            chain_id,
            contract,
            method,
            args,
        } => {
            let input = contract_input(chain_id, contract, method, &args)?;
            chain::pack_input(ctx, input).await
        }
        Commands::TxResult {
            chain_id,
            tx_id,
            poll_interval_ms,
            max_attempts,
        } => {
            let input = TxResultInput {
                chain_id,
                tx_id,
                poll_interval_ms,
                max_attempts,
            };
            chain::tx_result(ctx, input).await
        }
        Commands::ApiGet { path, query, auth } => {
            let query = query.as_deref().map(|raw| parse_json(raw, "query")).transpose()?;
            chain::api_get(ctx, path, query, auth).await
        }
        Commands::Token { refresh } => chain::token_status(ctx, refresh).await,
        Commands::Tools => ToolResult::ok(tool_list()),
        Commands::Tool(argv) => {
            let mut argv = argv.into_iter();
            let name = argv.next().unwrap_or_default();
            let input = match argv.next() {
                Some(raw) => parse_json(&raw, "input")?,
                None => Value::Null,
            };
            dispatch(ctx, &name, input).await
        }
    };
    Ok(result)
}

fn contract_input(chain_id: String, contract: String, method: String, args: &str) -> Result<ContractInput, SkillError> {
    Ok(ContractInput {
        chain_id,
        contract_address: contract,
        method_name: method,
        args: parse_json(args, "args")?,
        ..ContractInput::default()
    })
}

fn tool_list() -> Value {
    json!(&TOOL_NAMES[..])
}

fn parse_json(raw: &str, what: &str) -> Result<Value, SkillError> {
    serde_json::from_str(raw).map_err(|e| SkillError::invalid_input(format!("{} is not valid JSON: {}", what, e)))
}

fn emit(result: &ToolResult<Value>) -> ExitCode {
    match serde_json::to_string_pretty(result) {
        Ok(text) => println!("{}", text),
        Err(e) => eprintln!("Error: failed to render result: {}", e),
    }
    if result.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
