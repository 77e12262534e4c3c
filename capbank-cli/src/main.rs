//! CapBank CLI - your bank account in the terminal

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod output;

use capbank_core::{BankEvent, LogEvent, OperationResult};
use commands::{cash, dashboard, extract, login, logs, mask, register, status, transfer};

/// CapBank - your bank account in the terminal
#[derive(Parser)]
#[command(name = "capbank", version, about, long_about = None)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in with CPF and password
    Login {
        /// CPF, masked or digits only
        #[arg(long)]
        cpf: Option<String>,
        /// Password (prompted when omitted)
        #[arg(long, env = "CAPBANK_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Log out and forget the stored session
    Logout,

    /// Show session and connection settings
    Status,

    /// Open a new account (interactive)
    Register,

    /// Show balance and latest transactions
    Dashboard {
        /// Show the balance instead of hiding it
        #[arg(long)]
        show_balance: bool,
    },

    /// Transfer money to another account
    Transfer {
        /// Destination account number
        #[arg(long)]
        to: Option<String>,
        /// Amount, e.g. 100,50
        #[arg(long)]
        amount: Option<String>,
        /// Description shown on the statement
        #[arg(long, short)]
        description: Option<String>,
    },

    /// Deposit into your account
    Deposit {
        /// Amount, e.g. 100,50
        amount: String,
        #[arg(long, short)]
        description: Option<String>,
    },

    /// Withdraw from your account
    Withdraw {
        /// Amount, e.g. 100,50
        amount: String,
        #[arg(long, short)]
        description: Option<String>,
    },

    /// Show the account statement
    Extract(extract::ExtractArgs),

    /// Format a document or number the way the forms do
    Mask {
        #[command(subcommand)]
        command: mask::MaskCommands,
    },

    /// View and manage application logs
    Logs {
        #[command(subcommand)]
        command: logs::LogsCommands,
    },
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Login { .. } => "login",
            Commands::Logout => "logout",
            Commands::Status => "status",
            Commands::Register => "register",
            Commands::Dashboard { .. } => "dashboard",
            Commands::Transfer { .. } => "transfer",
            Commands::Deposit { .. } => "deposit",
            Commands::Withdraw { .. } => "withdraw",
            Commands::Extract(_) => "extract",
            Commands::Mask { .. } => "mask",
            Commands::Logs { .. } => "logs",
        }
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "capbank=warn,capbank_core=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    let json = cli.json;
    let name = cli.command.name();

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            output::error(&format!("Failed to start runtime: {}", e));
            return ExitCode::FAILURE;
        }
    };
    let result = runtime.block_on(run(cli));

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let message = commands::describe_error(&e);
            commands::log_event(
                &commands::get_logger(),
                LogEvent::new(BankEvent::CommandFailed)
                    .with_command(name)
                    .with_error(message.clone()),
            );
            if json {
                let failure = OperationResult::<()>::fail(message);
                if let Ok(text) = serde_json::to_string_pretty(&failure) {
                    println!("{}", text);
                }
            } else {
                output::error(&message);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let json = cli.json;
    match cli.command {
        Commands::Login { cpf, password } => login::run(cpf, password, json).await,
        Commands::Logout => login::logout(json),
        Commands::Status => status::run(json),
        Commands::Register => register::run().await,
        Commands::Dashboard { show_balance } => dashboard::run(show_balance, json).await,
        Commands::Transfer { to, amount, description } => {
            transfer::run(to, amount, description, json).await
        }
        Commands::Deposit { amount, description } => {
            cash::deposit(&amount, description.as_deref(), json).await
        }
        Commands::Withdraw { amount, description } => {
            cash::withdraw(&amount, description.as_deref(), json).await
        }
        Commands::Extract(args) => extract::run(args, json).await,
        Commands::Mask { command } => mask::run(command, json),
        Commands::Logs { command } => logs::run(command, json),
    }
}
