pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use liftquote_core::config::{AppConfig, LoadOptions, LogFormat};

use crate::commands::export::ExportFormat;

#[derive(Debug, Parser)]
#[command(
    name = "liftquote",
    about = "Elevator service quote CLI",
    long_about = "Submit elevator service requests to the quote webhook, normalize the replies, accept or negotiate the quotes, and export them.",
    after_help = "Examples:\n  liftquote parse --file reply.md --context form.json\n  liftquote submit --context form.json\n  liftquote accept --context form.json --file reply.md\n  liftquote negotiate --message \"Can you do Friday?\" --file reply.md\n  liftquote ping\n  liftquote export ics --context form.json --file reply.md\n  liftquote config"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Normalize a webhook reply (file or stdin) into a structured quote")]
    Parse {
        #[arg(long, help = "Reply text file; reads stdin when omitted or `-`")]
        file: Option<PathBuf>,
        #[arg(long, help = "Form context JSON used to fill fields the reply omits")]
        context: Option<PathBuf>,
    },
    #[command(about = "Validate a service request, post it to the webhook, and parse the reply")]
    Submit {
        #[arg(long, help = "Form context JSON to submit")]
        context: PathBuf,
        #[arg(long, help = "Webhook URL overriding configuration")]
        webhook_url: Option<String>,
    },
    #[command(about = "Accept a quote and post it to the job creation webhook")]
    Accept {
        #[arg(long, help = "Form context JSON the quote was requested with")]
        context: PathBuf,
        #[arg(long, help = "Reply text file; reads stdin when omitted or `-`")]
        file: Option<PathBuf>,
        #[arg(long, help = "Job webhook URL overriding configuration")]
        job_url: Option<String>,
    },
    #[command(about = "Send a message about a quote to the negotiation webhook")]
    Negotiate {
        #[arg(long, help = "Message for the negotiation agent")]
        message: String,
        #[arg(long, help = "Reply text file; reads stdin when omitted or `-`")]
        file: Option<PathBuf>,
        #[arg(long, help = "Form context JSON the quote was requested with")]
        context: Option<PathBuf>,
        #[arg(long, help = "Negotiation webhook URL overriding configuration")]
        negotiation_url: Option<String>,
    },
    #[command(about = "Check that the quote webhook is reachable and its workflow is active")]
    Ping {
        #[arg(long, help = "Webhook URL overriding configuration")]
        webhook_url: Option<String>,
    },
    #[command(about = "Export a parsed quote as CSV or as an ICS visit event")]
    Export {
        #[arg(value_enum)]
        format: ExportFormat,
        #[arg(long, help = "Form context JSON the quote was requested with")]
        context: PathBuf,
        #[arg(long, help = "Reply text file; reads stdin when omitted or `-`")]
        file: Option<PathBuf>,
    },
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    if let Ok(config) = AppConfig::load(LoadOptions::default()) {
        init_logging(&config);
    }

    let result = match cli.command {
        Command::Parse { file, context } => {
            commands::parse::run(file.as_deref(), context.as_deref())
        }
        Command::Submit { context, webhook_url } => commands::submit::run(&context, webhook_url),
        Command::Accept { context, file, job_url } => {
            commands::accept::run(&context, file.as_deref(), job_url)
        }
        Command::Negotiate { message, file, context, negotiation_url } => {
            commands::negotiate::run(&message, file.as_deref(), context.as_deref(), negotiation_url)
        }
        Command::Ping { webhook_url } => commands::ping::run(webhook_url),
        Command::Export { format, context, file } => {
            commands::export::run(format, file.as_deref(), &context)
        }
        Command::Config => commands::CommandResult::raw(commands::config::run()),
    };

    if result.output.ends_with('\n') {
        print!("{}", result.output);
    } else {
        println!("{}", result.output);
    }
    ExitCode::from(result.exit_code)
}

fn init_logging(config: &AppConfig) {
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(log_level)
        .with_writer(std::io::stderr);

    match config.logging.format {
        LogFormat::Compact => builder.compact().init(),
        LogFormat::Pretty => builder.pretty().init(),
        LogFormat::Json => builder.json().init(),
    }
}
