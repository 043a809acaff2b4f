pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "salesdesk",
    about = "Salesdesk operator CLI",
    long_about = "Operate salesdesk migrations, config inspection, and offline dialog simulation.",
    after_help = "Examples:\n  salesdesk migrate\n  salesdesk config\n  salesdesk simulate --event turn.json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Inspect effective configuration values with secrets redacted")]
    Config,
    #[command(about = "Route a dialog event from a JSON file through the offline pipeline")]
    Simulate {
        #[arg(long, help = "Path to a dialog event JSON file (reads stdin when omitted)")]
        event: Option<std::path::PathBuf>,
        #[arg(long, help = "Canned completion text returned for any prompt")]
        completion: Option<String>,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Simulate { event, completion } => {
            commands::simulate::run(event.as_deref(), completion.as_deref())
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
