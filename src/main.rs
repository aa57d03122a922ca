mod commands;
mod config;
mod envelope;
mod error;
mod fixture;
mod invoker;
mod output;

use clap::{ArgAction, Parser, Subcommand};
use commands::config_cmd::ConfigCmd;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "invoke-api",
    version,
    about = "Invoke a local SAM function with merged request fixtures"
)]
struct Cli {
    /// Base API request fixture
    #[arg(long, env = "INVOKE_API_BASE", global = true)]
    base: Option<PathBuf>,

    /// Overlay fixture merged on top of the base request
    #[arg(long, env = "INVOKE_API_OVERLAY", global = true)]
    overlay: Option<PathBuf>,

    /// File receiving the emulator's stderr
    #[arg(long, env = "INVOKE_API_LOG_FILE", global = true)]
    log_file: Option<PathBuf>,

    /// Emulator executable
    #[arg(long, env = "INVOKE_API_PROGRAM", global = true)]
    program: Option<String>,

    /// Logical name of the function to invoke
    #[arg(long, env = "INVOKE_API_FUNCTION", global = true)]
    function: Option<String>,

    /// Output format: text, json, yaml, table
    #[arg(short, long, env = "INVOKE_API_OUTPUT", global = true)]
    output: Option<String>,

    /// Config file location
    #[arg(long, env = "INVOKE_API_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Increase diagnostic logging (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge the fixtures, invoke the function and summarize the response
    Invoke,
    /// Print the merged request without invoking anything
    Merge,
    /// Manage local configuration
    Config {
        #[command(subcommand)]
        cmd: ConfigCmd,
    },
    /// Show version
    Version,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> error::Result<()> {
    let config_path = cli.config.unwrap_or_else(config::InvokeConfig::default_path);
    let overrides = config::Overrides {
        base: cli.base,
        overlay: cli.overlay,
        log_file: cli.log_file,
        program: cli.program,
        function: cli.function,
        output: cli.output,
    };

    let command = match cli.command.unwrap_or(Commands::Invoke) {
        Commands::Version => {
            println!("invoke-api {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        other => other,
    };

    let settings =
        config::Settings::resolve(overrides, config::InvokeConfig::load(&config_path)?);
    output::check_format(&settings.output)?;

    match command {
        Commands::Invoke => commands::invoke::run(&settings),
        Commands::Merge => commands::merge::run(&settings),
        Commands::Config { cmd } => commands::config_cmd::run(cmd, &config_path, &settings.output),
        Commands::Version => Ok(()),
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        output::print_error(&e.to_string());
        std::process::exit(1);
    }
}
