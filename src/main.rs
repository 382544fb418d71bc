use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use webir::commands::{open_input, run_extract, run_interfaces, run_validate};
use webir::extractor::script::{DEFAULT_NODE, DEFAULT_SCRIPT};
use webir::{logging, ExtractorConfig};

#[derive(Parser)]
#[command(name = "webir", author, version, about = "Interface IR extractor and validator", long_about = None)]
struct Cli {
    #[command(flatten)]
    gateway: GatewayArgs,

    /// Log debug output to stderr (overridden by WEBIR_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the IR, optionally only for the named interfaces
    Extract {
        /// Interfaces to keep (default: all)
        interfaces: Vec<String>,
        /// File path to write output to instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List all known interfaces, sorted
    Interfaces,
    /// Validate an IR document
    Validate {
        /// Input JSON file (`-` or omitted reads stdin)
        #[arg(short = 'i', long = "in", value_name = "FILE")]
        input: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct GatewayArgs {
    /// Parse this TypeScript declaration file in process instead of running the script
    #[arg(long, env = "WEBIR_DTS", global = true)]
    dts: Option<PathBuf>,

    /// Node extraction script
    #[arg(long, env = "WEBIR_SCRIPT", default_value = DEFAULT_SCRIPT, global = true)]
    script: PathBuf,

    /// Node executable used to run the script
    #[arg(long, env = "WEBIR_NODE", default_value = DEFAULT_NODE, global = true)]
    node: String,
}

impl From<GatewayArgs> for ExtractorConfig {
    fn from(args: GatewayArgs) -> Self {
        ExtractorConfig { dts: args.dts, script: args.script, node: args.node }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = ExtractorConfig::from(cli.gateway);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Extract { interfaces, output } => {
            run_extract(config.build().as_ref(), &interfaces, output.as_deref(), &mut out)?
        }
        Commands::Interfaces => run_interfaces(config.build().as_ref(), &mut out)?,
        Commands::Validate { input } => {
            let reader = open_input(input.as_deref())?;
            run_validate(reader, &mut out)?;
        }
    }
    out.flush()?;
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}
