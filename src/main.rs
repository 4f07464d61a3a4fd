use clap::Parser;
use std::fs;
use std::path::PathBuf;
use tablegrid::{AssemblyConfig, TableAssembler, TableInput};

#[derive(Parser, Debug)]
#[command(name = "tablegrid")]
#[command(about = "Assembles table structure predictions and words into a grid")]
struct Args {
    /// Table input JSON: width, height, predictions and words
    input: PathBuf,

    /// Assembly configuration JSON
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Pretty-print the output
    #[arg(long, short = 'p')]
    pretty: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tablegrid=info".into()),
        )
        .init();

    let config = match args.config {
        Some(path) => AssemblyConfig::from_file(path)?,
        None => AssemblyConfig::default(),
    };

    let input: TableInput = serde_json::from_str(&fs::read_to_string(&args.input)?)?;
    let table = TableAssembler::new(config).assemble_input(&input)?;

    let output = if args.pretty {
        serde_json::to_string_pretty(&table)?
    } else {
        serde_json::to_string(&table)?
    };
    println!("{output}");

    Ok(())
}
