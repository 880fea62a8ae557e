use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use log::error;
use packs::viz::Dot;
use packs::{PackCalc, SolverConfig};

#[derive(Parser, Debug)]
#[command(name = "packs")]
#[command(about = "Works out which packs to ship for an order", long_about = None)]
#[command(after_help = "Example: packs 12001 250 500 1000 2000 5000")]
#[command(allow_negative_numbers = true)]
struct Cli {
    /// How many items need to be sent
    quantity: i64,

    /// The available pack sizes
    #[arg(required = true, num_args = 1..)]
    pack_sizes: Vec<i64>,

    /// Write the solved graph as Graphviz DOT to this file
    #[arg(long, value_name = "PATH")]
    viz: Option<PathBuf>,

    /// Stop exploring once enough exact matches are found (faster, may use more packs)
    #[arg(long)]
    early_exit: bool,

    /// Report timing
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    // install global collector configured based on RUST_LOG env var.
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let start = Instant::now();

    let config = SolverConfig {
        early_exit: cli.early_exit,
        ..SolverConfig::default()
    };
    let mut calc = match PackCalc::with_config(cli.quantity, &cli.pack_sizes, config) {
        Ok(calc) => calc,
        Err(err) => {
            eprintln!("{}", err);
            return ExitCode::from(2);
        }
    };

    let packs = match calc.calculate() {
        Ok(packs) => packs,
        Err(err) => {
            error!("{}", err);
            return ExitCode::FAILURE;
        }
    };

    if !packs.is_empty() {
        println!("{}", packs);
    }

    if cli.verbose {
        println!(
            "Finished in {:.3} seconds, {} packs shipping {} items",
            start.elapsed().as_secs_f64(),
            packs.total_packs(),
            packs.shipped()
        );
    }

    if let Some(path) = cli.viz {
        let dot = Dot::new(calc.graph()).highlight(calc.path()).render();
        if let Err(err) = std::fs::write(&path, dot) {
            eprintln!("could not write {}: {}", path.display(), err);
            return ExitCode::FAILURE;
        }
        println!("Wrote graph to {}", path.display());
    }

    ExitCode::SUCCESS
}
