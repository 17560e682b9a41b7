use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use mm_core::{Algebra, BlockSize, Matrix, RayonExecutor, Strategy};
use mm_fill::{fill_matrix, UniformFill};
use tracing::{debug, info};
use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Rows of the left operand
    #[arg(long, default_value_t = 47)]
    m: usize,

    /// Columns of the left operand and rows of the right operand
    #[arg(long, default_value_t = 23)]
    k: usize,

    /// Columns of the right operand
    #[arg(long, default_value_t = 32)]
    n: usize,

    /// Seed for the random operands
    #[arg(short, long, default_value_t = 2024)]
    seed: u64,

    /// Smallest generated element (inclusive)
    #[arg(long, default_value_t = 1)]
    low: i64,

    /// Largest generated element (exclusive)
    #[arg(long, default_value_t = 9)]
    high: i64,

    /// Worker threads; 0 lets rayon decide
    #[arg(short, long, default_value_t = 0)]
    threads: usize,

    /// Strategies to run, in order (all of them if omitted)
    #[arg(long = "strategy", value_enum)]
    strategies: Vec<StrategyArg>,

    /// Row threshold for the box strategy
    #[arg(long, default_value_t = 2)]
    block_rows: usize,

    /// Column threshold for the box strategy
    #[arg(long, default_value_t = 2)]
    block_cols: usize,

    /// Print the operands and every product
    #[arg(short, long)]
    print: bool,

    /// Check every product against a single-threaded reference
    #[arg(long)]
    verify: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum StrategyArg {
    Iterative,
    Vector,
    Box,
}

impl StrategyArg {
    fn resolve(self, block: BlockSize) -> Strategy {
        match self {
            StrategyArg::Iterative => Strategy::Iterative,
            StrategyArg::Vector => Strategy::RecursiveVector,
            StrategyArg::Box => Strategy::RecursiveBox(block),
        }
    }
}

/// Log to stdout, honouring `RUST_LOG` and defaulting to `info`.
fn init_subscriber() {
    let fmt_layer = fmt::layer().with_target(true);

    let filter_layer = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}

fn random_matrix(rows: usize, cols: usize, fill: &mut UniformFill<i64>) -> Result<Matrix<i64>> {
    fill_matrix(rows, cols, Algebra::standard(), fill)
        .with_context(|| format!("failed to build a {rows}x{cols} operand"))
}

fn main() -> Result<()> {
    init_subscriber();
    let args = Args::parse();
    debug!(?args, "parsed arguments");

    let block = BlockSize::new(args.block_rows, args.block_cols).context("invalid block size")?;
    let strategies: Vec<Strategy> = if args.strategies.is_empty() {
        vec![
            Strategy::Iterative,
            Strategy::RecursiveVector,
            Strategy::RecursiveBox(block),
        ]
    } else {
        args.strategies.iter().map(|s| s.resolve(block)).collect()
    };

    let mut fill = UniformFill::new(args.low, args.high, args.seed)?;
    let a = random_matrix(args.m, args.k, &mut fill)?;
    let b = random_matrix(args.k, args.n, &mut fill)?;
    if args.print {
        println!("A =\n{a}\n");
        println!("B =\n{b}\n");
    }

    let executor = RayonExecutor::new(args.threads)?;
    info!(threads = executor.num_threads(), "thread pool ready");

    let reference = if args.verify {
        Some(a.multiply_reference(&b)?)
    } else {
        None
    };

    for strategy in strategies {
        let (product, report) = a
            .multiply_timed(&b, strategy, &executor)
            .with_context(|| format!("{strategy} multiplication failed"))?;
        println!("{report}");
        if args.print {
            println!("{product}\n");
        }
        if let Some(expected) = &reference {
            if &product != expected {
                bail!("{strategy} result differs from the reference product");
            }
            info!(%strategy, "matches reference");
        }
    }

    Ok(())
}
