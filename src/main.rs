use std::path::PathBuf;

use clap::Parser;
use pipe_cutter::config::CutConfig;
use pipe_cutter::observer::TracingObserver;
use pipe_cutter::render;
use pipe_cutter::report::Summary;
use pipe_cutter::validate::{validate_input, validate_results};
use pipe_cutter::{CutError, Demand, Job, Solver, Stock};
use tracing::Level;

#[derive(Parser)]
#[command(
    name = "pipe_cutter",
    about = "1D cutting-stock allocator for pipe and tube lengths"
)]
struct Cli {
    /// Stock pieces as TYPE:LENGTH:QTY (e.g. SQ25:6000:2, or :6000:2 with no type)
    #[arg(long = "stock", num_args = 1..)]
    stocks: Vec<String>,

    /// Cut pieces as TYPE:LENGTH:QTY (e.g. SQ25:1200:4)
    #[arg(long = "cuts", num_args = 1..)]
    cuts: Vec<String>,

    /// JSON job file with "stocks", "demands" and optional "config"
    #[arg(long, conflicts_with_all = ["stocks", "cuts"])]
    input: Option<PathBuf>,

    /// Length used for types without stock of their own [default: 5850].
    /// Overrides the job file's config when given with --input
    #[arg(long)]
    default_length: Option<u32>,

    /// Longest stock length accepted for exact optimization [default: 10000].
    /// Overrides the job file's config when given with --input
    #[arg(long)]
    max_capacity: Option<u32>,

    /// Most pieces the stocks or the cuts may expand to [default: 5000]
    #[arg(long)]
    max_pieces: Option<u32>,

    /// Show ASCII layout of each stock piece
    #[arg(long)]
    layout: bool,

    /// Print results as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Log allocation steps to stderr
    #[arg(long, short)]
    verbose: bool,
}

/// Parses `TYPE:LENGTH:QTY`; the type may be empty or omitted entirely.
fn parse_entry(s: &str) -> Result<(String, u32, u32), String> {
    let mut parts = s.rsplitn(3, ':');
    let qty = parts.next().unwrap_or_default();
    let length = parts
        .next()
        .ok_or_else(|| format!("invalid entry '{}', expected TYPE:LENGTH:QTY", s))?;
    let tube_type = parts.next().unwrap_or_default();

    let length = length
        .parse::<u32>()
        .map_err(|_| format!("invalid length in '{}'", s))?;
    let qty = qty
        .parse::<u32>()
        .map_err(|_| format!("invalid quantity in '{}'", s))?;
    if length == 0 || qty == 0 {
        return Err(format!("length and quantity must be non-zero in '{}'", s));
    }
    Ok((tube_type.to_string(), length, qty))
}

/// Applies the command-line limits on top of `config`.
fn apply_overrides(cli: &Cli, mut config: CutConfig) -> CutConfig {
    if let Some(length) = cli.default_length {
        config = config.with_default_stock_length(length);
    }
    if let Some(capacity) = cli.max_capacity {
        config = config.with_max_capacity(capacity);
    }
    if let Some(pieces) = cli.max_pieces {
        config = config.with_max_pieces(pieces);
    }
    config
}

fn load_job(cli: &Cli) -> Result<Job, CutError> {
    if let Some(path) = &cli.input {
        let text = std::fs::read_to_string(path)
            .map_err(|e| CutError::Input(format!("cannot read {}: {}", path.display(), e)))?;
        let mut job: Job = serde_json::from_str(&text)
            .map_err(|e| CutError::Input(format!("invalid job file {}: {}", path.display(), e)))?;
        job.config = apply_overrides(cli, job.config);
        return Ok(job);
    }

    let stocks = cli
        .stocks
        .iter()
        .map(|s| parse_entry(s).map(|(t, len, qty)| Stock::new(t, len, qty)))
        .collect::<Result<Vec<_>, _>>()
        .map_err(CutError::Input)?;
    let demands = cli
        .cuts
        .iter()
        .map(|s| parse_entry(s).map(|(t, len, qty)| Demand::new(t, len, qty)))
        .collect::<Result<Vec<_>, _>>()
        .map_err(CutError::Input)?;

    Ok(Job {
        stocks,
        demands,
        config: apply_overrides(cli, CutConfig::default()),
    })
}

fn run(cli: &Cli) -> Result<(), CutError> {
    let job = load_job(cli)?;
    validate_input(&job.stocks, &job.demands, &job.config)?;

    let solver = Solver::new(job.config).with_observer(TracingObserver);
    let results = solver.solve(&job.stocks, &job.demands)?;

    let check = validate_results(&results, &job.demands);
    for warning in &check.warnings {
        tracing::warn!("{warning}");
    }

    if cli.json {
        let text = serde_json::to_string_pretty(&results)
            .map_err(|e| CutError::Input(format!("cannot encode results: {e}")))?;
        println!("{text}");
        return Ok(());
    }

    for result in &results {
        println!("Type {} (stock {}):", result.stock_type, result.stock_length);
        if result.is_empty() {
            println!("  no matching demand");
        }
        for (i, group) in result.groups.iter().enumerate() {
            let cuts: Vec<String> = group.items.iter().map(u32::to_string).collect();
            let flag = if group.is_over_capacity() {
                " [exceeds stock]"
            } else {
                ""
            };
            println!(
                "  Piece {} ({}): {} | used {}, remainder {}{}",
                i + 1,
                group.stock_length,
                cuts.join(", "),
                group.used,
                group.remainder(),
                flag
            );
            if cli.layout {
                print!("{}", render::render_group(group));
            }
        }
        println!();
    }

    let summary = Summary::from_results(&results);
    println!(
        "Summary: {} piece{} used, {:.1}% waste",
        summary.pieces,
        if summary.pieces == 1 { "" } else { "s" },
        summary.waste_percent(),
    );
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .init();

    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
