//! Drawline CLI — ingest draw history files and report fire decisions.
//!
//! Commands:
//! - `run` — ingest a tab-separated draw file, score every period, and print
//!   the betting decision audit (table or JSON)
//! - `pool gen` — emit a seeded pseudo-random candidate pool, one value per
//!   line, suitable for `run --pool`

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;

use drawline_core::domain::{CandidatePool, MAX_POOL_SIZE};
use drawline_core::{EngineConfig, Period, Processor};

#[derive(Parser)]
#[command(
    name = "drawline",
    about = "Drawline CLI — draw-by-draw betting decision engine"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest a draw file and print the per-period decision audit.
    Run {
        /// Tab-separated draw file: one `period_id<TAB>draw_number` per line.
        /// Lines starting with '#' are skipped. Either chronological order is
        /// accepted; descending files are reversed before ingestion.
        #[arg(long)]
        draws: PathBuf,

        /// Candidate pool file, one value per line. Omitted: empty pool,
        /// every period judged a loss.
        #[arg(long)]
        pool: Option<PathBuf>,

        /// Engine config TOML. Omitted: defaults (cycle 8, threshold 70,
        /// window 20, multiplier 2.0).
        #[arg(long)]
        config: Option<PathBuf>,

        /// Emit the full period history as JSON instead of the table.
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Rows of recent history shown in table mode.
        #[arg(long, default_value_t = 20)]
        tail: usize,
    },
    /// Candidate pool commands.
    Pool {
        #[command(subcommand)]
        action: PoolAction,
    },
}

#[derive(Subcommand)]
enum PoolAction {
    /// Generate a pseudo-random pool and print it, one value per line.
    Gen {
        /// Number of distinct three-digit values.
        #[arg(long, default_value_t = MAX_POOL_SIZE)]
        size: usize,

        /// RNG seed. Omitted: a fresh random seed.
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            draws,
            pool,
            config,
            json,
            tail,
        } => run_decisions(&draws, pool.as_deref(), config.as_deref(), json, tail),
        Commands::Pool { action } => match action {
            PoolAction::Gen { size, seed } => run_pool_gen(size, seed),
        },
    }
}

fn run_decisions(
    draws_path: &Path,
    pool_path: Option<&Path>,
    config_path: Option<&Path>,
    json: bool,
    tail: usize,
) -> Result<()> {
    let config = load_config(config_path)?;
    let mut proc = Processor::new(config)?;

    if let Some(path) = pool_path {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading pool file {}", path.display()))?;
        let pool = CandidatePool::from_values(text.lines());
        if pool.is_empty() {
            bail!("pool file {} contains no usable values", path.display());
        }
        proc.set_candidate_pool(pool);
    }

    let records = load_draw_records(draws_path)?;
    if records.is_empty() {
        bail!("draw file {} contains no records", draws_path.display());
    }

    let results = proc.append_batch(
        records
            .iter()
            .map(|(id, draw)| (id.as_str(), draw.as_str())),
    );
    let rejected = results.iter().filter(|r| r.is_err()).count();
    if rejected > 0 {
        eprintln!("{rejected} record(s) rejected, see warnings");
    }
    if proc.history().is_empty() {
        bail!("every record was rejected");
    }

    if json {
        println!("{}", serde_json::to_string_pretty(proc.history())?);
    } else {
        print_table(&proc, tail);
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        None => Ok(EngineConfig::default()),
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            let config: EngineConfig =
                toml::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;
            Ok(config)
        }
    }
}

/// Parse `period_id<TAB>draw_number` lines, oldest first on return.
///
/// Exported histories usually arrive newest first; the order is detected from
/// the first and last ids and normalized to ascending.
fn load_draw_records(path: &Path) -> Result<Vec<(String, String)>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading draw file {}", path.display()))?;

    let mut records = Vec::new();
    for (lineno, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut fields = line.split('\t');
        match (fields.next(), fields.next()) {
            (Some(id), Some(draw)) => records.push((id.trim().to_string(), draw.trim().to_string())),
            _ => bail!(
                "{}:{}: expected `period_id<TAB>draw_number`",
                path.display(),
                lineno + 1
            ),
        }
    }

    if let (Some(first), Some(last)) = (records.first(), records.last()) {
        let newest_first = first.0.len() > last.0.len()
            || (first.0.len() == last.0.len() && first.0 > last.0);
        if newest_first {
            log::info!("draw file is newest-first, reversing");
            records.reverse();
        }
    }
    Ok(records)
}

fn print_table(proc: &Processor, tail: usize) {
    let history = proc.history();
    let start = history.len().saturating_sub(tail);

    println!(
        "{:<12} {:>8} {:>4} {:>9} {:>7} {:>5} {:>5} {:>10}",
        "period", "draw", "win", "k", "score", "fire", "gap", "cycle"
    );
    for p in &history[start..] {
        println!(
            "{:<12} {:>8} {:>4} {:>9.3} {:>7} {:>5} {:>5} {:>10}",
            p.period_id,
            p.draw_number,
            if p.is_win { "W" } else { "-" },
            p.k_value,
            p.score,
            if p.should_fire { "FIRE" } else { "-" },
            p.gap_value,
            cycle_label(p),
        );
    }

    let fires = history.iter().filter(|p| p.should_fire).count();
    let complete = history
        .iter()
        .filter(|p| p.should_fire && p.cycle_complete)
        .map(|p| p.cycle_id)
        .collect::<std::collections::BTreeSet<_>>()
        .len();
    let burst = history
        .iter()
        .filter(|p| p.should_fire && p.cycle_burst)
        .map(|p| p.cycle_id)
        .collect::<std::collections::BTreeSet<_>>()
        .len();
    println!(
        "\n{} periods, {} fires, {} cycles complete, {} burst",
        history.len(),
        fires,
        complete,
        burst
    );

    if let Some(last) = history.last() {
        println!(
            "latest period {}: score {}, {}",
            last.period_id,
            last.score,
            if last.should_fire { "FIRE" } else { "no fire" }
        );
        for detail in last.score_breakdown.iter().filter(|d| d.fired) {
            println!("  {:+6}  {}  ({})", detail.delta, detail.rule_name, detail.rationale);
        }
    }
}

fn cycle_label(p: &Period) -> String {
    if !p.in_cycle {
        return "-".to_string();
    }
    let state = if p.cycle_complete {
        "done"
    } else if p.cycle_burst {
        "burst"
    } else {
        "open"
    };
    format!("{}#{} {}", p.cycle_id, p.cycle_step, state)
}

fn run_pool_gen(size: usize, seed: Option<u64>) -> Result<()> {
    if size == 0 || size > MAX_POOL_SIZE {
        bail!("pool size must be between 1 and {MAX_POOL_SIZE}");
    }
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let pool = CandidatePool::random(size, &mut rng);
    for value in pool.values() {
        println!("{value}");
    }
    Ok(())
}
