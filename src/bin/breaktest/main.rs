// Governance Break-Test Runner
// Sweeps mechanisms through collusion, whale, sybil and bias attacks and ranks
// them by how often the network still reached the objectively correct outcome.
//
// Usage:
//   cargo run --release --bin breaktest                          # 1000 mechanisms
//   cargo run --release --bin breaktest -- --num-mechanisms -1   # full grid
//   cargo run --release --bin breaktest -- --catalog --json      # reference catalog only
//   RUST_LOG=debug cargo run --release --bin breaktest -- --num-mechanisms 5

mod report;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use governance_arena::generator::{real_world_catalog, total_possible, MechanismGenerator};
use governance_arena::pipeline::{rank, real_world_ranking};
use governance_arena::{AttackType, BreakTestSettings};

// ─── CLI ────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "breaktest")]
#[command(about = "Governance mechanism break-test pipeline", long_about = None)]
struct Cli {
    /// Mechanisms to test; -1 sweeps every grid point
    #[arg(long, allow_negative_numbers = true)]
    num_mechanisms: Option<i64>,

    /// Worker threads (default: available parallelism)
    #[arg(long)]
    workers: Option<usize>,

    /// Output file base name
    #[arg(long)]
    output: Option<String>,

    /// Base seed; mechanism i runs with seed + i
    #[arg(long)]
    seed: Option<u64>,

    /// Independent populations per attack
    #[arg(long)]
    instances: Option<usize>,

    /// Proposals per population
    #[arg(long)]
    rounds: Option<usize>,

    /// Size of the top-N ranking
    #[arg(long)]
    top: Option<usize>,

    /// JSON settings file, applied before BREAKTEST_* variables
    #[arg(long)]
    config: Option<PathBuf>,

    /// Also write <output>_summary.json
    #[arg(long)]
    json: bool,

    /// Evaluate only the real-world reference catalog
    #[arg(long)]
    catalog: bool,
}

impl Cli {
    fn apply(&self, settings: &mut BreakTestSettings) -> Result<()> {
        match self.num_mechanisms {
            Some(-1) => settings.num_mechanisms = None,
            Some(n) if n < 0 => bail!("--num-mechanisms must be -1 or non-negative, got {n}"),
            Some(n) => settings.num_mechanisms = Some(n as usize),
            None => {}
        }
        if let Some(w) = self.workers {
            settings.workers = w;
        }
        if let Some(o) = &self.output {
            settings.output = o.clone();
        }
        if let Some(s) = self.seed {
            settings.seed = s;
        }
        if let Some(i) = self.instances {
            settings.instances = i;
        }
        if let Some(r) = self.rounds {
            settings.rounds = r;
        }
        if let Some(t) = self.top {
            settings.top_n = t;
        }
        settings.write_json |= self.json;
        settings.catalog_only |= self.catalog;
        Ok(())
    }
}

// ─── Main ───────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let mut settings =
        BreakTestSettings::load(cli.config.as_deref()).context("failed to load settings")?;
    cli.apply(&mut settings)?;

    let mechanisms = if settings.catalog_only {
        real_world_catalog()
    } else {
        MechanismGenerator::new(settings.seed).sweep(settings.num_mechanisms)
    };

    println!("\n  Governance Break-Test Pipeline v{}", env!("CARGO_PKG_VERSION"));
    println!(
        "  PRNG: ChaCha8Rng | Base seed: {} | Workers: {}",
        settings.seed,
        settings.workers.max(1)
    );
    println!(
        "  Mechanisms: {} (grid size {}) | 4 attacks x {} instances x {} rounds = {} votes each",
        mechanisms.len(),
        total_possible(),
        settings.instances,
        settings.rounds,
        settings.votes_per_mechanism()
    );
    println!(
        "  Total votes to simulate: {}\n",
        mechanisms.len() * settings.votes_per_mechanism()
    );

    let outcome = settings
        .pipeline()
        .run(&mechanisms)
        .context("break-test pipeline failed")?;
    let summary = outcome.summary.clone();
    let ranked = rank(outcome.evaluations);
    let real_world = real_world_ranking(&ranked, settings.top_n);

    // ─── Summary ────────────────────────────────────────────────────────

    println!("  Pipeline completed in {:.2}s", summary.elapsed_ms as f64 / 1000.0);
    println!("    Mechanisms tested:     {}", summary.total_mechanisms);
    println!("    Total votes simulated: {}", summary.total_votes);
    println!("    Average success rate:  {:.3}", summary.average_success_rate);
    println!("    Best mechanism:        {:.3}", summary.best_score);
    println!("    Worst mechanism:       {:.3}\n", summary.worst_score);

    println!(
        "  {:>4} {:>8} {:>9} {:>7} {:>7} {:>7}  Mechanism",
        "Rank", "Overall", "Collusion", "Whale", "Sybil", "Bias"
    );
    println!("  {}", "-".repeat(96));
    for r in ranked.iter().take(10) {
        let e = &r.evaluation;
        println!(
            "  {:>4} {:>8.4} {:>9.4} {:>7.4} {:>7.4} {:>7.4}  {}",
            r.rank,
            e.overall_score(),
            e.score_for(AttackType::Collusion),
            e.score_for(AttackType::Whale),
            e.score_for(AttackType::Sybil),
            e.score_for(AttackType::Bias),
            e.mechanism
        );
    }

    if let Some(best) = real_world.first() {
        let in_top = real_world.iter().filter(|r| r.top_rank.is_some()).count();
        println!(
            "\n  Real-world mechanisms: {} ranked, {} in top {} | best: {} ({:.4})",
            real_world.len(),
            in_top,
            settings.top_n,
            best.class.as_str(),
            best.evaluation.overall_score(),
        );
    }

    let files = report::write_all(&settings, &summary, &ranked, &real_world)
        .context("failed to write result files")?;
    info!(top = %files.top.display(), real_world = %files.real_world.display(), "results saved");
    println!("\n  Results saved:");
    println!("    Top {} mechanisms:          {}", settings.top_n, files.top.display());
    println!("    Real-world mechanism ranking: {}", files.real_world.display());
    if let Some(path) = &files.summary {
        println!("    Summary:                      {}", path.display());
    }
    println!();
    Ok(())
}
