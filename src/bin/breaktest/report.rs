// Result Files: top-N CSV, real-world ranking CSV, optional JSON summary

use std::io::Write;
use std::path::{Path, PathBuf};

use governance_arena::adapter::round_score;
use governance_arena::pipeline::{PipelineSummary, RankedMechanism, RealWorldRanking};
use governance_arena::{AttackType, BreakTestSettings, MechanismConfig, MechanismEvaluation};
use serde::Serialize;

const SCORE_DECIMALS: u32 = 4;

const SCORE_COLUMNS: &str = "overall_score,collusion_score,whale_score,sybil_score,bias_score";
const CONFIG_COLUMNS: &str = "voting_method,stake_method,slashing_method,consensus_threshold,\
slashing_rate,sybil_resistance,max_voting_power";

/// Paths of every file a run produced.
#[derive(Debug, Clone)]
pub struct WrittenFiles {
    pub top: PathBuf,
    pub real_world: PathBuf,
    pub summary: Option<PathBuf>,
}

pub fn top_path(output: &str, top_n: usize) -> PathBuf {
    PathBuf::from(format!("{output}_top_{top_n}.csv"))
}

pub fn real_world_path(output: &str) -> PathBuf {
    PathBuf::from(format!("{output}_real_world_ranking.csv"))
}

pub fn summary_path(output: &str) -> PathBuf {
    PathBuf::from(format!("{output}_summary.json"))
}

// ─── CSV ────────────────────────────────────────────────────────────────────

fn score_cells(e: &MechanismEvaluation) -> String {
    let mut cells = vec![format_score(e.overall_score())];
    cells.extend(AttackType::ALL.iter().map(|&a| format_score(e.score_for(a))));
    cells.join(",")
}

fn format_score(v: f64) -> String {
    format!("{:.4}", round_score(v, SCORE_DECIMALS))
}

fn config_cells(m: &MechanismConfig) -> String {
    format!(
        "{},{},{},{},{},{},{}",
        m.voting_method,
        m.stake_method,
        m.slashing_method,
        m.consensus_threshold.normalize(),
        m.slashing_rate.normalize(),
        m.sybil_resistance.normalize(),
        m.max_voting_power.normalize(),
    )
}

/// First `top_n` ranked mechanisms.
pub fn write_top<W: Write>(out: &mut W, ranked: &[RankedMechanism], top_n: usize) -> std::io::Result<()> {
    writeln!(out, "rank,{SCORE_COLUMNS},{CONFIG_COLUMNS}")?;
    for r in ranked.iter().take(top_n) {
        writeln!(
            out,
            "{},{},{}",
            r.rank,
            score_cells(&r.evaluation),
            config_cells(&r.evaluation.mechanism)
        )?;
    }
    Ok(())
}

/// Every catalog mechanism with its top-N position, empty when it missed the cut.
pub fn write_real_world<W: Write>(
    out: &mut W,
    ranking: &[RealWorldRanking],
    top_n: usize,
) -> std::io::Result<()> {
    writeln!(out, "real_world_rank,{SCORE_COLUMNS},top_{top_n}_rank,{CONFIG_COLUMNS}")?;
    for r in ranking {
        let top_rank = r.top_rank.map(|t| t.to_string()).unwrap_or_default();
        writeln!(
            out,
            "{},{},{},{}",
            r.real_world_rank,
            score_cells(&r.evaluation),
            top_rank,
            config_cells(&r.evaluation.mechanism)
        )?;
    }
    Ok(())
}

fn create(path: &Path) -> std::io::Result<std::io::BufWriter<std::fs::File>> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(std::io::BufWriter::new(std::fs::File::create(path)?))
}

// ─── JSON ───────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct SummaryReport<'a> {
    pub version: &'static str,
    pub prng: &'static str,
    pub settings: &'a BreakTestSettings,
    pub summary: &'a PipelineSummary,
    pub real_world: Vec<RealWorldEntry>,
}

#[derive(Debug, Serialize)]
pub struct RealWorldEntry {
    pub real_world_rank: usize,
    pub class: &'static str,
    pub top_rank: Option<usize>,
    pub overall_score: f64,
    pub mechanism: MechanismConfig,
}

impl RealWorldEntry {
    fn from_ranking(r: &RealWorldRanking) -> Self {
        Self {
            real_world_rank: r.real_world_rank,
            class: r.class.as_str(),
            top_rank: r.top_rank,
            overall_score: round_score(r.evaluation.overall_score(), SCORE_DECIMALS),
            mechanism: r.evaluation.mechanism,
        }
    }
}

// ─── Entry Point ────────────────────────────────────────────────────────────

pub fn write_all(
    settings: &BreakTestSettings,
    summary: &PipelineSummary,
    ranked: &[RankedMechanism],
    real_world: &[RealWorldRanking],
) -> std::io::Result<WrittenFiles> {
    let top = top_path(&settings.output, settings.top_n);
    let mut file = create(&top)?;
    write_top(&mut file, ranked, settings.top_n)?;
    file.flush()?;

    let rw = real_world_path(&settings.output);
    let mut file = create(&rw)?;
    write_real_world(&mut file, real_world, settings.top_n)?;
    file.flush()?;

    let summary_file = if settings.write_json {
        let path = summary_path(&settings.output);
        let report = SummaryReport {
            version: env!("CARGO_PKG_VERSION"),
            prng: "ChaCha8Rng",
            settings,
            summary,
            real_world: real_world.iter().map(RealWorldEntry::from_ranking).collect(),
        };
        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        std::fs::write(&path, json)?;
        Some(path)
    } else {
        None
    };

    Ok(WrittenFiles { top, real_world: rw, summary: summary_file })
}
