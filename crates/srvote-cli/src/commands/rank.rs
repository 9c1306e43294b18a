//! `srvote rank` command implementation

use anyhow::Result;
use serde::Serialize;
use srvote_core::ranking::{
    biggest_gainer, filter_candidates, rank_candidates, total_votes, vote_share, RankedCandidate,
    VoteChange,
};
use srvote_core::Candidate;
use std::path::PathBuf;
use tracing::info;

use super::{load_candidates, OutputFormat};

#[derive(Debug, Serialize)]
pub struct RankRow {
    pub position: usize,
    pub id: String,
    pub name: String,
    /// Candidate publishes a profile page.
    pub has_page: bool,
    pub votes: u64,
    pub share: Option<f64>,
    pub change_day: VoteChange,
    pub change_cycle: VoteChange,
}

#[derive(Debug, Serialize)]
pub struct RankReport {
    pub total_votes: u64,
    pub biggest_gainer: Option<String>,
    pub rows: Vec<RankRow>,
}

/// Build the ranked report for `candidates`, keeping rows that match `search`.
pub fn build_report(candidates: &[Candidate], search: &str) -> RankReport {
    let ranked: Vec<RankedCandidate> = rank_candidates(candidates);
    let total = total_votes(candidates);

    let rows = filter_candidates(&ranked, search)
        .into_iter()
        .map(|r| {
            let c = &r.candidate;
            RankRow {
                position: r.position(),
                id: c.id.to_string(),
                name: c.display_name().to_string(),
                has_page: c.has_page,
                votes: c.current_votes,
                share: vote_share(c.current_votes, total),
                change_day: VoteChange::of(c.change_day),
                change_cycle: VoteChange::of(c.change_cycle),
            }
        })
        .collect();

    RankReport {
        total_votes: total,
        biggest_gainer: biggest_gainer(candidates).map(|c| c.id.to_string()),
        rows,
    }
}

pub fn run(candidates: PathBuf, search: &str, format: &str) -> Result<()> {
    let format = OutputFormat::parse(format)?;
    let candidates = load_candidates(&candidates)?;
    info!(count = candidates.len(), "candidates loaded");

    let report = build_report(&candidates, search);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Human => {
            println!(
                "{:>4}  {:<36} {:>14} {:>8} {:>10} {:>10}",
                "#", "NAME", "VOTES", "SHARE", "24H", "CYCLE"
            );
            for row in &report.rows {
                let share = row
                    .share
                    .map(|s| format!("{s:.2}%"))
                    .unwrap_or_else(|| "-".to_string());
                let name = if row.name.is_empty() { &row.id } else { &row.name };
                let name = if row.has_page {
                    format!("{name} *")
                } else {
                    name.to_string()
                };
                println!(
                    "{:>4}  {:<36} {:>14} {:>8} {:>10} {:>10}",
                    row.position,
                    name,
                    row.votes,
                    share,
                    row.change_day.to_string(),
                    row.change_cycle.to_string()
                );
            }
            println!();
            println!("Total votes: {}", report.total_votes);
            if report.rows.iter().any(|r| r.has_page) {
                println!("* has a profile page");
            }
            if let Some(gainer) = &report.biggest_gainer {
                println!("Biggest gainer this cycle: {gainer}");
            }
        }
    }
    Ok(())
}
