//! `srvote plan` command implementation

use anyhow::{bail, Context, Result};
use serde::Serialize;
use srvote_core::allocator::{step, Command, State};
use srvote_core::input::parse_vote_input;
use srvote_core::{Balance, Ballot, CandidateId, VoteConfig, VoteState, VoteStatus};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{debug, warn};

use super::{load_candidates, OutputFormat};

pub struct PlanArgs {
    pub balance: Option<u64>,
    pub frozen_sun: Option<u64>,
    pub candidates: Option<PathBuf>,
    pub inputs: Vec<String>,
    pub format: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputValue {
    Text(String),
    Step(i64),
}

/// Parse `ID=VALUE`.
pub fn parse_input(raw: &str) -> Result<(CandidateId, InputValue)> {
    let Some((id, value)) = raw.split_once('=') else {
        bail!("Expected ID=VALUE, got '{raw}'");
    };
    let id = id.trim();
    if id.is_empty() {
        bail!("Missing candidate id in '{raw}'");
    }
    let value = match value.trim() {
        "+" => InputValue::Step(1),
        "-" => InputValue::Step(-1),
        _ => InputValue::Text(value.to_string()),
    };
    Ok((CandidateId::new(id), value))
}

/// Replay `inputs` against a fresh allocation of `balance` votes.
pub fn plan(
    balance: u64,
    inputs: &[(CandidateId, InputValue)],
    config: &VoteConfig,
) -> Result<State> {
    let mut state = State::with_balance(balance);
    if balance == 0 {
        return Ok(state);
    }
    state = step(&state, Command::EnableVoting)?.0;

    let step_size = i64::try_from(config.allocation.step_size(balance)).unwrap_or(i64::MAX);
    for (candidate, value) in inputs {
        let requested = match value {
            InputValue::Text(text) => parse_vote_input(text),
            InputValue::Step(direction) => {
                let current =
                    i64::try_from(state.allocation.votes_for(candidate)).unwrap_or(i64::MAX);
                Some(current.saturating_add(step_size.saturating_mul(*direction)))
            }
        };
        state = step(
            &state,
            Command::SetVote {
                candidate: candidate.clone(),
                requested,
            },
        )
        .with_context(|| format!("Failed to set votes for {candidate}"))?
        .0;
        debug!(%candidate, votes = state.allocation.votes_for(candidate), "input applied");
    }
    Ok(state)
}

#[derive(Serialize)]
struct PlanOutput<'a> {
    status: &'a VoteStatus,
    ballot: &'a Ballot,
    step_size: u64,
}

pub fn run(args: PlanArgs, config: &VoteConfig) -> Result<()> {
    let format = OutputFormat::parse(&args.format)?;
    let balance = match (args.balance, args.frozen_sun) {
        (Some(votes), _) => votes,
        (None, Some(sun)) => Balance::from_frozen_sun(sun).votes(),
        (None, None) => bail!("Provide --balance or --frozen-sun"),
    };

    let names: HashMap<CandidateId, String> = match &args.candidates {
        Some(path) => load_candidates(path)?
            .into_iter()
            .map(|c| {
                let name = c.display_name().to_string();
                (c.id, name)
            })
            .collect(),
        None => HashMap::new(),
    };

    let inputs = args
        .inputs
        .iter()
        .map(|raw| parse_input(raw))
        .collect::<Result<Vec<_>>>()?;
    if !names.is_empty() {
        for (id, _) in &inputs {
            if !names.contains_key(id) {
                warn!(candidate = %id, "not in candidate list");
            }
        }
    }

    let state = plan(balance, &inputs, config)?;
    let status = state.status();
    let ballot = state.allocation.to_ballot();
    let step_size = config.allocation.step_size(balance);

    match format {
        OutputFormat::Json => {
            let out = PlanOutput {
                status: &status,
                ballot: &ballot,
                step_size,
            };
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        OutputFormat::Human => {
            if ballot.is_empty() {
                println!("No votes allocated.");
            }
            for (id, votes) in ballot.iter() {
                match names.get(id).filter(|n| !n.is_empty()) {
                    Some(name) => println!("{votes:>12}  {id}  ({name})"),
                    None => println!("{votes:>12}  {id}"),
                }
            }
            println!();
            match status.state {
                VoteState::Remaining => println!(
                    "{}: {} of {}",
                    status.state.message(),
                    status.available,
                    status.balance
                ),
                other => println!("{}", other.message()),
            }
            if let Some(pct) = status.percentage {
                println!("Spent: {} ({pct:.2}%)", status.spent);
            }
        }
    }
    Ok(())
}
