//! Plain-text rendering of a state snapshot.
//!
//! Every section shows the last good data it has, with the category's most
//! recent error underneath when there is one.

use std::fmt::Write;
use std::time::Duration;

use chrono::{DateTime, Utc};
use colored::Colorize;
use roundwatch_state::math::{format_percent, percent_to_f64};
use roundwatch_state::{Category, Phase, Quorum, QuorumSummary, ReconciliationState, UpgradeProgress, VoteState};

const NAME_WIDTH: usize = 25;
const BAR_WIDTH: usize = 40;

pub fn render(state: &ReconciliationState, now: DateTime<Utc>, paused: bool) -> String {
    let mut out = String::new();

    if paused {
        out.push_str(&format!("{}\n", "paused, press p + Enter to resume".yellow()));
    }

    out.push_str(&render_consensus(state, now));
    out.push('\n');
    out.push_str(&render_chain_info(state, now));
    out.push('\n');
    out.push_str(&render_validators(state));
    out.push('\n');
    out.push_str(&render_all_rounds(state));
    out
}

pub fn render_consensus(state: &ReconciliationState, now: DateTime<Utc>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", "Consensus".bold());

    let Some(quorum) = &state.quorum else {
        push_error(&mut out, state, Category::Consensus);
        push_error(&mut out, state, Category::Validators);
        if state.errors.consensus.is_none() && state.errors.validators.is_none() {
            out.push_str(" waiting for the first consensus state...\n");
        }
        return out;
    };

    let _ = writeln!(out, " height={} round={} step={}", state.height(), state.round(), state.step());

    if let Some(age) = state.round_age(now) {
        let _ = writeln!(out, " round started {} ago", format_duration(age.to_std().unwrap_or_default()));
    }

    let _ = writeln!(
        out,
        " prevote consensus (strict/inclusive): {}% / {}%",
        format_percent(&quorum.prevote_strict, 2),
        format_percent(&quorum.prevote_inclusive, 2)
    );
    let _ = writeln!(
        out,
        " precommit consensus (strict/inclusive): {}% / {}%",
        format_percent(&quorum.precommit_strict, 2),
        format_percent(&quorum.precommit_inclusive, 2)
    );
    let _ = writeln!(
        out,
        " prevoted/precommitted: {}% / {}%",
        format_percent(&quorum.prevote_participation, 2),
        format_percent(&quorum.precommit_participation, 2)
    );
    let _ = writeln!(out, " prevotes    {}", progress_bar(quorum, Phase::Prevote));
    let _ = writeln!(out, " precommits  {}", progress_bar(quorum, Phase::Precommit));

    if let Some(updated_at) = state.consensus_updated_at {
        let _ = writeln!(out, " last updated at: {}", format_time(updated_at));
    }

    push_error(&mut out, state, Category::Consensus);
    push_error(&mut out, state, Category::Validators);
    out
}

pub fn render_chain_info(state: &ReconciliationState, now: DateTime<Utc>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", "Chain".bold());

    if let Some(status) = &state.node_status {
        let _ = writeln!(out, " chain name: {}", status.network);
        let _ = writeln!(out, " tendermint version: v{}", status.version);
        let _ = writeln!(out, " node: {} ({})", status.moniker, status.node_id);
        if status.catching_up {
            let _ = writeln!(out, " {}", "node is catching up".yellow());
        }
    }
    push_error(&mut out, state, Category::Status);

    if let Some(block_time) = state.block_time {
        let _ = writeln!(out, " avg block time: {}", format_duration(block_time));
    }
    push_error(&mut out, state, Category::BlockTime);

    match (&state.upgrade, state.upgrade_progress(now)) {
        (Some(upgrade), Some(UpgradeProgress::InProgress)) => {
            let _ = writeln!(out, " upgrade {} in progress...", upgrade.name);
        }
        (Some(upgrade), Some(UpgradeProgress::Applied { blocks_since, approx_time })) => {
            let _ = writeln!(out, " chain upgrade {} applied at block {}", upgrade.name, upgrade.height);
            let _ = writeln!(out, " blocks since upgrade: {}", blocks_since);
            if let Some(time) = approx_time {
                let _ = writeln!(out, " upgrade approximate time: {}", format_time(time));
            }
        }
        (Some(upgrade), Some(UpgradeProgress::Scheduled { blocks_left, eta })) => {
            let _ = writeln!(out, " chain upgrade {} scheduled at block {}", upgrade.name, upgrade.height);
            let _ = writeln!(out, " blocks till upgrade: {}", blocks_left);
            if let Some(eta) = eta {
                let left = eta.signed_duration_since(now).to_std().unwrap_or_default();
                let _ = writeln!(out, " time till upgrade: {}", format_duration(left));
                let _ = writeln!(out, " upgrade estimated time: {}", format_time(eta));
            }
        }
        (Some(upgrade), None) => {
            let _ = writeln!(out, " chain upgrade {} scheduled at block {}", upgrade.name, upgrade.height);
        }
        (None, _) => {
            if state.errors.upgrade.is_none() {
                out.push_str(" no chain upgrade scheduled\n");
            }
        }
    }
    push_error(&mut out, state, Category::Upgrade);

    out
}

pub fn render_validators(state: &ReconciliationState) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", "Validators".bold());

    for row in state.validators_with_info() {
        let proposer = if row.round_vote.is_proposer { " [proposer]" } else { "" };
        let _ = writeln!(
            out,
            " {} {} {} {}% {}{}",
            row.round_vote.prevote.symbol(),
            row.round_vote.precommit.symbol(),
            fit(&(row.validator.index + 1).to_string(), 3),
            fit_right(&format_percent(&row.validator.voting_power_percent, 2), 6),
            fit(row.display_name(), NAME_WIDTH),
            proposer
        );
    }

    push_error(&mut out, state, Category::ChainValidators);
    out
}

/// One line per validator, one prevote/precommit pair per round
pub fn render_all_rounds(state: &ReconciliationState) -> String {
    let view = state.validators_with_all_round_votes();
    let mut out = String::new();
    let _ = writeln!(out, "{}", "All rounds".bold());

    if view.rounds.is_empty() {
        return out;
    }

    let header: Vec<String> = view.rounds.keys().map(|round| fit(&round.to_string(), 5)).collect();
    let _ = writeln!(out, " {} {}", fit("", NAME_WIDTH), header.join(" "));

    for (index, validator) in view.validators.iter().enumerate() {
        let cells: Vec<String> = view
            .rounds
            .values()
            .map(|votes| match votes.get(index) {
                Some(vote) => format!("{}{} ", vote.prevote.symbol(), vote.precommit.symbol()),
                None => fit("", 5),
            })
            .collect();

        let _ = writeln!(out, " {} {}", fit(validator.display_name(), NAME_WIDTH), cells.join(" "));
    }

    out
}

fn push_error(out: &mut String, state: &ReconciliationState, category: Category) {
    if let Some(error) = state.errors.get(category) {
        let line = format!(" {} fetch error: {}", category, error);
        let _ = writeln!(out, "{}", line.red());
    }
}

fn progress_bar(quorum: &QuorumSummary, phase: Phase) -> String {
    let percent = percent_to_f64(quorum.percent(phase, Quorum::Strict)).clamp(0.0, 100.0);
    let filled = ((percent / 100.0) * BAR_WIDTH as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}

/// Left-aligned, padded or cut to exactly `width` characters
pub fn fit(source: &str, width: usize) -> String {
    let cut: String = source.chars().take(width).collect();
    format!("{:<width$}", cut, width = width)
}

pub fn fit_right(source: &str, width: usize) -> String {
    let cut: String = source.chars().take(width).collect();
    format!("{:>width$}", cut, width = width)
}

/// Millisecond precision above a second, microseconds below
pub fn format_duration(duration: Duration) -> String {
    if duration >= Duration::from_secs(1) {
        format!("{:.3}s", duration.as_secs_f64())
    } else {
        format!("{:.3}ms", duration.as_secs_f64() * 1000.0)
    }
}

fn format_time(time: DateTime<Utc>) -> String {
    time.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Glyph legend shown under the table
pub fn legend() -> String {
    format!(
        " {} voted  {} voted for zero hash  {} no vote",
        VoteState::Voted.symbol(),
        VoteState::VotedZero.symbol(),
        VoteState::VotedNil.symbol()
    )
}
