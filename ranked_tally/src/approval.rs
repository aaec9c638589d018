use log::debug;

use crate::config::{ApprovalStats, Ballot};

/// Computes how many ballots approve each option.
///
/// The percentage is relative to the total number of ballots, and is zero
/// when there are no ballots at all.
pub fn calculate_approval(ballots: &[Ballot], options: &[String]) -> ApprovalStats {
    let total = ballots.len() as u64;
    let counts: Vec<(String, u64)> = options
        .iter()
        .map(|name| {
            let count = ballots
                .iter()
                .filter(|b| b.approvals.iter().any(|a| a == name))
                .count() as u64;
            (name.clone(), count)
        })
        .collect();
    let percentages: Vec<(String, f64)> = counts
        .iter()
        .map(|(name, count)| {
            let pct = if total == 0 {
                0.0
            } else {
                (*count as f64) * 100.0 / (total as f64)
            };
            (name.clone(), pct)
        })
        .collect();
    debug!("calculate_approval: counts: {:?}", counts);
    ApprovalStats {
        counts,
        percentages,
    }
}
