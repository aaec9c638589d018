mod approval;
pub mod builder;
mod config;
mod formatter;
pub mod manual;
mod validation;

use log::{debug, info};

use std::{
    collections::{BTreeMap, HashMap},
    ops::AddAssign,
};

pub use crate::approval::calculate_approval;
pub use crate::config::*;
pub use crate::formatter::{format_ballots, FormattedBallots, SkippedBallot};
pub use crate::validation::{check_options, validate_ballot, validate_choices};

// **** Private structures ****

type RoundId = u32;

// The position of the option in the list of options of the election.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
struct OptionId(u32);

impl OptionId {
    fn idx(self) -> usize {
        self.0 as usize
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Copy, PartialOrd, Ord, Hash)]
struct VoteCount(u64);

impl VoteCount {
    const EMPTY: VoteCount = VoteCount(0);
}

impl AddAssign for VoteCount {
    fn add_assign(&mut self, rhs: VoteCount) {
        self.0 += rhs.0;
    }
}

// The destination of a ballot when its current choice gets eliminated.
// Exhausted sorts after all the options.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
enum Destination {
    Option(OptionId),
    Exhausted,
}

// A ballot during the tally. The cursor points to the current choice and only
// moves forward, since eliminated options never come back.
#[derive(Eq, PartialEq, Debug, Clone)]
struct VoteInternal {
    ranks: Vec<OptionId>,
    cursor: usize,
}

impl VoteInternal {
    fn current(&self) -> Option<OptionId> {
        self.ranks.get(self.cursor).copied()
    }

    /// Moves to the highest ranked option that is still running.
    fn advance(&mut self, still_running: &[bool]) -> Option<OptionId> {
        while let Some(oid) = self.current() {
            if still_running[oid.idx()] {
                return Some(oid);
            }
            self.cursor += 1;
        }
        None
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
enum RoundOutcome {
    Winner(OptionId),
    /// The eliminated options, and for each of them where their votes went.
    Eliminated(Vec<OptionId>, Vec<(OptionId, BTreeMap<Destination, VoteCount>)>),
    UnbreakableTie,
}

#[derive(Eq, PartialEq, Debug, Clone)]
struct RoundStatistics {
    tally: Vec<(OptionId, VoteCount)>,
    outcome: RoundOutcome,
}

/// Runs the instant-runoff tally over clean ballots.
///
/// Arguments:
/// * `ballots` the ballots, usually produced by [format_ballots]
/// * `options` the registered options, in the order used to resolve all the
/// ties that the rules do not settle
/// * `rules` the rules that govern this election
///
/// Names in the rankings that are not registered options are ignored.
///
/// ```
/// use ranked_tally::*;
///
/// let options: Vec<String> = vec!["A".to_string(), "B".to_string()];
/// let ballots = vec![
///     Ballot::new(&["A".to_string()], &[]),
///     Ballot::new(&["A".to_string(), "B".to_string()], &[]),
///     Ballot::new(&["B".to_string()], &[]),
/// ];
/// let res = run_tally(&ballots, &options, &TallyRules::DEFAULT_RULES);
/// assert_eq!(res.winner, Some("A".to_string()));
/// assert_eq!(res.threshold, 2);
/// ```
pub fn run_tally(ballots: &[Ballot], options: &[String], rules: &TallyRules) -> TallyResult {
    info!(
        "Processing {:?} ballots, options: {:?}, rules: {:?}",
        ballots.len(),
        options,
        rules
    );

    let approval = calculate_approval(ballots, options);
    let approval_counts: Vec<VoteCount> = approval
        .counts
        .iter()
        .map(|(_, c)| VoteCount(*c))
        .collect();

    let mut option_ids: HashMap<&str, OptionId> = HashMap::new();
    for (idx, name) in options.iter().enumerate() {
        option_ids
            .entry(name.as_str())
            .or_insert(OptionId(idx as u32));
    }

    let mut votes: Vec<VoteInternal> = ballots
        .iter()
        .map(|b| VoteInternal {
            ranks: b
                .rankings
                .iter()
                .filter_map(|name| option_ids.get(name.as_str()).copied())
                .collect(),
            cursor: 0,
        })
        .collect();

    let total_votes = VoteCount(ballots.len() as u64);
    let threshold = get_threshold(total_votes);
    debug!(
        "run_tally: total votes: {:?} threshold: {:?}",
        total_votes, threshold
    );

    // The options that are still running, in the order defined by the input.
    let mut still_running: Vec<bool> = vec![true; options.len()];
    let mut cur_options: Vec<OptionId> = (0..options.len())
        .map(|idx| OptionId(idx as u32))
        .collect();
    let mut cur_stats: Vec<RoundStatistics> = Vec::new();
    let mut winner: Option<OptionId> = None;
    let mut finished = false;

    while !finished && cur_stats.len() < rules.max_rounds as usize {
        let round_id = (cur_stats.len() + 1) as RoundId;
        debug!(
            "Round id: {:?} cur_options: {:?}",
            round_id, cur_options
        );
        let round_stats = run_one_round(
            &mut votes,
            &cur_options,
            &mut still_running,
            &approval_counts,
            rules.tie_break_mode,
            threshold,
        );
        debug!("Round id: {:?} stats: {:?}", round_id, round_stats);

        match &round_stats.outcome {
            RoundOutcome::Winner(oid) => {
                winner = Some(*oid);
                finished = true;
            }
            RoundOutcome::UnbreakableTie => {
                finished = true;
            }
            RoundOutcome::Eliminated(eliminated, _) => {
                let before = cur_options.len();
                cur_options.retain(|oid| !eliminated.contains(oid));
                // Invariant: the number of options decreased.
                debug_assert!(cur_options.len() < before);
            }
        }
        cur_stats.push(round_stats);
    }

    let error = if finished {
        None
    } else {
        Some(TallyError::RoundLimitExceeded {
            max_rounds: rules.max_rounds,
        })
    };

    let round_stats: Vec<RoundStats> = cur_stats
        .iter()
        .enumerate()
        .map(|(idx, stats)| round_result_to_stat(stats, idx as RoundId + 1, options, &approval))
        .collect();
    let res = TallyResult {
        winner: winner.map(|oid| options[oid.idx()].clone()),
        total_votes: total_votes.0,
        threshold: threshold.0,
        options: options.to_vec(),
        round_stats,
        error,
    };
    info!(
        "Tally done after {} rounds: winner: {:?} error: {:?}",
        res.round_stats.len(),
        res.winner,
        res.error
    );
    res
}

fn get_threshold(total_count: VoteCount) -> VoteCount {
    VoteCount((total_count.0 / 2) + 1)
}

fn compute_tally(
    votes: &[VoteInternal],
    cur_options: &[OptionId],
    num_options: usize,
) -> Vec<(OptionId, VoteCount)> {
    let mut counts: Vec<VoteCount> = vec![VoteCount::EMPTY; num_options];
    for v in votes.iter() {
        if let Some(oid) = v.current() {
            counts[oid.idx()] += VoteCount(1);
        }
    }
    cur_options
        .iter()
        .map(|oid| (*oid, counts[oid.idx()]))
        .collect()
}

/// Runs one round: tally, majority check, then elimination and transfers.
fn run_one_round(
    votes: &mut [VoteInternal],
    cur_options: &[OptionId],
    still_running: &mut [bool],
    approval_counts: &[VoteCount],
    tie_break_mode: TieBreakMode,
    threshold: VoteCount,
) -> RoundStatistics {
    let tally = compute_tally(votes, cur_options, still_running.len());
    debug!("run_one_round: tally: {:?}", tally);

    // The first option in the input order wins if several cross the threshold.
    if let Some(&(oid, count)) = tally.iter().find(|(_, count)| *count >= threshold) {
        debug!(
            "run_one_round: {:?} has count {:?}, marking as winner",
            oid, count
        );
        return RoundStatistics {
            tally,
            outcome: RoundOutcome::Winner(oid),
        };
    }

    let eliminated = find_eliminated_options(&tally, approval_counts, tie_break_mode);
    debug!("run_one_round: eliminated options: {:?}", eliminated);
    if eliminated.len() == cur_options.len() {
        debug!("run_one_round: all the remaining options are tied");
        return RoundStatistics {
            tally,
            outcome: RoundOutcome::UnbreakableTie,
        };
    }

    for oid in eliminated.iter() {
        still_running[oid.idx()] = false;
    }

    // Statistics about transfers:
    // For every eliminated option, keep where its ballots went.
    let mut transfers: HashMap<OptionId, BTreeMap<Destination, VoteCount>> = HashMap::new();
    for v in votes.iter_mut() {
        let old_first = match v.current() {
            Some(oid) if !still_running[oid.idx()] => oid,
            _ => continue,
        };
        let dest = match v.advance(still_running) {
            Some(new_first) => Destination::Option(new_first),
            None => Destination::Exhausted,
        };
        let e = transfers
            .entry(old_first)
            .or_insert_with(BTreeMap::new)
            .entry(dest)
            .or_insert(VoteCount::EMPTY);
        *e += VoteCount(1);
    }

    let ordered_transfers: Vec<(OptionId, BTreeMap<Destination, VoteCount>)> = eliminated
        .iter()
        .filter_map(|oid| transfers.remove(oid).map(|t| (*oid, t)))
        .collect();

    RoundStatistics {
        tally,
        outcome: RoundOutcome::Eliminated(eliminated, ordered_transfers),
    }
}

// Returns the options to eliminate, in the input order.
fn find_eliminated_options(
    tally: &[(OptionId, VoteCount)],
    approval_counts: &[VoteCount],
    tie_break_mode: TieBreakMode,
) -> Vec<OptionId> {
    let min_count: VoteCount = match tally.iter().map(|(_, vc)| *vc).min() {
        Some(vc) => vc,
        None => return Vec::new(),
    };

    let all_smallest: Vec<OptionId> = tally
        .iter()
        .filter_map(|(oid, vc)| if *vc == min_count { Some(*oid) } else { None })
        .collect();
    debug!(
        "find_eliminated_options: all_smallest: {:?}",
        all_smallest
    );

    // No tiebreak, the logic below is not relevant.
    if all_smallest.len() == 1 || tally.len() == 1 {
        return all_smallest;
    }

    match tie_break_mode {
        TieBreakMode::EliminateAll => all_smallest,
        TieBreakMode::Approval => {
            // All the percentages share the same denominator, comparing the counts is enough.
            let approval_of = |oid: &OptionId| {
                approval_counts
                    .get(oid.idx())
                    .copied()
                    .unwrap_or(VoteCount::EMPTY)
            };
            let min_approval = all_smallest.iter().map(approval_of).min();
            let narrowed: Vec<OptionId> = all_smallest
                .iter()
                .filter(|oid| Some(approval_of(*oid)) == min_approval)
                .copied()
                .collect();
            if !narrowed.is_empty() && narrowed.len() < all_smallest.len() {
                debug!(
                    "find_eliminated_options: tie broken by approval: {:?}",
                    narrowed
                );
                narrowed
            } else {
                all_smallest
            }
        }
    }
}

fn round_result_to_stat(
    stats: &RoundStatistics,
    round_id: RoundId,
    options: &[String],
    approval: &ApprovalStats,
) -> RoundStats {
    let name = |oid: &OptionId| options[oid.idx()].clone();
    let mut rs = RoundStats {
        round: round_id,
        tally: stats
            .tally
            .iter()
            .map(|(oid, vc)| (name(oid), vc.0))
            .collect(),
        status: RoundStatus::Elimination,
        eliminated: Vec::new(),
        transfers: Vec::new(),
        approval: approval.clone(),
    };

    match &stats.outcome {
        RoundOutcome::Winner(_) => {
            rs.status = RoundStatus::WinnerFound;
        }
        RoundOutcome::UnbreakableTie => {
            rs.status = RoundStatus::UnbreakableTie;
        }
        RoundOutcome::Eliminated(eliminated, transfers) => {
            rs.eliminated = eliminated.iter().map(name).collect();
            rs.transfers = transfers
                .iter()
                .map(|(from, dests)| TransferStats {
                    from: name(from),
                    transfers: dests
                        .iter()
                        .map(|(dest, vc)| {
                            let target = match dest {
                                Destination::Option(oid) => TransferTarget::Option(name(oid)),
                                Destination::Exhausted => TransferTarget::Exhausted,
                            };
                            (target, vc.0)
                        })
                        .collect(),
                })
                .collect();
        }
    }
    rs
}
