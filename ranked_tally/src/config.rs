// ********* Input data structures ***********

use serde_json::{json, Value as JSValue};
use snafu::Snafu;

/// A clean ballot, as produced by the formatter.
///
/// The rankings are ordered from the most preferred option to the least
/// preferred one. The approvals are the options that the voter separately
/// endorses. They play no role in the transfer of votes and are only used
/// to break ties between options that should be eliminated.
#[derive(Eq, PartialEq, Debug, Clone, Hash, Default)]
pub struct Ballot {
    pub rankings: Vec<String>,
    pub approvals: Vec<String>,
}

impl Ballot {
    pub fn new(rankings: &[String], approvals: &[String]) -> Ballot {
        Ballot {
            rankings: rankings.to_vec(),
            approvals: approvals.to_vec(),
        }
    }

    /// The raw representation of this ballot, as accepted by the formatter.
    pub fn to_json(&self) -> JSValue {
        json!({
            "rankings": self.rankings,
            "approvals": self.approvals,
        })
    }
}

// ******** Output data structures *********

/// Where the votes of an eliminated option went.
#[derive(Eq, PartialEq, Debug, Clone, Hash, PartialOrd, Ord)]
pub enum TransferTarget {
    Option(String),
    Exhausted,
}

impl std::fmt::Display for TransferTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransferTarget::Option(name) => write!(f, "{}", name),
            TransferTarget::Exhausted => write!(f, "exhausted"),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct TransferStats {
    pub from: String,
    pub transfers: Vec<(TransferTarget, u64)>,
}

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum RoundStatus {
    WinnerFound,
    Elimination,
    UnbreakableTie,
}

impl RoundStatus {
    pub fn label(&self) -> &'static str {
        match self {
            RoundStatus::WinnerFound => "Winner found",
            RoundStatus::Elimination => "Elimination",
            RoundStatus::UnbreakableTie => "Unbreakable tie",
        }
    }
}

/// Approval figures, in the order of the options of the election.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct ApprovalStats {
    pub counts: Vec<(String, u64)>,
    pub percentages: Vec<(String, f64)>,
}

impl ApprovalStats {
    pub fn count_of(&self, option: &str) -> u64 {
        self.counts
            .iter()
            .find(|(name, _)| name == option)
            .map(|(_, c)| *c)
            .unwrap_or(0)
    }

    pub fn percentage_of(&self, option: &str) -> f64 {
        self.percentages
            .iter()
            .find(|(name, _)| name == option)
            .map(|(_, p)| *p)
            .unwrap_or(0.0)
    }
}

/// Statistics for one round
#[derive(PartialEq, Debug, Clone)]
pub struct RoundStats {
    pub round: u32,
    pub tally: Vec<(String, u64)>,
    pub status: RoundStatus,
    pub eliminated: Vec<String>,
    pub transfers: Vec<TransferStats>,
    pub approval: ApprovalStats,
}

#[derive(PartialEq, Debug, Clone)]
pub struct TallyResult {
    pub winner: Option<String>,
    pub total_votes: u64,
    pub threshold: u64,
    pub options: Vec<String>,
    pub round_stats: Vec<RoundStats>,
    /// Only set when the election did not conclude within the allowed rounds.
    pub error: Option<TallyError>,
}

/// Terminal states of an election that are not a winner or a tie.
#[derive(Eq, PartialEq, Debug, Clone, Snafu)]
pub enum TallyError {
    #[snafu(display("no result after the maximum of {max_rounds} rounds"))]
    RoundLimitExceeded { max_rounds: u32 },
}

/// Reasons for rejecting a ballot.
#[derive(Eq, PartialEq, Debug, Clone, Snafu)]
pub enum ValidationError {
    #[snafu(display("malformed ballot: {detail}"))]
    MalformedBallot { detail: String },
    #[snafu(display("malformed option list: {detail}"))]
    MalformedConfig { detail: String },
    #[snafu(display("ranking at position {position} is not a string: {value}"))]
    NonStringChoice { position: usize, value: String },
    #[snafu(display("unknown option in rankings: {option}"))]
    UnknownOption { option: String },
    #[snafu(display("option ranked more than once: {option}"))]
    DuplicateRanking { option: String },
    #[snafu(display("approvals must be a list"))]
    MalformedApprovals {},
    #[snafu(display("approval at position {position} is not a string: {value}"))]
    NonStringApproval { position: usize, value: String },
    #[snafu(display("unknown option in approvals: {option}"))]
    UnknownApproval { option: String },
    #[snafu(display("option approved more than once: {option}"))]
    DuplicateApproval { option: String },
}

// ********* Configuration **********

/// How to resolve a tie between the options with the fewest votes.
///
/// - EliminateAll removes every tied option in the same round.
///
/// - Approval only removes the tied options with the lowest approval
/// rating. If they all share the same rating, the whole group is removed.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum TieBreakMode {
    EliminateAll,
    Approval,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct TallyRules {
    pub tie_break_mode: TieBreakMode,
    /// Safety bound on the number of rounds. An election with n options never
    /// needs more than n rounds.
    pub max_rounds: u32,
}

impl TallyRules {
    pub const DEFAULT_RULES: TallyRules = TallyRules {
        tie_break_mode: TieBreakMode::EliminateAll,
        max_rounds: 100,
    };

    /// Rules that allow exactly as many rounds as the election can need.
    pub fn for_options(tie_break_mode: TieBreakMode, options: &[String]) -> TallyRules {
        TallyRules {
            tie_break_mode,
            max_rounds: options.len().max(1) as u32,
        }
    }
}
