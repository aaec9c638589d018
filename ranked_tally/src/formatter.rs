use log::{debug, info, warn};
use serde_json::Value as JSValue;

use crate::config::{Ballot, ValidationError};
use crate::validation::{OptionSet, RawBallot};

/// A raw vote that was dropped by the formatter.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SkippedBallot {
    /// The position of the record in the input.
    pub index: usize,
    pub reason: ValidationError,
}

#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct FormattedBallots {
    pub ballots: Vec<Ballot>,
    pub skipped: Vec<SkippedBallot>,
}

/// Turns raw vote records into clean ballots.
///
/// Records that cannot be used are dropped and reported in `skipped`. They
/// never stop the processing of the other records. The ballots are returned
/// in the same order as the records.
pub fn format_ballots(raw_votes: &[JSValue], options: &[String]) -> FormattedBallots {
    let mut res = FormattedBallots::default();
    let option_set = OptionSet::new(options);
    if let Err(e) = &option_set {
        warn!(
            "format_ballots: cannot check {} votes against the options: {}",
            raw_votes.len(),
            e
        );
    }

    for (index, raw) in raw_votes.iter().enumerate() {
        let checked = RawBallot::parse(raw).and_then(|rb| match &option_set {
            Ok(os) => rb.check(os),
            Err(e) => Err(e.clone()),
        });
        match checked {
            Ok((rankings, approvals)) => res.ballots.push(Ballot {
                rankings,
                approvals,
            }),
            Err(reason) => {
                match &reason {
                    ValidationError::MalformedBallot { .. } => {
                        debug!("format_ballots: skipping record {}: {}", index, reason);
                    }
                    ValidationError::MalformedConfig { .. } => {}
                    _ => {
                        warn!("format_ballots: invalid ballot {}: {}", index, reason);
                    }
                }
                res.skipped.push(SkippedBallot { index, reason });
            }
        }
    }
    info!(
        "format_ballots: {} ballots accepted, {} skipped",
        res.ballots.len(),
        res.skipped.len()
    );
    res
}
