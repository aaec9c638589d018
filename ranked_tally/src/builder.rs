use serde_json::Value as JSValue;

pub use crate::config::*;
use crate::run_tally;
use crate::validation::{check_options, validate_choices, OptionSet, RawBallot};

/// A builder for adding ballots one at a time.
///
/// Every ballot is checked when it is added, so the tally only ever sees
/// clean ballots.
///
/// ```
/// pub use ranked_tally::builder::Builder;
/// pub use ranked_tally::TallyRules;
/// # use ranked_tally::ValidationError;
///
/// let mut builder = Builder::new(&TallyRules::DEFAULT_RULES)?
///     .options(&["Anna".to_string(), "Bob".to_string()])?;
///
/// builder.add_ballot(&["Bob".to_string(), "Anna".to_string()], &["Anna".to_string()])?;
/// assert!(builder.add_ballot(&["Clara".to_string()], &[]).is_err());
///
/// let result = builder.tally();
/// assert_eq!(result.winner, Some("Bob".to_string()));
///
/// # Ok::<(), ValidationError>(())
/// ```
pub struct Builder {
    pub(crate) _rules: TallyRules,
    pub(crate) _options: Vec<String>,
    pub(crate) _ballots: Vec<Ballot>,
}

impl Builder {
    pub fn new(rules: &TallyRules) -> Result<Builder, ValidationError> {
        Ok(Builder {
            _rules: rules.clone(),
            _options: Vec::new(),
            _ballots: Vec::new(),
        })
    }

    /// Sets the options of the election. The ballots added so far are dropped.
    pub fn options(self, opts: &[String]) -> Result<Builder, ValidationError> {
        check_options(opts)?;
        Ok(Builder {
            _rules: self._rules,
            _options: opts.to_vec(),
            _ballots: Vec::new(),
        })
    }

    /// Adds a ballot from its rankings and approvals.
    pub fn add_ballot(
        &mut self,
        rankings: &[String],
        approvals: &[String],
    ) -> Result<(), ValidationError> {
        validate_choices(rankings, approvals, &self._options)?;
        self._ballots.push(Ballot::new(rankings, approvals));
        Ok(())
    }

    /// Adds a ballot in its raw form, as found in a ballot file.
    pub fn add_raw_vote(&mut self, vote: &JSValue) -> Result<(), ValidationError> {
        let raw = RawBallot::parse(vote)?;
        let (rankings, approvals) = raw.check(&OptionSet::new(&self._options)?)?;
        self._ballots.push(Ballot {
            rankings,
            approvals,
        });
        Ok(())
    }

    pub fn ballots(&self) -> &[Ballot] {
        &self._ballots
    }

    /// Runs the tally over all the ballots added so far.
    pub fn tally(&self) -> TallyResult {
        run_tally(&self._ballots, &self._options, &self._rules)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn names(l: &[&str]) -> Vec<String> {
        l.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn rejects_duplicated_options() {
        let res = Builder::new(&TallyRules::DEFAULT_RULES)
            .and_then(|b| b.options(&names(&["A", "B", "A"])));
        assert!(matches!(res, Err(ValidationError::MalformedConfig { .. })));
    }

    #[test]
    fn raw_and_typed_ballots() {
        let mut builder = Builder::new(&TallyRules {
            tie_break_mode: TieBreakMode::Approval,
            max_rounds: 3,
        })
        .and_then(|b| b.options(&names(&["A", "B", "C"])))
        .unwrap();
        builder.add_ballot(&names(&["A", "B"]), &[]).unwrap();
        builder
            .add_raw_vote(&json!({"rankings": ["B"], "approvals": ["B", "C"]}))
            .unwrap();
        assert_eq!(
            builder.add_raw_vote(&json!({"rankings": ["B", "B"]})),
            Err(ValidationError::DuplicateRanking {
                option: "B".to_string()
            })
        );
        assert_eq!(
            builder.add_ballot(&[], &names(&["D"])),
            Err(ValidationError::UnknownApproval {
                option: "D".to_string()
            })
        );
        builder.add_ballot(&names(&["C", "A"]), &[]).unwrap();
        assert_eq!(builder.ballots().len(), 3);

        // A, B and C are tied in the first round, A is the only one without approvals.
        let res = builder.tally();
        assert_eq!(res.total_votes, 3);
        assert_eq!(res.round_stats[0].eliminated, names(&["A"]));
        assert_eq!(res.winner, Some("B".to_string()));
    }
}
