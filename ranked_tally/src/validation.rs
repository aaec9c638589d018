use std::collections::HashSet;

use serde_json::Value as JSValue;

use crate::config::ValidationError;

/// The registered options of an election, checked once for consistency.
#[derive(Eq, PartialEq, Debug, Clone)]
pub(crate) struct OptionSet {
    lookup: HashSet<String>,
}

impl OptionSet {
    pub(crate) fn new(options: &[String]) -> Result<OptionSet, ValidationError> {
        let mut lookup: HashSet<String> = HashSet::new();
        for name in options.iter() {
            if name.is_empty() {
                return Err(ValidationError::MalformedConfig {
                    detail: "empty option name".to_string(),
                });
            }
            if !lookup.insert(name.clone()) {
                return Err(ValidationError::MalformedConfig {
                    detail: format!("option {} is registered more than once", name),
                });
            }
        }
        Ok(OptionSet { lookup })
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        self.lookup.contains(name)
    }
}

/// Checks that a list of options can be used for an election: no empty
/// names and no name registered twice. An empty list is accepted.
pub fn check_options(options: &[String]) -> Result<(), ValidationError> {
    OptionSet::new(options).map(|_| ())
}

/// Checks a raw ballot against the list of options of the election.
///
/// The ballot is expected to be a JSON object with a `rankings` list of
/// option names and an optional `approvals` list. When a ballot has several
/// problems, only the first one is reported: the shape of the ballot, then
/// the list of options, then the rankings in order, then the approvals.
///
/// ```
/// use ranked_tally::validate_ballot;
/// use serde_json::json;
///
/// let options = vec!["Anna".to_string(), "Bob".to_string()];
/// assert!(validate_ballot(&json!({"rankings": ["Bob", "Anna"]}), &options).is_ok());
/// assert!(validate_ballot(&json!({"rankings": ["Clara"]}), &options).is_err());
/// ```
pub fn validate_ballot(ballot: &JSValue, options: &[String]) -> Result<(), ValidationError> {
    let raw = RawBallot::parse(ballot)?;
    let option_set = OptionSet::new(options)?;
    raw.check(&option_set).map(|_| ())
}

/// Checks ballot contents that are already textual.
pub fn validate_choices(
    rankings: &[String],
    approvals: &[String],
    options: &[String],
) -> Result<(), ValidationError> {
    let option_set = OptionSet::new(options)?;
    let rankings: Vec<&str> = rankings.iter().map(|s| s.as_str()).collect();
    let approvals: Vec<&str> = approvals.iter().map(|s| s.as_str()).collect();
    check_rankings(&rankings, &option_set)?;
    check_approvals(&approvals, &option_set)
}

/// A raw vote record that has the shape of a ballot. Its entries are not
/// checked yet.
pub(crate) struct RawBallot<'a> {
    rankings: &'a [JSValue],
    approvals: Option<&'a JSValue>,
}

impl<'a> RawBallot<'a> {
    pub(crate) fn parse(ballot: &'a JSValue) -> Result<RawBallot<'a>, ValidationError> {
        let obj = ballot
            .as_object()
            .ok_or_else(|| ValidationError::MalformedBallot {
                detail: "not a record".to_string(),
            })?;
        let rankings = match obj.get("rankings") {
            Some(JSValue::Array(l)) => l.as_slice(),
            Some(_) => {
                return Err(ValidationError::MalformedBallot {
                    detail: "rankings is not a list".to_string(),
                })
            }
            None => {
                return Err(ValidationError::MalformedBallot {
                    detail: "missing rankings".to_string(),
                })
            }
        };
        Ok(RawBallot {
            rankings,
            approvals: obj.get("approvals"),
        })
    }

    /// Validates the entries and returns the rankings and the approvals.
    pub(crate) fn check(
        &self,
        options: &OptionSet,
    ) -> Result<(Vec<String>, Vec<String>), ValidationError> {
        let rankings = known_names(
            self.rankings,
            options,
            |position, value| ValidationError::NonStringChoice { position, value },
            |option| ValidationError::UnknownOption { option },
        )?;
        if let Some(dup) = first_duplicate(&rankings) {
            return Err(ValidationError::DuplicateRanking {
                option: dup.to_string(),
            });
        }

        // A null field is treated the same way as a missing one.
        let approvals: Vec<&str> = match self.approvals {
            None | Some(JSValue::Null) => Vec::new(),
            Some(JSValue::Array(l)) => known_names(
                l,
                options,
                |position, value| ValidationError::NonStringApproval { position, value },
                |option| ValidationError::UnknownApproval { option },
            )?,
            Some(_) => return Err(ValidationError::MalformedApprovals {}),
        };
        if let Some(dup) = first_duplicate(&approvals) {
            return Err(ValidationError::DuplicateApproval {
                option: dup.to_string(),
            });
        }

        Ok((
            rankings.iter().map(|s| s.to_string()).collect(),
            approvals.iter().map(|s| s.to_string()).collect(),
        ))
    }
}

/// Reads the entries in order. The first one that is not a string or not a
/// registered option is reported.
fn known_names<'a>(
    entries: &'a [JSValue],
    options: &OptionSet,
    non_string: fn(usize, String) -> ValidationError,
    unknown: fn(String) -> ValidationError,
) -> Result<Vec<&'a str>, ValidationError> {
    let mut res: Vec<&str> = Vec::new();
    for (position, elt) in entries.iter().enumerate() {
        let name = elt
            .as_str()
            .ok_or_else(|| non_string(position, elt.to_string()))?;
        if !options.contains(name) {
            return Err(unknown(name.to_string()));
        }
        res.push(name);
    }
    Ok(res)
}

fn check_rankings(rankings: &[&str], options: &OptionSet) -> Result<(), ValidationError> {
    if let Some(unknown) = rankings.iter().find(|s| !options.contains(s)) {
        return Err(ValidationError::UnknownOption {
            option: unknown.to_string(),
        });
    }
    if let Some(dup) = first_duplicate(rankings) {
        return Err(ValidationError::DuplicateRanking {
            option: dup.to_string(),
        });
    }
    Ok(())
}

fn check_approvals(approvals: &[&str], options: &OptionSet) -> Result<(), ValidationError> {
    if let Some(unknown) = approvals.iter().find(|s| !options.contains(s)) {
        return Err(ValidationError::UnknownApproval {
            option: unknown.to_string(),
        });
    }
    if let Some(dup) = first_duplicate(approvals) {
        return Err(ValidationError::DuplicateApproval {
            option: dup.to_string(),
        });
    }
    Ok(())
}

fn first_duplicate<'a>(names: &[&'a str]) -> Option<&'a str> {
    let mut seen: HashSet<&str> = HashSet::new();
    names.iter().copied().find(|s| !seen.insert(*s))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn options() -> Vec<String> {
        vec!["A".to_string(), "B".to_string(), "C".to_string()]
    }

    #[test]
    fn accepts_valid_ballots() {
        let opts = options();
        assert_eq!(validate_ballot(&json!({"rankings": ["A", "C"]}), &opts), Ok(()));
        assert_eq!(
            validate_ballot(&json!({"rankings": [], "approvals": ["B"]}), &opts),
            Ok(())
        );
        assert_eq!(
            validate_ballot(&json!({"rankings": ["B"], "approvals": null}), &opts),
            Ok(())
        );
    }

    #[test]
    fn rejects_malformed_ballots() {
        let opts = options();
        assert!(matches!(
            validate_ballot(&json!(["A", "B"]), &opts),
            Err(ValidationError::MalformedBallot { .. })
        ));
        assert!(matches!(
            validate_ballot(&json!({"approvals": ["A"]}), &opts),
            Err(ValidationError::MalformedBallot { .. })
        ));
        assert!(matches!(
            validate_ballot(&json!({"rankings": "A"}), &opts),
            Err(ValidationError::MalformedBallot { .. })
        ));
    }

    #[test]
    fn rejects_malformed_options() {
        let ballot = json!({"rankings": ["A"]});
        assert!(matches!(
            validate_ballot(&ballot, &["A".to_string(), "A".to_string()]),
            Err(ValidationError::MalformedConfig { .. })
        ));
        assert!(matches!(
            validate_ballot(&ballot, &["A".to_string(), "".to_string()]),
            Err(ValidationError::MalformedConfig { .. })
        ));
    }

    #[test]
    fn checks_shape_before_options() {
        let dup_options = ["A".to_string(), "A".to_string()];
        assert!(matches!(
            validate_ballot(&json!(5), &dup_options),
            Err(ValidationError::MalformedBallot { .. })
        ));
        assert!(matches!(
            validate_ballot(&json!({"rankings": {"A": 1}}), &dup_options),
            Err(ValidationError::MalformedBallot { .. })
        ));
    }

    #[test]
    fn option_lists() {
        assert_eq!(check_options(&options()), Ok(()));
        assert_eq!(check_options(&[]), Ok(()));
        assert!(matches!(
            check_options(&["B".to_string(), "A".to_string(), "B".to_string()]),
            Err(ValidationError::MalformedConfig { .. })
        ));
        assert!(matches!(
            check_options(&["".to_string()]),
            Err(ValidationError::MalformedConfig { .. })
        ));
    }

    #[test]
    fn entries_checked_in_ranking_order() {
        let opts = options();
        assert_eq!(
            validate_ballot(&json!({"rankings": ["Z", 3]}), &opts),
            Err(ValidationError::UnknownOption {
                option: "Z".to_string()
            })
        );
        assert_eq!(
            validate_ballot(&json!({"rankings": [3, "Z"]}), &opts),
            Err(ValidationError::NonStringChoice {
                position: 0,
                value: "3".to_string()
            })
        );
        assert_eq!(
            validate_ballot(&json!({"rankings": ["A"], "approvals": ["D", 5]}), &opts),
            Err(ValidationError::UnknownApproval {
                option: "D".to_string()
            })
        );
        assert_eq!(
            validate_ballot(&json!({"rankings": ["A"], "approvals": [5, "D"]}), &opts),
            Err(ValidationError::NonStringApproval {
                position: 0,
                value: "5".to_string()
            })
        );
        // Duplicates only come after every entry has been read.
        assert_eq!(
            validate_ballot(&json!({"rankings": ["A", "A", null]}), &opts),
            Err(ValidationError::NonStringChoice {
                position: 2,
                value: "null".to_string()
            })
        );
    }

    #[test]
    fn reports_first_ranking_problem() {
        let opts = options();
        assert_eq!(
            validate_ballot(&json!({"rankings": ["A", 3, "Z"]}), &opts),
            Err(ValidationError::NonStringChoice {
                position: 1,
                value: "3".to_string()
            })
        );
        // Unknown options are reported before duplicates, even later in the ranking.
        assert_eq!(
            validate_ballot(&json!({"rankings": ["A", "A", "Z"]}), &opts),
            Err(ValidationError::UnknownOption {
                option: "Z".to_string()
            })
        );
        assert_eq!(
            validate_ballot(&json!({"rankings": ["B", "A", "B"]}), &opts),
            Err(ValidationError::DuplicateRanking {
                option: "B".to_string()
            })
        );
    }

    #[test]
    fn checks_approvals_independently() {
        let opts = options();
        assert_eq!(
            validate_ballot(&json!({"rankings": ["A"], "approvals": "A"}), &opts),
            Err(ValidationError::MalformedApprovals {})
        );
        assert_eq!(
            validate_ballot(&json!({"rankings": ["A"], "approvals": [true]}), &opts),
            Err(ValidationError::NonStringApproval {
                position: 0,
                value: "true".to_string()
            })
        );
        assert_eq!(
            validate_ballot(&json!({"rankings": ["A"], "approvals": ["D"]}), &opts),
            Err(ValidationError::UnknownApproval {
                option: "D".to_string()
            })
        );
        // The same option may be both ranked and approved, but not approved twice.
        assert_eq!(
            validate_ballot(&json!({"rankings": ["A"], "approvals": ["A", "A"]}), &opts),
            Err(ValidationError::DuplicateApproval {
                option: "A".to_string()
            })
        );
    }

    #[test]
    fn typed_choices() {
        let opts = options();
        assert_eq!(
            validate_choices(&["C".to_string(), "B".to_string()], &[], &opts),
            Ok(())
        );
        assert_eq!(
            validate_choices(&["C".to_string(), "C".to_string()], &[], &opts),
            Err(ValidationError::DuplicateRanking {
                option: "C".to_string()
            })
        );
    }
}
