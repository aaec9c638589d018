use crate::rcv::*;

use serde::{Deserialize, Serialize};

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "contestName")]
    pub contest_name: String,
    #[serde(rename = "contestDate")]
    pub contest_date: Option<String>,
    #[serde(rename = "contestJurisdiction")]
    pub contest_jurisdiction: Option<String>,
    #[serde(rename = "contestOffice")]
    pub contest_office: Option<String>,
}

/// The header of the summary.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub contest: String,
    pub date: Option<String>,
    pub jurisdiction: Option<String>,
    pub office: Option<String>,
    pub threshold: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct RcvRules {
    #[serde(rename = "tieBreaking")]
    pub tie_breaking: Option<String>,
    #[serde(rename = "maxRounds")]
    pub max_rounds: Option<u32>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct RcvConfig {
    #[serde(rename = "outputSettings")]
    pub output_settings: OutputSettings,
    pub options: Vec<String>,
    #[serde(rename = "ballotsFile")]
    pub ballots_file: Option<String>,
    #[serde(default)]
    pub rules: RcvRules,
}

pub fn read_config(path: &str) -> RcvResult<RcvConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    serde_json::from_str(&contents).context(ParsingJsonSnafu { path })
}

pub fn read_summary(path: &str) -> RcvResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })
}

/// Turns the rules of the configuration into the rules of the tally.
///
/// The values passed on the command line take precedence over the
/// configuration file.
pub fn validate_rules(
    rcv_rules: &RcvRules,
    tie_breaking_override: Option<&str>,
    max_rounds_override: Option<u32>,
    options: &[String],
) -> RcvResult<TallyRules> {
    let tie_breaking = tie_breaking_override
        .or(rcv_rules.tie_breaking.as_deref())
        .unwrap_or("eliminate_all");
    let tie_break_mode = match tie_breaking {
        "approval" => TieBreakMode::Approval,
        "eliminate_all" => TieBreakMode::EliminateAll,
        x => {
            warn!(
                "Unknown tie breaking mode {:?}, all the tied options will be eliminated",
                x
            );
            TieBreakMode::EliminateAll
        }
    };

    let mut rules = TallyRules::for_options(tie_break_mode, options);
    if let Some(max_rounds) = max_rounds_override.or(rcv_rules.max_rounds) {
        ensure!(max_rounds > 0, InvalidMaxRoundsSnafu { max_rounds });
        rules.max_rounds = max_rounds;
    }
    Ok(rules)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> Vec<String> {
        vec!["A".to_string(), "B".to_string(), "C".to_string()]
    }

    #[test]
    fn parses_config() {
        let js = r#"{
            "outputSettings": {"contestName": "Test"},
            "options": ["A", "B"],
            "ballotsFile": "ballots.json",
            "rules": {"tieBreaking": "approval", "maxRounds": 5}
        }"#;
        let config: RcvConfig = serde_json::from_str(js).unwrap();
        assert_eq!(config.output_settings.contest_name, "Test");
        assert_eq!(config.output_settings.contest_date, None);
        assert_eq!(config.ballots_file, Some("ballots.json".to_string()));
        assert_eq!(config.rules.tie_breaking, Some("approval".to_string()));
        assert_eq!(config.rules.max_rounds, Some(5));
    }

    #[test]
    fn rules_default_to_the_number_of_options() {
        let rules = validate_rules(&RcvRules::default(), None, None, &options()).unwrap();
        assert_eq!(rules.tie_break_mode, TieBreakMode::EliminateAll);
        assert_eq!(rules.max_rounds, 3);
    }

    #[test]
    fn overrides_take_precedence() {
        let rcv_rules = RcvRules {
            tie_breaking: Some("eliminate_all".to_string()),
            max_rounds: Some(7),
        };
        let rules = validate_rules(&rcv_rules, Some("approval"), Some(2), &options()).unwrap();
        assert_eq!(rules.tie_break_mode, TieBreakMode::Approval);
        assert_eq!(rules.max_rounds, 2);
    }

    #[test]
    fn unknown_tie_breaking_eliminates_all() {
        let rcv_rules = RcvRules {
            tie_breaking: Some("coin_flip".to_string()),
            max_rounds: None,
        };
        let rules = validate_rules(&rcv_rules, None, None, &options()).unwrap();
        assert_eq!(rules.tie_break_mode, TieBreakMode::EliminateAll);
    }

    #[test]
    fn rejects_zero_rounds() {
        let rcv_rules = RcvRules {
            tie_breaking: None,
            max_rounds: Some(0),
        };
        assert!(matches!(
            validate_rules(&rcv_rules, None, None, &options()),
            Err(RcvError::InvalidMaxRounds { max_rounds: 0 })
        ));
    }
}
