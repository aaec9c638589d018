pub mod config_reader;
mod io_common;
mod io_json;

use log::{debug, info, warn};

use ranked_tally::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::rcv::config_reader::*;
use crate::rcv::io_common::{infer_options, simplify_file_name};
use crate::rcv::io_json::read_json_ballots;

#[derive(Debug, Snafu)]
pub enum RcvError {
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON file {path}"))]
    ParsingJson {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Error serializing the summary"))]
    SerializingJson { source: serde_json::Error },
    #[snafu(display("Error writing the summary to {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("The file {path} does not contain a list of ballots"))]
    NotABallotList { path: String },
    #[snafu(display("No ballots: use --input or set ballotsFile in the configuration"))]
    MissingBallots {},
    #[snafu(display("Invalid list of options"))]
    InvalidOptions { source: ValidationError },
    #[snafu(display("maxRounds must be a positive number, got {max_rounds}"))]
    InvalidMaxRounds { max_rounds: u32 },
    #[snafu(display("Difference detected between calculated summary and reference summary {path}"))]
    ReferenceMismatch { path: String },
}

pub type RcvResult<T> = Result<T, RcvError>;

fn result_stats_to_json(rs: &TallyResult) -> Vec<JSValue> {
    let mut l: Vec<JSValue> = Vec::new();
    for round_stat in rs.round_stats.iter() {
        let mut tally: JSMap<String, JSValue> = JSMap::new();
        for (name, count) in round_stat.tally.iter() {
            tally.insert(name.clone(), json!(count.to_string()));
        }

        let mut transfers: JSMap<String, JSValue> = JSMap::new();
        for ts in round_stat.transfers.iter() {
            let mut dests: JSMap<String, JSValue> = JSMap::new();
            for (target, count) in ts.transfers.iter() {
                dests.insert(target.to_string(), json!(count.to_string()));
            }
            transfers.insert(ts.from.clone(), JSValue::Object(dests));
        }

        let mut ratings: JSMap<String, JSValue> = JSMap::new();
        for (name, count) in round_stat.approval.counts.iter() {
            ratings.insert(name.clone(), json!(count));
        }
        let mut percentages: JSMap<String, JSValue> = JSMap::new();
        for (name, pct) in round_stat.approval.percentages.iter() {
            percentages.insert(name.clone(), json!(pct));
        }

        let js = json!({
            "round": round_stat.round,
            "status": round_stat.status.label(),
            "tally": tally,
            "eliminated": round_stat.eliminated,
            "transfers": transfers,
            "approvalRatings": ratings,
            "approvalPercentages": percentages,
        });
        l.push(js);
    }
    l
}

fn skipped_to_json(skipped: &[SkippedBallot]) -> Vec<JSValue> {
    skipped
        .iter()
        .map(|s| json!({"index": s.index, "reason": s.reason.to_string()}))
        .collect()
}

fn build_summary_js(
    settings: &OutputSettings,
    skipped: &[SkippedBallot],
    rv: &TallyResult,
) -> JSValue {
    let c = OutputConfig {
        contest: settings.contest_name.clone(),
        date: settings.contest_date.clone(),
        jurisdiction: settings.contest_jurisdiction.clone(),
        office: settings.contest_office.clone(),
        threshold: Some(rv.threshold.to_string()),
    };
    let mut js = json!({
        "config": c,
        "winner": rv.winner,
        "totalVotes": rv.total_votes,
        "options": rv.options,
        "results": result_stats_to_json(rv),
        "skippedBallots": skipped_to_json(skipped),
    });
    if let Some(e) = &rv.error {
        js["error"] = json!(e.to_string());
    }
    js
}

fn log_result(rv: &TallyResult) {
    for rs in rv.round_stats.iter() {
        info!(
            "Round {} (winning threshold: {}): {}",
            rs.round,
            rv.threshold,
            rs.status.label()
        );
        for (name, count) in rs.tally.iter() {
            let mut line = format!("{:>7} {}", count, name);
            if rs.status == RoundStatus::WinnerFound && rv.winner.as_ref() == Some(name) {
                line.push_str(" -> elected");
            }
            if let Some(ts) = rs.transfers.iter().find(|ts| ts.from == *name) {
                let moves: Vec<String> = ts
                    .transfers
                    .iter()
                    .map(|(target, c)| format!("{} {}", c, target))
                    .collect();
                line.push_str(&format!(" -> eliminated: {}", moves.join(", ")));
            } else if rs.eliminated.contains(name) {
                line.push_str(" -> eliminated");
            }
            info!("{}", line);
        }
    }
    if let Some(e) = &rv.error {
        warn!("The election did not conclude: {}", e);
    }
}

fn ballots_path(args: &Args, config: &Option<RcvConfig>) -> RcvResult<String> {
    match (&args.input, config) {
        (Some(p), _) => Ok(p.clone()),
        (None, Some(c)) => {
            let ballots_file = c.ballots_file.clone().context(MissingBallotsSnafu {})?;
            let root_p: PathBuf = args
                .config
                .as_deref()
                .and_then(|p| Path::new(p).parent())
                .map(|p| p.to_path_buf())
                .unwrap_or_default();
            Ok(root_p.join(ballots_file).display().to_string())
        }
        (None, None) => MissingBallotsSnafu {}.fail(),
    }
}

pub fn run_election(args: &Args) -> RcvResult<()> {
    let config: Option<RcvConfig> = match &args.config {
        Some(p) => Some(read_config(p)?),
        None => None,
    };
    info!("config: {:?}", config);

    let ballots_p = ballots_path(args, &config)?;
    let raw_votes = read_json_ballots(&ballots_p)?;

    let options: Vec<String> = match &config {
        Some(c) => c.options.clone(),
        None => infer_options(&raw_votes),
    };
    check_options(&options).context(InvalidOptionsSnafu {})?;
    debug!("options: {:?}", options);

    let default_rules = RcvRules::default();
    let rcv_rules = config.as_ref().map(|c| &c.rules).unwrap_or(&default_rules);
    let rules = validate_rules(
        rcv_rules,
        args.tie_breaking.as_deref(),
        args.max_rounds,
        &options,
    )?;

    let formatted = format_ballots(&raw_votes, &options);
    let result = run_tally(&formatted.ballots, &options, &rules);
    log_result(&result);

    let output_settings = match config {
        Some(c) => c.output_settings,
        None => OutputSettings {
            contest_name: simplify_file_name(&ballots_p),
            contest_date: None,
            contest_jurisdiction: None,
            contest_office: None,
        },
    };

    // Assemble the final json
    let result_js = build_summary_js(&output_settings, &formatted.skipped, &result);
    let pretty_js_stats = serde_json::to_string_pretty(&result_js).context(SerializingJsonSnafu {})?;
    match args.out.as_deref() {
        None | Some("stdout") => println!("{}", pretty_js_stats),
        Some(out_p) => {
            fs::write(out_p, &pretty_js_stats).context(WritingOutputSnafu { path: out_p })?;
            info!("Summary written to {:?}", out_p);
        }
    }

    // The reference summary, if provided for comparison
    if let Some(summary_p) = &args.reference {
        // Maps are compared as maps: the key order of the reference file does not matter.
        let summary_ref = read_summary(summary_p)?;
        if summary_ref != result_js {
            let pretty_js_summary_ref =
                serde_json::to_string_pretty(&summary_ref).context(SerializingJsonSnafu {})?;
            warn!("Found differences with the reference string");
            print_diff(
                pretty_js_summary_ref.as_str(),
                pretty_js_stats.as_ref(),
                "\n",
            );
            return ReferenceMismatchSnafu { path: summary_p }.fail();
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_dir() -> String {
        format!("{}/testdata", env!("CARGO_MANIFEST_DIR"))
    }

    fn run_election_test(test_name: &str, config_lpath: &str, summary_lpath: &str) -> RcvResult<()> {
        let _ = env_logger::try_init();
        info!("Running test {}", test_name);
        let args = Args {
            config: Some(format!("{}/{}/{}", test_dir(), test_name, config_lpath)),
            reference: Some(format!("{}/{}/{}", test_dir(), test_name, summary_lpath)),
            ..Default::default()
        };
        run_election(&args)
    }

    fn test_wrapper(test_name: &str) {
        let res = run_election_test(
            test_name,
            format!("{}_config.json", test_name).as_str(),
            format!("{}_expected_summary.json", test_name).as_str(),
        );
        assert!(res.is_ok(), "{:?}", res);
    }

    #[test]
    fn three_way() {
        test_wrapper("three_way");
    }

    #[test]
    fn approval_tie() {
        test_wrapper("approval_tie");
    }

    #[test]
    fn round_limit() {
        test_wrapper("round_limit");
    }

    #[test]
    fn options_inferred_from_ballots() {
        let args = Args {
            input: Some(format!("{}/approval_tie/approval_tie_ballots.json", test_dir())),
            reference: Some(format!(
                "{}/approval_tie/approval_tie_inferred_summary.json",
                test_dir()
            )),
            tie_breaking: Some("approval".to_string()),
            ..Default::default()
        };
        let res = run_election(&args);
        assert!(res.is_ok(), "{:?}", res);
    }

    #[test]
    fn detects_differences_with_reference() {
        let res = run_election_test(
            "three_way",
            "three_way_config.json",
            "../approval_tie/approval_tie_expected_summary.json",
        );
        assert!(matches!(res, Err(RcvError::ReferenceMismatch { .. })));
    }

    #[test]
    fn writes_summary() {
        let out_p = std::env::temp_dir().join("rcvtally_three_way_summary.json");
        let args = Args {
            config: Some(format!("{}/three_way/three_way_config.json", test_dir())),
            out: Some(out_p.display().to_string()),
            ..Default::default()
        };
        run_election(&args).unwrap();
        let written = read_summary(&out_p.display().to_string()).unwrap();
        assert_eq!(written["winner"], json!("B"));
        assert_eq!(written["skippedBallots"].as_array().map(|l| l.len()), Some(2));
    }

    #[test]
    fn summary_keeps_option_order() {
        let options: Vec<String> = ["C", "A", "B"].iter().map(|s| s.to_string()).collect();
        let ballots = vec![
            Ballot::new(&["C".to_string()], &["B".to_string()]),
            Ballot::new(&["A".to_string()], &[]),
            Ballot::new(&["B".to_string(), "A".to_string()], &[]),
            Ballot::new(&["B".to_string(), "C".to_string()], &[]),
            Ballot::new(&["A".to_string()], &[]),
            Ballot::new(&["C".to_string()], &[]),
            Ballot::new(&["A".to_string()], &[]),
        ];
        let result = run_tally(&ballots, &options, &TallyRules::DEFAULT_RULES);
        let rounds = result_stats_to_json(&result);
        let keys = |js: &JSValue| -> Vec<String> {
            js.as_object()
                .map(|m| m.keys().cloned().collect())
                .unwrap_or_default()
        };
        assert_eq!(keys(&rounds[0]["tally"]), options);
        assert_eq!(keys(&rounds[0]["approvalRatings"]), options);
        assert_eq!(keys(&rounds[0]["approvalPercentages"]), options);
        assert_eq!(keys(&rounds[0]["transfers"]), vec!["C", "B"]);
        assert_eq!(keys(&rounds[0]["transfers"]["B"]), vec!["A", "exhausted"]);
    }

    #[test]
    fn missing_ballots() {
        let res = run_election(&Args::default());
        assert!(matches!(res, Err(RcvError::MissingBallots {})));
    }

    #[test]
    fn rejects_duplicated_options() {
        let args = Args {
            config: Some(format!("{}/bad_options/bad_options_config.json", test_dir())),
            ..Default::default()
        };
        let res = run_election(&args);
        assert!(matches!(res, Err(RcvError::InvalidOptions { .. })));
    }
}
