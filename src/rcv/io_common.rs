use std::path::Path;

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

/// Lists the options found in raw votes, in order of first appearance.
///
/// Rankings are looked at before approvals. Entries that are not strings are
/// left for the formatter to report.
pub fn infer_options(raw_votes: &[serde_json::Value]) -> Vec<String> {
    let mut options: Vec<String> = Vec::new();
    for v in raw_votes.iter() {
        for field in ["rankings", "approvals"] {
            if let Some(l) = v.get(field).and_then(|x| x.as_array()) {
                for name in l.iter().filter_map(|x| x.as_str()) {
                    if !name.is_empty() && !options.iter().any(|o| o == name) {
                        options.push(name.to_string());
                    }
                }
            }
        }
    }
    options
}
