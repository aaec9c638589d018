// Primitives for reading ballot files in JSON.

use crate::rcv::*;

/// Reads the raw vote records of a ballot file.
///
/// The file holds a list of records. A `null` document means that there are
/// no ballots.
pub fn read_json_ballots(path: &str) -> RcvResult<Vec<JSValue>> {
    info!("Attempting to read ballot file {:?}", path);
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(&contents).context(ParsingJsonSnafu { path })?;
    match js {
        JSValue::Array(l) => {
            debug!("read_json_ballots: {} records", l.len());
            Ok(l)
        }
        JSValue::Null => Ok(Vec::new()),
        _ => NotABallotListSnafu { path }.fail(),
    }
}
