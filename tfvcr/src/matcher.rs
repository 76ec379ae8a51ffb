//! Decides whether a live request can be answered by a recorded one.

use crate::data::RequestDescriptor;
use serde_json::Value;

/// Headers the matcher never looks at, whatever their values are on either
/// side. Recorded cassettes are replayed by clients of different versions, so
/// the user agent is expected to drift.
pub const IGNORED_HEADERS: &[&str] = &["User-Agent"];

const CONTENT_TYPE: &str = "Content-Type";
const JSON_CONTENT_TYPE: &str = "application/json";

pub fn is_ignored_header(name: &str) -> bool {
    IGNORED_HEADERS
        .iter()
        .any(|ignored| ignored.eq_ignore_ascii_case(name))
}

/// Returns true if `live` can be answered with the interaction recorded as
/// `recorded`.
///
/// Scheme, method, host and path must be identical. Bodies are compared as
/// JSON documents when the live request declares a JSON content type, and as
/// plain text otherwise. A body that fails to parse as JSON never matches.
pub fn matches(live: &RequestDescriptor, recorded: &RequestDescriptor) -> bool {
    if live.scheme != recorded.scheme
        || live.method != recorded.method
        || live.host != recorded.host
        || live.path != recorded.path
    {
        return false;
    }

    match (&live.body, &recorded.body) {
        (None, None) => true,
        (Some(live_body), Some(recorded_body)) => {
            if declares_json(live) {
                json_bodies_equal(live_body, recorded_body)
            } else {
                live_body == recorded_body
            }
        }
        _ => false,
    }
}

fn declares_json(request: &RequestDescriptor) -> bool {
    request
        .headers
        .iter()
        .filter(|(name, _)| !is_ignored_header(name))
        .find(|(name, _)| name.eq_ignore_ascii_case(CONTENT_TYPE))
        .map_or(false, |(_, value)| value.contains(JSON_CONTENT_TYPE))
}

fn json_bodies_equal(lhs: &str, rhs: &str) -> bool {
    match (
        serde_json::from_str::<Value>(lhs),
        serde_json::from_str::<Value>(rhs),
    ) {
        (Ok(lhs), Ok(rhs)) => lhs == rhs,
        (lhs, rhs) => {
            tracing::debug!(
                live_valid = lhs.is_ok(),
                recorded_valid = rhs.is_ok(),
                "request body declared as json could not be parsed"
            );
            false
        }
    }
}
