use crate::models::{ProcessedEvent, TypeCountMap};

const SUFFIX: &str = "Event";
const PULL_REQUEST: &str = "PullRequest";
const PULL_REQUEST_SHORT: &str = "PR";

/// Shortens a GitHub event type for display.
///
/// Two literal replacements, each of the first occurrence only and always
/// in this order: drop `Event`, then turn `PullRequest` into `PR`.
pub fn normalize_label(event_type: &str) -> String {
    event_type
        .replacen(SUFFIX, "", 1)
        .replacen(PULL_REQUEST, PULL_REQUEST_SHORT, 1)
}

/// Projects the counts into chart rows, keeping order and every entry,
/// even when two types end up with the same label.
pub fn normalize(counts: &TypeCountMap) -> Vec<ProcessedEvent> {
    counts
        .iter()
        .map(|(event_type, count)| ProcessedEvent::new(normalize_label(event_type), *count))
        .collect()
}
