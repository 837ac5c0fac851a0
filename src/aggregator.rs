use crate::models::{IngestStats, TypeCountMap, TypeLine};

/// Parses a line as an event object, or `None` when it is not one.
pub fn parse_line(line: &str) -> Option<TypeLine> {
    serde_json::from_str(line).ok()
}

/// Counts events per `type` for a single ingestion session.
///
/// Lines that are not JSON, or that have no string `type` member, are
/// skipped without complaint: archive data routinely carries truncated
/// records and they must not abort the run.
#[derive(Debug, Default)]
pub struct EventAggregator {
    counts: TypeCountMap,
    stats: IngestStats,
}

impl EventAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses one complete line and bumps its type. Returns whether the
    /// line was counted.
    pub fn record_line(&mut self, line: &str) -> bool {
        let parsed = parse_line(line);
        let counted = parsed.is_some();
        self.record_parsed(parsed);
        counted
    }

    /// Records a parse outcome computed elsewhere (the buffered strategy
    /// parses lines in parallel and folds them here in order).
    pub fn record_parsed(&mut self, parsed: Option<TypeLine>) {
        let counted = parsed.is_some();
        if let Some(typeline) = parsed {
            *self.counts.entry(typeline.linetype).or_insert(0) += 1;
        }
        self.stats.add_line(counted);
    }

    pub fn add_bytes(&mut self, bytes: usize) {
        self.stats.add_bytes(bytes);
    }

    pub fn stats(&self) -> IngestStats {
        self.stats
    }

    pub fn into_parts(self) -> (TypeCountMap, IngestStats) {
        (self.counts, self.stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aggregate(lines: &[&str]) -> EventAggregator {
        let mut aggregator = EventAggregator::new();
        for line in lines {
            aggregator.record_line(line);
        }
        aggregator
    }

    #[test]
    fn it_correctly_creates_the_sets() {
        let aggregator = aggregate(&[
            r#"{"type":"B","foo":"bar","items":["one","two"]}"#,
            r#"{"type":"B","foo":"bar","items":["one","two"]}"#,
            r#"{"type":"A","foo":"bar","items":["one","two"]}"#,
            r#"{"type":"C","foo":"bar","items":["one","two"]}"#,
        ]);
        let (counts, stats) = aggregator.into_parts();
        assert_eq!(counts.len(), 3);
        assert_eq!(counts.get("B"), Some(&2));
        assert_eq!(stats.counted, 4);
    }

    #[test]
    fn it_keeps_first_appearance_order() {
        let (counts, _) = aggregate(&[
            r#"{"type":"Watch"}"#,
            r#"{"type":"Push"}"#,
            r#"{"type":"Watch"}"#,
            r#"{"type":"Fork"}"#,
        ])
        .into_parts();
        let keys: Vec<&str> = counts.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Watch", "Push", "Fork"]);
    }

    #[test]
    fn it_skips_bad_formatted_json() {
        let (counts, stats) = aggregate(&[
            r#"{"type":"B" "foo":"bar","items":["one","two"]}"#,
            r#"{"type":"A","foo":"bar","items":["one","two"]}"#,
            r#"{"type":"A","foo":"ba"#,
        ])
        .into_parts();
        assert_eq!(counts.len(), 1);
        assert_eq!(counts.get("A"), Some(&1));
        assert_eq!(stats.skipped, 2);
    }

    #[test]
    fn it_skips_json_without_a_usable_type() {
        let (counts, stats) = aggregate(&[
            r#"{"type1":"B"}"#,
            r#"{"type":42}"#,
            r#"{"type":null}"#,
            "null",
            "[1,2]",
            r#"["A"]"#,
            "\"PushEvent\"",
            r#"{"type":"A"}"#,
        ])
        .into_parts();
        assert_eq!(counts.len(), 1);
        assert_eq!(stats.lines, 8);
        assert_eq!(stats.skipped, 7);
    }

    #[test]
    fn it_counts_the_last_of_repeated_type_keys() {
        let (counts, stats) = aggregate(&[r#"{"type":"A","type":"B"}"#]).into_parts();
        assert_eq!(counts.get("B"), Some(&1));
        assert_eq!(counts.get("A"), None);
        assert_eq!(stats.skipped, 0);
    }

    #[test]
    fn it_accepts_surrounding_whitespace_and_carriage_returns() {
        let (counts, _) = aggregate(&["  {  \"type\":\"B\", \"foo\":\"bar\"}  \r"]).into_parts();
        assert_eq!(counts.get("B"), Some(&1));
    }
}
