//! Manually entered jump intervals such as `80-82` or `3.5-4.5`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Prefix match used when collecting rows; trailing text after the pair is ignored.
static INTERVAL_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+(?:\.\d+)?)-(\d+(?:\.\d+)?)").expect("valid interval pattern"));

/// Whole-string match used to validate a single entry as it is typed.
static INTERVAL_STRICT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+\.?\d*)-(\d+\.?\d*)$").expect("valid interval pattern"));

/// Time span in seconds with `end > start >= 0`, sent as `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(into = "[f64; 2]", try_from = "[f64; 2]")]
pub struct JumpInterval {
    start: f64,
    end: f64,
}

impl JumpInterval {
    pub fn new(start: f64, end: f64) -> Option<Self> {
        (start.is_finite() && end.is_finite() && start >= 0.0 && end > start)
            .then_some(Self { start, end })
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

impl From<JumpInterval> for [f64; 2] {
    fn from(interval: JumpInterval) -> Self {
        [interval.start, interval.end]
    }
}

impl TryFrom<[f64; 2]> for JumpInterval {
    type Error = String;

    fn try_from([start, end]: [f64; 2]) -> Result<Self, Self::Error> {
        Self::new(start, end).ok_or_else(|| format!("invalid interval [{start}, {end}]"))
    }
}

impl std::fmt::Display for JumpInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

fn from_captures(re: &Regex, raw: &str) -> Option<JumpInterval> {
    let caps = re.captures(raw.trim())?;
    let start = caps[1].parse::<f64>().ok()?;
    let end = caps[2].parse::<f64>().ok()?;
    JumpInterval::new(start, end)
}

/// Lenient parse of one row: `80-82s` yields `80-82`.
pub fn parse_interval(raw: &str) -> Option<JumpInterval> {
    from_captures(&INTERVAL_PREFIX, raw)
}

/// Strict parse of one entry: the whole string must be `<number>-<number>`.
pub fn validate_interval(raw: &str) -> Option<JumpInterval> {
    from_captures(&INTERVAL_STRICT, raw)
}

/// Parse every row, silently skipping blank, malformed and inverted entries.
pub fn collect_intervals<I, S>(inputs: I) -> Vec<JumpInterval>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    inputs
        .into_iter()
        .filter_map(|raw| parse_interval(raw.as_ref()))
        .collect()
}

/// JSON array of `[start, end]` pairs for the `jump_intervals` field.
pub fn intervals_json(intervals: &[JumpInterval]) -> String {
    serde_json::to_string(intervals).unwrap_or_else(|_| "[]".to_string())
}

/// Editable list of interval rows, in display order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntervalRows {
    rows: Vec<String>,
}

impl IntervalRows {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an empty row and return its index.
    pub fn add_row(&mut self) -> usize {
        self.rows.push(String::new());
        self.rows.len() - 1
    }

    pub fn set_row(&mut self, index: usize, text: impl Into<String>) -> bool {
        match self.rows.get_mut(index) {
            Some(row) => {
                *row = text.into();
                true
            }
            None => false,
        }
    }

    pub fn remove_row(&mut self, index: usize) -> Option<String> {
        (index < self.rows.len()).then(|| self.rows.remove(index))
    }

    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    pub fn collect(&self) -> Vec<JumpInterval> {
        collect_intervals(&self.rows)
    }
}

impl<S: Into<String>> FromIterator<S> for IntervalRows {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self {
            rows: iter.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(intervals: &[JumpInterval]) -> Vec<[f64; 2]> {
        intervals.iter().map(|&i| i.into()).collect()
    }

    #[test]
    fn test_collect_drops_malformed_and_inverted() {
        let intervals = collect_intervals(["80-82", "bad", "10-5", "3.5-4.5"]);
        assert_eq!(pairs(&intervals), vec![[80.0, 82.0], [3.5, 4.5]]);
    }

    #[test]
    fn test_collect_skips_blank_and_equal() {
        let intervals = collect_intervals(["", "   ", "7-7", " 12-15 "]);
        assert_eq!(pairs(&intervals), vec![[12.0, 15.0]]);
    }

    #[test]
    fn test_lenient_versus_strict() {
        assert_eq!(
            parse_interval("75-78 axel").map(<[f64; 2]>::from),
            Some([75.0, 78.0])
        );
        assert_eq!(validate_interval("75-78 axel"), None);
        assert_eq!(
            validate_interval("75.-78.5").map(<[f64; 2]>::from),
            Some([75.0, 78.5])
        );
        assert_eq!(validate_interval("-3-4"), None);
        assert_eq!(validate_interval("9-2"), None);
    }

    #[test]
    fn test_intervals_json() {
        let intervals = collect_intervals(["80-82", "94-96.5"]);
        assert_eq!(intervals_json(&intervals), "[[80.0,82.0],[94.0,96.5]]");
        assert_eq!(intervals_json(&[]), "[]");
    }

    #[test]
    fn test_interval_deserialize_validates() {
        let ok: JumpInterval = serde_json::from_str("[1.5, 2]").unwrap();
        assert_eq!(ok.duration(), 0.5);
        assert!(serde_json::from_str::<JumpInterval>("[5, 2]").is_err());
    }

    #[test]
    fn test_interval_rows() {
        let mut rows = IntervalRows::new();
        let first = rows.add_row();
        let second = rows.add_row();
        rows.set_row(first, "80-82");
        rows.set_row(second, "oops");
        assert!(!rows.set_row(9, "1-2"));

        assert_eq!(rows.collect().len(), 1);
        assert_eq!(rows.remove_row(second).as_deref(), Some("oops"));
        assert_eq!(rows.remove_row(5), None);
        assert_eq!(rows.rows(), &["80-82".to_string()][..]);

        let rows: IntervalRows = ["1-2", "3-4"].into_iter().collect();
        assert_eq!(rows.collect().len(), 2);
    }
}
