//! Segment start offsets (`at`)

use motive_core::value::parse_leading_float;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Where a segment or label starts on the sequence timeline
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "AtRepr", into = "AtRepr")]
pub enum At {
    /// Absolute time in seconds
    Time(f64),
    /// `"+0.5"` / `"-0.5"`: relative to the end of the previous segment
    Relative(f64),
    /// `"<"` or `"<+0.2"`: relative to the start of the previous segment
    WithPrevious(f64),
    /// A named label, resolving to the current time when unknown
    Label(String),
}

impl At {
    /// Resolve to an absolute time.
    ///
    /// `current` is the end of the previous segment, `prev` its start.
    /// Relative results never go below zero.
    pub fn resolve(&self, current: f64, prev: f64, labels: &FxHashMap<String, f64>) -> f64 {
        match self {
            At::Time(time) => *time,
            At::Relative(delta) => (current + delta).max(0.0),
            At::WithPrevious(delta) if *delta == 0.0 => prev,
            At::WithPrevious(delta) => (prev + delta).max(0.0),
            At::Label(name) => labels.get(name).copied().unwrap_or(current),
        }
    }
}

/// Resolve an optional `at` against the builder's clocks
pub fn calc_next_time(current: f64, next: Option<&At>, prev: f64, labels: &FxHashMap<String, f64>) -> f64 {
    match next {
        Some(at) => at.resolve(current, prev, labels),
        None => current,
    }
}

impl From<f64> for At {
    fn from(time: f64) -> Self {
        At::Time(time)
    }
}

impl FromStr for At {
    type Err = std::convert::Infallible;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let at = if let Some(rest) = text.strip_prefix('<') {
            if rest.is_empty() {
                At::WithPrevious(0.0)
            } else {
                match parse_leading_float(rest) {
                    Some(delta) => At::WithPrevious(delta),
                    None => At::Label(text.to_string()),
                }
            }
        } else if text.starts_with('+') || text.starts_with('-') {
            match parse_leading_float(text) {
                Some(delta) => At::Relative(delta),
                None => At::Label(text.to_string()),
            }
        } else {
            At::Label(text.to_string())
        };
        Ok(at)
    }
}

impl From<&str> for At {
    fn from(text: &str) -> Self {
        match text.parse() {
            Ok(at) => at,
            Err(never) => match never {},
        }
    }
}

impl fmt::Display for At {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            At::Time(time) => write!(f, "{time}"),
            At::Relative(delta) => write!(f, "{delta:+}"),
            At::WithPrevious(delta) if *delta == 0.0 => f.write_str("<"),
            At::WithPrevious(delta) => write!(f, "<{delta:+}"),
            At::Label(name) => f.write_str(name),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum AtRepr {
    Time(f64),
    Text(String),
}

impl TryFrom<AtRepr> for At {
    type Error = String;

    fn try_from(repr: AtRepr) -> Result<Self, Self::Error> {
        Ok(match repr {
            AtRepr::Time(time) => At::Time(time),
            AtRepr::Text(text) => At::from(text.as_str()),
        })
    }
}

impl From<At> for AtRepr {
    fn from(at: At) -> Self {
        match at {
            At::Time(time) => AtRepr::Time(time),
            other => AtRepr::Text(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels() -> FxHashMap<String, f64> {
        let mut labels = FxHashMap::default();
        labels.insert("intro".to_string(), 1.5);
        labels
    }

    #[test]
    fn test_parse() {
        assert_eq!(At::from("<"), At::WithPrevious(0.0));
        assert_eq!(At::from("<+0.2"), At::WithPrevious(0.2));
        assert_eq!(At::from("<-0.2"), At::WithPrevious(-0.2));
        assert_eq!(At::from("+1"), At::Relative(1.0));
        assert_eq!(At::from("-0.5"), At::Relative(-0.5));
        assert_eq!(At::from("intro"), At::Label("intro".into()));
    }

    #[test]
    fn test_resolve() {
        let labels = labels();
        assert_eq!(At::Time(3.0).resolve(1.0, 0.5, &labels), 3.0);
        assert_eq!(At::Relative(0.5).resolve(1.0, 0.5, &labels), 1.5);
        assert_eq!(At::Relative(-2.0).resolve(1.0, 0.5, &labels), 0.0);
        assert_eq!(At::WithPrevious(0.0).resolve(1.0, 0.5, &labels), 0.5);
        assert_eq!(At::WithPrevious(-1.0).resolve(1.0, 0.5, &labels), 0.0);
        assert_eq!(At::Label("intro".into()).resolve(1.0, 0.5, &labels), 1.5);
        assert_eq!(At::Label("missing".into()).resolve(1.0, 0.5, &labels), 1.0);
        assert_eq!(calc_next_time(2.0, None, 0.0, &labels), 2.0);
    }

    #[test]
    fn test_serde() {
        let at: At = serde_json::from_str("\"<+0.25\"").unwrap();
        assert_eq!(at, At::WithPrevious(0.25));
        let at: At = serde_json::from_str("2").unwrap();
        assert_eq!(at, At::Time(2.0));
        assert_eq!(serde_json::to_string(&At::WithPrevious(0.0)).unwrap(), "\"<\"");
    }
}
