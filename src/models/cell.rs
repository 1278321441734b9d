use serde::{Deserialize, Serialize};

/// One entry of a series payload.
///
/// Payloads mix numeric observations with string annotations (for example
/// `"missing"` or `"calibration"`) that stand in for a value. Anything else
/// the serialized file may contain is kept as `Other` so the splitter can
/// decide what to do with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Number(f64),
    Annotation(String),
    Other(serde_json::Value),
}

impl Cell {
    pub fn is_annotation(&self) -> bool {
        matches!(self, Cell::Annotation(_))
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Annotation(value.to_string())
    }
}
