use crate::models::Cell;

/// How a single payload position was classified
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    Numeric,
    Annotation,
    /// Neither a number nor a string; carried as NaN
    Malformed,
}

/// One series payload split into parallel channels.
///
/// All three vectors have the payload's length, so position `i` still lines
/// up with timestamp `i` of the shared index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SplitSeries {
    pub kinds: Vec<CellKind>,
    pub values: Vec<f64>,
    pub annotations: Vec<Option<String>>,
    pub coerced: usize,
}

impl SplitSeries {
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// The numeric value at `position`, if it should become a fact row
    pub fn fact_value(&self, position: usize) -> Option<f64> {
        match self.kinds.get(position)? {
            CellKind::Numeric => Some(self.values[position]).filter(|v| !v.is_nan()),
            _ => None,
        }
    }

    /// The annotation name at `position`, if any
    pub fn annotation(&self, position: usize) -> Option<&str> {
        self.annotations.get(position)?.as_deref()
    }

    pub fn numeric_count(&self) -> usize {
        (0..self.len()).filter(|&i| self.fact_value(i).is_some()).count()
    }

    pub fn annotation_count(&self) -> usize {
        self.annotations.iter().filter(|a| a.is_some()).count()
    }
}

/// Separate numeric observations from string annotations.
///
/// A cell is an annotation iff it is a string. Every cell that is neither
/// a number nor a string becomes NaN and is counted in `coerced`; NaN
/// values never become fact rows.
pub fn split_series(cells: Vec<Cell>) -> SplitSeries {
    let mut split = SplitSeries {
        kinds: Vec::with_capacity(cells.len()),
        values: Vec::with_capacity(cells.len()),
        annotations: Vec::with_capacity(cells.len()),
        coerced: 0,
    };

    for cell in cells {
        match cell {
            Cell::Number(value) => {
                split.kinds.push(CellKind::Numeric);
                split.values.push(value);
                split.annotations.push(None);
            }
            Cell::Annotation(name) => {
                split.kinds.push(CellKind::Annotation);
                split.values.push(f64::NAN);
                split.annotations.push(Some(name));
            }
            Cell::Other(_) => {
                split.kinds.push(CellKind::Malformed);
                split.values.push(f64::NAN);
                split.annotations.push(None);
                split.coerced += 1;
            }
        }
    }

    split
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_split_mixed_series() {
        let split = split_series(vec![Cell::from(1.5), Cell::from("missing"), Cell::from(2.5)]);

        assert_eq!(split.len(), 3);
        assert_eq!(
            split.kinds,
            vec![CellKind::Numeric, CellKind::Annotation, CellKind::Numeric]
        );
        assert_eq!(split.fact_value(0), Some(1.5));
        assert_eq!(split.fact_value(1), None);
        assert_eq!(split.fact_value(2), Some(2.5));
        assert_eq!(split.annotation(1), Some("missing"));
        assert_eq!(split.annotation(0), None);
        assert_eq!(split.coerced, 0);
    }

    #[test]
    fn test_malformed_cells_are_coerced() {
        let split = split_series(vec![
            Cell::Other(Value::Null),
            Cell::from(4.0),
            Cell::Other(Value::Bool(false)),
        ]);

        assert_eq!(split.coerced, 2);
        assert!(split.values[0].is_nan());
        assert!(split.values[2].is_nan());
        assert_eq!(split.numeric_count(), 1);
        assert_eq!(split.annotation_count(), 0);
    }

    #[test]
    fn test_nan_number_is_not_a_fact() {
        let split = split_series(vec![Cell::Number(f64::NAN)]);

        assert_eq!(split.kinds, vec![CellKind::Numeric]);
        assert_eq!(split.fact_value(0), None);
        assert_eq!(split.coerced, 0);
    }

    #[test]
    fn test_empty_series() {
        let split = split_series(Vec::new());
        assert!(split.is_empty());
        assert_eq!(split.fact_value(0), None);
        assert_eq!(split.annotation(0), None);
    }
}
