use std::collections::VecDeque;

use crate::config::MAX_COORDS;
use crate::error::GridClaimError;
use crate::geometry::Point;

pub const EMPTY_HISTORY_TEXT: &str = "no clicks yet";

/// Recent probe clicks, newest first. Oldest entries fall off past the cap.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeHistory {
    entries: VecDeque<Point>,
    capacity: usize,
}

impl Default for ProbeHistory {
    fn default() -> Self {
        Self::with_capacity(MAX_COORDS)
    }
}

impl ProbeHistory {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn record(&mut self, point: Point) {
        if self.capacity == 0 {
            return;
        }
        self.entries.push_front(point);
        self.entries.truncate(self.capacity);
    }

    pub fn entries(&self) -> impl ExactSizeIterator<Item = &Point> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// One display line per entry, or the placeholder when empty.
    pub fn lines(&self) -> Vec<String> {
        if self.entries.is_empty() {
            return vec![EMPTY_HISTORY_TEXT.to_string()];
        }
        self.entries.iter().copied().map(format_probe).collect()
    }
}

/// `[lat, lng]` with two decimals; lat is the pixel row (y), lng the column (x).
pub fn format_probe(point: Point) -> String {
    format!("[{:.2}, {:.2}]", point.y, point.x)
}

/// Parse manual lookup input of the form `"<x>, <y>"`.
pub fn parse_lookup(input: &str) -> Result<Point, GridClaimError> {
    let malformed = || GridClaimError::MalformedLookup(input.to_string());
    let mut tokens = input.split(',').map(str::trim);
    let (Some(x), Some(y), None) = (tokens.next(), tokens.next(), tokens.next()) else {
        return Err(malformed());
    };
    let x = x.parse::<f64>().map_err(|_| malformed())?;
    let y = y.parse::<f64>().map_err(|_| malformed())?;
    if !x.is_finite() || !y.is_finite() {
        return Err(malformed());
    }
    Ok(Point::new(x, y))
}

#[cfg(test)]
mod tests {
    use super::{EMPTY_HISTORY_TEXT, ProbeHistory, format_probe, parse_lookup};
    use crate::config::MAX_COORDS;
    use crate::error::GridClaimError;
    use crate::geometry::Point;

    #[test]
    fn history_is_newest_first_and_capped() {
        let mut history = ProbeHistory::default();
        for i in 0..15 {
            history.record(Point::new(i as f64, 0.0));
        }
        assert_eq!(history.len(), MAX_COORDS);
        let xs: Vec<f64> = history.entries().map(|p| p.x).collect();
        assert_eq!(xs, [14.0, 13.0, 12.0, 11.0, 10.0, 9.0, 8.0, 7.0, 6.0, 5.0]);
    }

    #[test]
    fn empty_history_shows_placeholder() {
        assert_eq!(ProbeHistory::default().lines(), [EMPTY_HISTORY_TEXT]);
    }

    #[test]
    fn formats_lat_then_lng_with_two_decimals() {
        assert_eq!(format_probe(Point::new(1200.0, 800.457)), "[800.46, 1200.00]");
    }

    #[test]
    fn parses_valid_lookup() {
        assert_eq!(parse_lookup("1200, 800"), Ok(Point::new(1200.0, 800.0)));
        assert_eq!(parse_lookup("  -3.5 ,4e2 "), Ok(Point::new(-3.5, 400.0)));
    }

    #[test]
    fn rejects_malformed_lookup() {
        for input in ["abc, 5", "1200", "1, 2, 3", "", ",", "1,", "NaN, 4", "inf, 2"] {
            assert_eq!(
                parse_lookup(input),
                Err(GridClaimError::MalformedLookup(input.to_string())),
                "input {input:?}"
            );
        }
    }
}
