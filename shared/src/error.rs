use std::fmt;

/// Failures surfaced by session operations. Cell clicks and toggles are total
/// and never produce one of these.
#[derive(Debug, Clone, PartialEq)]
pub enum GridClaimError {
    /// Image reported zero width or height.
    InvalidImageBounds { width: u32, height: u32 },
    /// Lookup text was not `"<x>, <y>"` with two finite numbers.
    MalformedLookup(String),
    /// Team color was not `#rgb` or `#rrggbb`.
    InvalidColor(String),
    EmptyTeamName,
    UnknownTeam(String),
}

impl fmt::Display for GridClaimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidImageBounds { width, height } => {
                write!(f, "image has unusable dimensions {width}x{height}")
            }
            Self::MalformedLookup(input) => {
                write!(f, "expected \"x, y\" with two numbers, got \"{input}\"")
            }
            Self::InvalidColor(value) => write!(f, "\"{value}\" is not a hex color"),
            Self::EmptyTeamName => f.write_str("team name must not be empty"),
            Self::UnknownTeam(id) => write!(f, "no team with id \"{id}\""),
        }
    }
}

impl std::error::Error for GridClaimError {}

#[cfg(test)]
mod tests {
    use super::GridClaimError;

    #[test]
    fn malformed_lookup_message_quotes_input() {
        let err = GridClaimError::MalformedLookup("abc, 5".into());
        assert_eq!(
            err.to_string(),
            "expected \"x, y\" with two numbers, got \"abc, 5\""
        );
    }

    #[test]
    fn bounds_message_includes_dimensions() {
        let err = GridClaimError::InvalidImageBounds {
            width: 0,
            height: 40,
        };
        assert!(err.to_string().contains("0x40"));
    }
}
