use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Shirt sizes sold by the shop, Brazilian sizing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ShirtSize {
    PP,
    P,
    M,
    G,
    XG,
}

impl ShirtSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShirtSize::PP => "PP",
            ShirtSize::P => "P",
            ShirtSize::M => "M",
            ShirtSize::G => "G",
            ShirtSize::XG => "XG",
        }
    }

    /// Parses a user-supplied size, case-insensitively. Returns `None` for
    /// anything outside the sold range.
    pub fn from_str(size: &str) -> Option<Self> {
        match size.trim().to_uppercase().as_str() {
            "PP" => Some(ShirtSize::PP),
            "P" => Some(ShirtSize::P),
            "M" => Some(ShirtSize::M),
            "G" => Some(ShirtSize::G),
            "XG" => Some(ShirtSize::XG),
            _ => None,
        }
    }
}

impl Display for ShirtSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_lowercase_and_padded_input() {
        assert_eq!(ShirtSize::from_str(" pp "), Some(ShirtSize::PP));
        assert_eq!(ShirtSize::from_str("xg"), Some(ShirtSize::XG));
    }

    #[test]
    fn rejects_unsold_sizes() {
        assert_eq!(ShirtSize::from_str("XXL"), None);
        assert_eq!(ShirtSize::from_str(""), None);
    }
}
