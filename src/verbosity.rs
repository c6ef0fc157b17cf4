//! Verbosity levels gating how much subprocess output reaches the console.

use std::str::FromStr;

use strum::{Display, EnumString};

/// Ordered verbosity setting for a provisioner.
///
/// Variants are declared in increasing order, so `PartialOrd` comparisons
/// such as `verbosity >= Verbosity::Normal` read naturally.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumString,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Verbosity {
    Quiet,
    Minimal,
    #[default]
    Normal,
    Detailed,
    Diagnostic,
}

impl Verbosity {
    /// Parses a configured verbosity name, case-insensitively.
    ///
    /// Unrecognized names fall back to [`Verbosity::Normal`].
    pub fn parse_or_default(value: &str) -> Self {
        match Self::from_str(value.trim()) {
            Ok(verbosity) => verbosity,
            Err(_) => {
                tracing::error!("unknown verbosity setting '{}', using {}", value, Self::default());
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering_follows_declaration() {
        assert!(Verbosity::Quiet < Verbosity::Minimal);
        assert!(Verbosity::Minimal < Verbosity::Normal);
        assert!(Verbosity::Normal < Verbosity::Detailed);
        assert!(Verbosity::Detailed < Verbosity::Diagnostic);
    }

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!(Verbosity::parse_or_default("Minimal"), Verbosity::Minimal);
        assert_eq!(Verbosity::parse_or_default("DIAGNOSTIC"), Verbosity::Diagnostic);
        assert_eq!(Verbosity::parse_or_default("quiet"), Verbosity::Quiet);
    }

    #[test]
    fn test_parse_unknown_falls_back_to_normal() {
        assert_eq!(Verbosity::parse_or_default("loud"), Verbosity::Normal);
        assert_eq!(Verbosity::parse_or_default(""), Verbosity::Normal);
    }

    #[test]
    fn test_display_lowercase() {
        assert_eq!(Verbosity::Detailed.to_string(), "detailed");
    }
}
