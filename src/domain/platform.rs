//! Target social network of a reply.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Closed set of platforms the gateway drafts replies for.
///
/// The platform only steers tone guidance inside the prompt; it never
/// limits what is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
pub enum Platform {
    /// Short, conversational posts.
    Twitter,
    /// Professional network.
    LinkedIn,
    /// Visual, casual posts.
    Instagram,
}

impl Platform {
    /// Every supported platform, in display order.
    pub const ALL: [Self; 3] = [Self::Twitter, Self::LinkedIn, Self::Instagram];

    /// Returns the canonical label used in prompts, storage and JSON.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Twitter => "Twitter",
            Self::LinkedIn => "LinkedIn",
            Self::Instagram => "Instagram",
        }
    }

    /// Reads a label written by older tools, which stored whatever casing
    /// the input file used.
    #[must_use]
    pub fn from_stored(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(label))
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a label is not one of [`Platform::ALL`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported platform '{0}': expected one of Twitter, LinkedIn, Instagram")]
pub struct UnknownPlatform(pub String);

impl FromStr for Platform {
    type Err = UnknownPlatform;

    /// Matching is exact: `"twitter"` is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| UnknownPlatform(s.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn parses_canonical_labels() {
        for platform in Platform::ALL {
            let Ok(parsed) = platform.as_str().parse::<Platform>() else {
                panic!("{platform} should parse");
            };
            assert_eq!(parsed, platform);
        }
    }

    #[test]
    fn rejects_unknown_and_miscased_labels() {
        assert!("Facebook".parse::<Platform>().is_err());
        assert!("twitter".parse::<Platform>().is_err());
        assert!("".parse::<Platform>().is_err());
    }

    #[test]
    fn stored_labels_ignore_case() {
        assert_eq!(Platform::from_stored("twitter"), Some(Platform::Twitter));
        assert_eq!(Platform::from_stored(" LINKEDIN "), Some(Platform::LinkedIn));
        assert_eq!(Platform::from_stored("Facebook"), None);
    }

    #[test]
    fn serializes_as_label() {
        let json = serde_json::to_string(&Platform::LinkedIn).ok();
        assert_eq!(json.as_deref(), Some("\"LinkedIn\""));
    }

    #[test]
    fn error_names_offending_value() {
        let Err(err) = "MySpace".parse::<Platform>() else {
            panic!("MySpace is not supported");
        };
        assert!(err.to_string().contains("MySpace"));
    }
}
