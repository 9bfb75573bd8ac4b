//! Ad request descriptors and per-format policy.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use viaduct_partner::BannerSize;

use crate::error::Error;

/// The ad formats this adapter can serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdFormat {
    /// Inline banner, presented implicitly once loaded.
    Banner,
    /// Full-screen interstitial.
    Interstitial,
    /// Full-screen rewarded video.
    Rewarded,
}

impl AdFormat {
    /// The lifecycle policy for this format.
    #[must_use]
    pub const fn policy(self) -> FormatPolicy {
        match self {
            Self::Banner => FormatPolicy {
                implicit_show: true,
                allow_concurrent_loads: true,
            },
            Self::Interstitial | Self::Rewarded => FormatPolicy {
                implicit_show: false,
                allow_concurrent_loads: false,
            },
        }
    }

    /// Canonical name, as used by the mediation layer.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Banner => "banner",
            Self::Interstitial => "interstitial",
            Self::Rewarded => "rewarded",
        }
    }
}

impl FromStr for AdFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "banner" => Ok(Self::Banner),
            "interstitial" => Ok(Self::Interstitial),
            "rewarded" => Ok(Self::Rewarded),
            other => Err(Error::UnsupportedFormat {
                format: other.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for AdFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The two axes on which the formats differ.
///
/// One generic bridge parameterized by this policy replaces three
/// near-duplicate per-format ad implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatPolicy {
    /// Banner-style presentation: the ad shows as soon as it loads, with no
    /// explicit show step.
    pub implicit_show: bool,
    /// Whether several concurrent loads may target the same placement
    /// (banner prefetch during auto-refresh).
    pub allow_concurrent_loads: bool,
}

/// Immutable descriptor of a single ad load attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdRequest {
    /// Partner placement identifier.
    pub placement: String,
    /// Requested format.
    pub format: AdFormat,
    /// Requested display size; only meaningful for banners.
    pub size: Option<BannerSize>,
}

impl AdRequest {
    /// Descriptor for a full-screen load.
    pub fn fullscreen(placement: impl Into<String>, format: AdFormat) -> Self {
        Self {
            placement: placement.into(),
            format,
            size: None,
        }
    }

    /// Descriptor for a banner load at the given size.
    pub fn banner(placement: impl Into<String>, size: BannerSize) -> Self {
        Self {
            placement: placement.into(),
            format: AdFormat::Banner,
            size: Some(size),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn banner_policy_allows_concurrency_and_implicit_show() {
        let policy = AdFormat::Banner.policy();
        assert!(policy.implicit_show);
        assert!(policy.allow_concurrent_loads);
    }

    #[test]
    fn fullscreen_policies_are_strict() {
        for format in [AdFormat::Interstitial, AdFormat::Rewarded] {
            let policy = format.policy();
            assert!(!policy.implicit_show);
            assert!(!policy.allow_concurrent_loads);
        }
    }

    #[test]
    fn formats_parse_from_canonical_names() {
        assert_eq!("banner".parse::<AdFormat>().unwrap(), AdFormat::Banner);
        assert_eq!(
            "interstitial".parse::<AdFormat>().unwrap(),
            AdFormat::Interstitial
        );
        assert_eq!("rewarded".parse::<AdFormat>().unwrap(), AdFormat::Rewarded);
    }

    #[test]
    fn unknown_format_is_rejected() {
        let err = "native".parse::<AdFormat>().unwrap_err();
        assert_eq!(
            err,
            Error::UnsupportedFormat {
                format: "native".to_string()
            }
        );
    }
}
