//! Beatmap set identifiers and the rule used to validate raw input

use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Host serving the official beatmap pages
const OFFICIAL_HOST: &str = "osu.ppy.sh";

/// A validated numeric beatmap set identifier
///
/// The only ways to obtain one are [`IdPolicy::parse`] and
/// [`BeatmapId::from_digits`], so code holding a `BeatmapId` never sees an
/// unvalidated user string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct BeatmapId(String);

impl BeatmapId {
    /// Wrap a token made only of ASCII digits
    #[must_use]
    pub fn from_digits(token: &str) -> Option<Self> {
        if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        Some(Self(token.to_string()))
    }

    /// Borrow the numeric token
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BeatmapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How raw user input is turned into a [`BeatmapId`]
///
/// Both forms accept a bare number or an official beatmap set link such as
/// `https://osu.ppy.sh/beatmapsets/371128#osu/814293`. They differ only in
/// the accepted length of the numeric token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdPolicy {
    /// Any non-empty run of digits
    #[default]
    AnyLength,
    /// Exactly this many digits
    FixedDigits(usize),
}

impl IdPolicy {
    /// Extract and validate an identifier, or `None` if the input is unusable
    #[must_use]
    pub fn parse(self, raw: &str) -> Option<BeatmapId> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        let token = if raw.contains("://") {
            token_from_url(raw)?
        } else {
            raw.to_string()
        };

        let id = BeatmapId::from_digits(&token)?;
        match self {
            Self::AnyLength => Some(id),
            Self::FixedDigits(len) if id.as_str().len() == len => Some(id),
            Self::FixedDigits(_) => None,
        }
    }
}

/// Pull the segment after `/beatmapsets/` out of an official link
fn token_from_url(raw: &str) -> Option<String> {
    let url = Url::parse(raw).ok()?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str() != Some(OFFICIAL_HOST) {
        return None;
    }

    let mut segments = url.path_segments()?;
    if segments.next()? != "beatmapsets" {
        return None;
    }
    segments.next().map(str::to_string)
}
