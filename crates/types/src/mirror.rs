//! Third-party mirrors that redistribute beatmap archives

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use obae_errors::ConfigError;

/// Placeholder replaced by the beatmap set ID in URL templates
pub const ID_PLACEHOLDER: &str = "{id}";

/// Known mirror endpoints
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum MirrorSource {
    /// <https://nerinyan.moe>
    Nerinyan,
    /// <https://osu.direct>
    #[value(name = "osu_direct", alias = "osu-direct")]
    OsuDirect,
    /// <https://beatconnect.io>
    #[serde(rename = "beatconnect")]
    #[value(name = "beatconnect")]
    BeatConnect,
}

impl MirrorSource {
    /// All mirrors in the default fallback order
    pub const ALL: [Self; 3] = [Self::Nerinyan, Self::OsuDirect, Self::BeatConnect];

    /// Stable identifier used in config files and logs
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Nerinyan => "nerinyan",
            Self::OsuDirect => "osu_direct",
            Self::BeatConnect => "beatconnect",
        }
    }

    /// Built-in download URL template for this mirror
    #[must_use]
    pub fn default_template(self) -> &'static str {
        match self {
            Self::Nerinyan => "https://api.nerinyan.moe/d/{id}",
            Self::OsuDirect => "https://osu.direct/api/d/{id}",
            Self::BeatConnect => "https://beatconnect.io/b/{id}",
        }
    }
}

impl fmt::Display for MirrorSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MirrorSource {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nerinyan" => Ok(Self::Nerinyan),
            "osu_direct" | "osudirect" | "osu-direct" => Ok(Self::OsuDirect),
            "beatconnect" => Ok(Self::BeatConnect),
            other => Err(ConfigError::UnknownMirror {
                name: other.to_string(),
            }),
        }
    }
}
