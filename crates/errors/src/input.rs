//! User input error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum InputError {
    #[error("invalid beatmap ID or beatmap link provided: {input}")]
    InvalidIdentifier { input: String },

    #[error("no beatmap ID or beatmap link provided")]
    Empty,
}

impl UserFacingError for InputError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        Some("Pass a numeric beatmap set ID or a https://osu.ppy.sh/beatmapsets/<id> link.")
    }

    fn user_code(&self) -> Option<&'static str> {
        match self {
            Self::InvalidIdentifier { .. } => Some("input.invalid_identifier"),
            Self::Empty => Some("input.empty"),
        }
    }
}
