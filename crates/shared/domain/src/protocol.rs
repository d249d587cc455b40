//! Message shapes exchanged with the settings and popup surfaces.

use crate::enhancement::EnhancementInfo;
use serde::{Deserialize, Serialize};

pub const UNKNOWN_ACTION: &str = "Unknown action";

/// A directed request `{action, ...params}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Request {
    GetEnhancements,
    ToggleEnhancement { name: String, enabled: bool },
    UpdateWeekendColor { color: String },
    UpdateAlternateRowColor { color: String },
    UpdateRedLineColor { color: String },
}

impl Request {
    pub const ACTIONS: [&'static str; 5] = [
        "getEnhancements",
        "toggleEnhancement",
        "updateWeekendColor",
        "updateAlternateRowColor",
        "updateRedLineColor",
    ];

    #[must_use]
    pub const fn action(&self) -> &'static str {
        match self {
            Self::GetEnhancements => Self::ACTIONS[0],
            Self::ToggleEnhancement { .. } => Self::ACTIONS[1],
            Self::UpdateWeekendColor { .. } => Self::ACTIONS[2],
            Self::UpdateAlternateRowColor { .. } => Self::ACTIONS[3],
            Self::UpdateRedLineColor { .. } => Self::ACTIONS[4],
        }
    }

    #[must_use]
    pub fn is_known_action(action: &str) -> bool {
        Self::ACTIONS.contains(&action)
    }
}

/// Structured reply. Failures travel as data and are never raised across the channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    Enhancements {
        enhancements: Vec<EnhancementInfo>,
    },
    Status {
        success: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        warning: Option<String>,
    },
}

impl Response {
    #[must_use]
    pub const fn ok() -> Self {
        Self::Status { success: true, error: None, warning: None }
    }

    /// The command took effect but something non-fatal (usually persistence) went wrong.
    #[must_use]
    pub fn ok_with_warning(warning: impl Into<String>) -> Self {
        Self::Status { success: true, error: None, warning: Some(warning.into()) }
    }

    #[must_use]
    pub fn failure(error: impl Into<String>) -> Self {
        Self::Status { success: false, error: Some(error.into()), warning: None }
    }

    #[must_use]
    pub fn unknown_action() -> Self {
        Self::failure(UNKNOWN_ACTION)
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        match self {
            Self::Enhancements { .. } => true,
            Self::Status { success, .. } => *success,
        }
    }
}
