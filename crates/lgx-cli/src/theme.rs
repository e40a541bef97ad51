//! Styling tokens handed to the render functions.

use serde::{Deserialize, Serialize};

use lgx_core::MilestoneCategory;
use lgx_state::MilestoneStatus;

/// Named theme selectable from config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeName {
    /// No escape sequences.
    #[default]
    Plain,
    /// ANSI colours for terminals.
    Ansi,
}

/// Escape sequences for each visual role. Empty strings in the plain theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeTokens {
    pub reset: &'static str,
    pub bold: &'static str,
    pub muted: &'static str,
    pub success: &'static str,
    pub active: &'static str,
    pub locked: &'static str,
    pub operations: &'static str,
    pub customs: &'static str,
    pub transport: &'static str,
    pub logistics: &'static str,
    pub commercial: &'static str,
}

impl ThemeTokens {
    /// No styling at all; safe for pipes and files.
    pub const fn plain() -> Self {
        Self {
            reset: "",
            bold: "",
            muted: "",
            success: "",
            active: "",
            locked: "",
            operations: "",
            customs: "",
            transport: "",
            logistics: "",
            commercial: "",
        }
    }

    /// 16-colour ANSI styling.
    pub const fn ansi() -> Self {
        Self {
            reset: "\x1b[0m",
            bold: "\x1b[1m",
            muted: "\x1b[2m",
            success: "\x1b[32m",
            active: "\x1b[33m",
            locked: "\x1b[36m",
            operations: "\x1b[34m",
            customs: "\x1b[35m",
            transport: "\x1b[36m",
            logistics: "\x1b[33m",
            commercial: "\x1b[32m",
        }
    }

    pub fn for_name(name: ThemeName) -> Self {
        match name {
            ThemeName::Plain => Self::plain(),
            ThemeName::Ansi => Self::ansi(),
        }
    }

    /// Wrap `text` in `style`, resetting afterwards when styling is active.
    pub fn paint(&self, style: &str, text: &str) -> String {
        if style.is_empty() {
            text.to_string()
        } else {
            format!("{style}{text}{}", self.reset)
        }
    }

    pub fn status_style(&self, status: MilestoneStatus) -> &'static str {
        match status {
            MilestoneStatus::NotReached | MilestoneStatus::Excluded => self.muted,
            MilestoneStatus::Available => self.active,
            MilestoneStatus::CompletedFinal => self.success,
            MilestoneStatus::CompletedLocked => self.locked,
        }
    }

    pub fn category_style(&self, category: MilestoneCategory) -> &'static str {
        match category {
            MilestoneCategory::Operations => self.operations,
            MilestoneCategory::Customs => self.customs,
            MilestoneCategory::Transport => self.transport,
            MilestoneCategory::Logistics => self.logistics,
            MilestoneCategory::Commercial => self.commercial,
        }
    }

    /// Fixed-width checkbox marker for a status.
    pub fn marker(&self, status: MilestoneStatus) -> &'static str {
        match status {
            MilestoneStatus::CompletedFinal => "[x]",
            MilestoneStatus::CompletedLocked => "[#]",
            MilestoneStatus::Available => "[>]",
            MilestoneStatus::NotReached => "[ ]",
            MilestoneStatus::Excluded => " - ",
        }
    }
}

impl Default for ThemeTokens {
    fn default() -> Self {
        Self::plain()
    }
}
