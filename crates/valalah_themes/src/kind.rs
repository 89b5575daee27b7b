//! Theme identifiers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ThemeError;

/// The four seasonal themes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeKind {
    /// Falling maple and oak leaves in four colors.
    Autumn,
    /// Falling snowflakes.
    Winter,
    /// Falling eggs that crack into chocolate when clicked.
    Easter,
    /// A glow and trail following the pointer.
    Summer,
}

impl ThemeKind {
    /// Every theme, in calendar order.
    pub const ALL: [Self; 4] = [Self::Winter, Self::Easter, Self::Summer, Self::Autumn];

    /// Display name used in load messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Autumn => "Autumn Leaves",
            Self::Winter => "Winter Snowflakes",
            Self::Easter => "Easter Eggs",
            Self::Summer => "Summer Glow",
        }
    }

    /// Directory slug, e.g. `autumn-leaves`.
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Autumn => "autumn-leaves",
            Self::Winter => "winter-snowflakes",
            Self::Easter => "easter-eggs",
            Self::Summer => "summer-glow",
        }
    }

    /// Emoji prefix of the load message.
    #[must_use]
    pub const fn emblem(self) -> &'static str {
        match self {
            Self::Autumn => "🍂",
            Self::Winter => "❄️",
            Self::Easter => "🥚",
            Self::Summer => "☀️",
        }
    }

    /// Name of the page-level cleanup function.
    #[must_use]
    pub const fn cleanup_export(self) -> &'static str {
        match self {
            Self::Autumn => "cleanupAutumnLeaves",
            Self::Winter => "cleanupWinterSnowflakes",
            Self::Easter => "cleanupEasterEggs",
            Self::Summer => "cleanupSummerGlow",
        }
    }

    /// Does this theme follow the pointer instead of dropping particles?
    #[must_use]
    pub const fn is_continuous(self) -> bool {
        matches!(self, Self::Summer)
    }

    /// Does this theme react to clicks?
    #[must_use]
    pub const fn is_interactive(self) -> bool {
        matches!(self, Self::Easter)
    }

    /// The line logged when the theme loads.
    #[must_use]
    pub fn load_message(self) -> String {
        format!("{} {} theme loaded", self.emblem(), self.label())
    }
}

impl fmt::Display for ThemeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Autumn => "autumn",
            Self::Winter => "winter",
            Self::Easter => "easter",
            Self::Summer => "summer",
        };
        f.write_str(name)
    }
}

impl FromStr for ThemeKind {
    type Err = ThemeError;

    /// Accepts the short name or the slug, in any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| wanted == kind.to_string() || wanted == kind.slug())
            .ok_or_else(|| ThemeError::UnknownTheme(s.to_owned()))
    }
}
