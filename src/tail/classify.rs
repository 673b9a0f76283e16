//! Line classification by keyword.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Severity category derived from a line's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Error,
    Warning,
    Info,
    Other,
}

impl Category {
    /// Short uppercase label used by the display layer.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Error => "ERROR",
            Self::Warning => "WARN",
            Self::Info => "INFO",
            Self::Other => "-",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
            Self::Other => "other",
        };
        f.write_str(name)
    }
}

/// Keywords checked in priority order; the first hit decides the category.
const KEYWORDS: &[(&str, Category)] = &[
    ("error", Category::Error),
    ("warn", Category::Warning),
    ("info", Category::Info),
];

/// Classify a line by case-insensitive keyword match.
///
/// A line mentioning both "error" and "warn" is an error.
#[must_use]
pub fn classify(text: &str) -> Category {
    let lowered = text.to_lowercase();
    KEYWORDS
        .iter()
        .find(|(keyword, _)| lowered.contains(keyword))
        .map_or(Category::Other, |(_, category)| *category)
}
