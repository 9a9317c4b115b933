//! Day/night map theme

use serde::{Deserialize, Serialize};

/// Base style theme. Which concrete style URL each variant maps to is
/// configuration, not domain knowledge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Day,
    Night,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Day => Theme::Night,
            Theme::Night => Theme::Day,
        }
    }

    pub fn is_night(self) -> bool {
        self == Theme::Night
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_flips_and_returns() {
        assert_eq!(Theme::Day.toggled(), Theme::Night);
        assert_eq!(Theme::Day.toggled().toggled(), Theme::Day);
    }
}
