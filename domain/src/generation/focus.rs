//! Focus tags.
//!
//! A [`Focus`] names a field of expertise the model should draw on. Focuses
//! chosen for an agent request are forwarded to every step's generation call.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Field of expertise attached to a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Focus {
    Creative,
    Technical,
    Code,
    Symbolic,
    #[serde(rename = "Word Finder")]
    WordFinder,
    #[serde(rename = "Real Estate")]
    RealEstate,
    Legal,
    Medical,
    Psychology,
    Research,
    Scientific,
    Cybersecurity,
    #[serde(rename = "Penetration Testing")]
    PenetrationTesting,
    Developer,
    Politics,
    Business,
    Ethics,
}

impl Focus {
    pub fn all() -> &'static [Focus] {
        &[
            Focus::Creative,
            Focus::Technical,
            Focus::Code,
            Focus::Symbolic,
            Focus::WordFinder,
            Focus::RealEstate,
            Focus::Legal,
            Focus::Medical,
            Focus::Psychology,
            Focus::Research,
            Focus::Scientific,
            Focus::Cybersecurity,
            Focus::PenetrationTesting,
            Focus::Developer,
            Focus::Politics,
            Focus::Business,
            Focus::Ethics,
        ]
    }

    /// Display name, as shown to users and sent to the model.
    pub fn display_name(&self) -> &'static str {
        match self {
            Focus::Creative => "Creative",
            Focus::Technical => "Technical",
            Focus::Code => "Code",
            Focus::Symbolic => "Symbolic",
            Focus::WordFinder => "Word Finder",
            Focus::RealEstate => "Real Estate",
            Focus::Legal => "Legal",
            Focus::Medical => "Medical",
            Focus::Psychology => "Psychology",
            Focus::Research => "Research",
            Focus::Scientific => "Scientific",
            Focus::Cybersecurity => "Cybersecurity",
            Focus::PenetrationTesting => "Penetration Testing",
            Focus::Developer => "Developer",
            Focus::Politics => "Politics",
            Focus::Business => "Business",
            Focus::Ethics => "Ethics",
        }
    }
}

impl fmt::Display for Focus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl std::str::FromStr for Focus {
    type Err = String;

    /// Case-insensitive; spaces, dashes and underscores are interchangeable
    /// ("word-finder", "Word Finder", "word_finder").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect::<String>()
            .to_lowercase();

        Focus::all()
            .iter()
            .find(|focus| {
                focus
                    .display_name()
                    .replace(' ', "")
                    .eq_ignore_ascii_case(&normalized)
            })
            .copied()
            .ok_or_else(|| format!("Invalid Focus: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_variants() {
        assert_eq!("creative".parse::<Focus>().unwrap(), Focus::Creative);
        assert_eq!("Word Finder".parse::<Focus>().unwrap(), Focus::WordFinder);
        assert_eq!("word-finder".parse::<Focus>().unwrap(), Focus::WordFinder);
        assert_eq!(
            "penetration_testing".parse::<Focus>().unwrap(),
            Focus::PenetrationTesting
        );
        assert!("astrology".parse::<Focus>().is_err());
    }

    #[test]
    fn test_serde_uses_display_names() {
        assert_eq!(
            serde_json::to_string(&Focus::RealEstate).unwrap(),
            "\"Real Estate\""
        );
        let parsed: Focus = serde_json::from_str("\"Penetration Testing\"").unwrap();
        assert_eq!(parsed, Focus::PenetrationTesting);
    }

    #[test]
    fn test_every_display_name_parses_back() {
        for focus in Focus::all() {
            assert_eq!(focus.display_name().parse::<Focus>().unwrap(), *focus);
        }
    }
}
