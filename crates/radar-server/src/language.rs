//! Language selection for prompts and user facing messages

use std::fmt;
use std::str::FromStr;

/// Language of the analysis prompt and of server messages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Language {
    /// English
    #[default]
    English,
    /// Norwegian (Bokmål)
    Norwegian,
}

impl Language {
    /// Get ISO 639-1 language code
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Norwegian => "no",
        }
    }

    /// Message returned when the quote provider's request quota is used up
    pub fn rate_limit_message(&self) -> &'static str {
        match self {
            Language::English => {
                "The Alpha Vantage free-tier API limit has been reached. Please wait about a minute and try again."
            }
            Language::Norwegian => "API-grensen er nådd. Vennligst vent et minutt og prøv igjen.",
        }
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" | "english" => Ok(Language::English),
            "no" | "nb" | "nb-no" | "norwegian" | "norsk" => Ok(Language::Norwegian),
            other => Err(format!("unsupported language '{other}'")),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        assert_eq!("en".parse::<Language>(), Ok(Language::English));
        assert_eq!("Norsk".parse::<Language>(), Ok(Language::Norwegian));
        assert_eq!(" nb ".parse::<Language>(), Ok(Language::Norwegian));
        assert!("zh".parse::<Language>().is_err());
    }

    #[test]
    fn test_rate_limit_message_mentions_waiting() {
        assert!(Language::English.rate_limit_message().contains("minute"));
        assert!(Language::Norwegian.rate_limit_message().contains("minutt"));
    }
}
