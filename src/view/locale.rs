use super::error::ViewError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Language with an optional region, e.g. `pl` or `en-US`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Locale {
    language: String,
    region: Option<String>,
}

impl Locale {
    pub fn new(language: &str, region: Option<&str>) -> Self {
        Self {
            language: language.to_ascii_lowercase(),
            region: region.map(|r| r.to_ascii_uppercase()),
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }
}

impl Default for Locale {
    fn default() -> Self {
        Locale::new("en", None)
    }
}

impl FromStr for Locale {
    type Err = ViewError;

    /// Accepts `en`, `en-US` and `en_US`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ViewError::MalformedBody(format!("invalid locale '{}'", s));
        let mut parts = s.trim().split(['-', '_']);

        let language = parts.next().filter(|l| is_alpha(l, 2..=3)).ok_or_else(invalid)?;
        let region = match parts.next() {
            Some(r) if is_alpha(r, 2..=2) || (r.len() == 3 && r.bytes().all(|b| b.is_ascii_digit())) => {
                Some(r)
            }
            Some(_) => return Err(invalid()),
            None => None,
        };
        if parts.next().is_some() {
            return Err(invalid());
        }

        Ok(Locale::new(language, region))
    }
}

fn is_alpha(s: &str, len: std::ops::RangeInclusive<usize>) -> bool {
    len.contains(&s.len()) && s.bytes().all(|b| b.is_ascii_alphabetic())
}

impl TryFrom<String> for Locale {
    type Error = ViewError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Locale> for String {
    fn from(locale: Locale) -> Self {
        locale.to_string()
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.region {
            Some(region) => write!(f, "{}-{}", self.language, region),
            None => f.write_str(&self.language),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let l: Locale = "pl_pl".parse().unwrap();
        assert_eq!(l.language(), "pl");
        assert_eq!(l.region(), Some("PL"));
        assert_eq!(l.to_string(), "pl-PL");

        assert_eq!("EN".parse::<Locale>().unwrap(), Locale::default());
        assert_eq!("es-419".parse::<Locale>().unwrap().region(), Some("419"));
    }

    #[test]
    fn test_rejects_garbage() {
        for bad in ["", "e", "english", "en-USA-x", "en-U5", "12"] {
            assert!(bad.parse::<Locale>().is_err(), "{bad}");
        }
    }

    #[test]
    fn test_serde_as_string() {
        let l: Locale = serde_json::from_str("\"de_AT\"").unwrap();
        assert_eq!(serde_json::to_string(&l).unwrap(), "\"de-AT\"");
    }
}
