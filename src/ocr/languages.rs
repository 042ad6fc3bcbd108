//! Tesseract language sets.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

/// Separator Tesseract uses between language codes.
pub const LANGUAGE_SEPARATOR: char = '+';

/// Errors from parsing a language specification.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LanguageError {
    #[error("No language codes given")]
    Empty,

    #[error("Invalid language code {0:?} (expected letters, digits or '_', e.g. eng or chi_sim)")]
    InvalidCode(String),
}

/// An ordered, de-duplicated list of Tesseract language codes.
///
/// Parsed from the `+`-joined form Tesseract's `-l` flag takes, e.g.
/// `eng+spa+fra`, and displayed back in the same form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub struct LanguageSet(Vec<String>);

impl LanguageSet {
    /// Individual language codes, in the order given.
    pub fn codes(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Whether `code` is safe to use as a traineddata file stem.
pub fn is_valid_code(code: &str) -> bool {
    !code.is_empty()
        && code
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl FromStr for LanguageSet {
    type Err = LanguageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(LanguageError::Empty);
        }

        let mut codes: Vec<String> = Vec::new();
        for code in s.split(LANGUAGE_SEPARATOR).map(str::trim) {
            if !is_valid_code(code) {
                return Err(LanguageError::InvalidCode(code.to_string()));
            }
            if !codes.iter().any(|c| c == code) {
                codes.push(code.to_string());
            }
        }

        Ok(Self(codes))
    }
}

impl fmt::Display for LanguageSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("+"))
    }
}

impl From<LanguageSet> for String {
    fn from(set: LanguageSet) -> Self {
        set.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_multiple() {
        let langs: LanguageSet = "eng+spa+fra".parse().unwrap();
        assert_eq!(langs.codes(), ["eng", "spa", "fra"]);
        assert_eq!(langs.to_string(), "eng+spa+fra");
    }

    #[test]
    fn test_parse_dedupes_and_trims() {
        let langs: LanguageSet = " eng + chi_sim+eng".parse().unwrap();
        assert_eq!(langs.codes(), ["eng", "chi_sim"]);
        assert_eq!(langs.len(), 2);
    }

    #[test]
    fn test_empty_rejected() {
        assert_eq!("".parse::<LanguageSet>(), Err(LanguageError::Empty));
        assert_eq!("   ".parse::<LanguageSet>(), Err(LanguageError::Empty));
    }

    #[test]
    fn test_empty_segment_rejected() {
        assert_eq!(
            "eng++spa".parse::<LanguageSet>(),
            Err(LanguageError::InvalidCode(String::new()))
        );
    }

    #[test]
    fn test_path_like_code_rejected() {
        assert!(matches!(
            "../eng".parse::<LanguageSet>(),
            Err(LanguageError::InvalidCode(_))
        ));
        assert!(matches!(
            "eng/../../etc".parse::<LanguageSet>(),
            Err(LanguageError::InvalidCode(_))
        ));
    }

    #[test]
    fn test_serializes_as_string() {
        let langs: LanguageSet = "eng+deu".parse().unwrap();
        assert_eq!(serde_json::to_string(&langs).unwrap(), "\"eng+deu\"");
    }
}
