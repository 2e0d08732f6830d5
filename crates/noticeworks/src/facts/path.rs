use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Dotted path addressing a single fact, such as `deposit.protected` or
/// `arrears.months`. Segments are lower-camel identifiers separated by dots.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FactPath(String);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("fact path must not be empty")]
    Empty,
    #[error("fact path '{0}' contains an empty segment")]
    EmptySegment(String),
    #[error("fact path '{path}' has invalid segment '{segment}'")]
    InvalidSegment { path: String, segment: String },
}

impl FactPath {
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        if raw.is_empty() {
            return Err(PathError::Empty);
        }
        for segment in raw.split('.') {
            if segment.is_empty() {
                return Err(PathError::EmptySegment(raw.to_string()));
            }
            let mut chars = segment.chars();
            let leading_ok = chars
                .next()
                .map(|first| first.is_ascii_alphabetic())
                .unwrap_or(false);
            if !leading_ok || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(PathError::InvalidSegment {
                    path: raw.to_string(),
                    segment: segment.to_string(),
                });
            }
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }
}

impl fmt::Display for FactPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for FactPath {
    type Err = PathError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::parse(raw)
    }
}

impl TryFrom<String> for FactPath {
    type Error = PathError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(&raw)
    }
}

impl From<FactPath> for String {
    fn from(path: FactPath) -> Self {
        path.0
    }
}
