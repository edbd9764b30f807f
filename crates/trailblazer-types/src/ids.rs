//! Namespaced registry identifiers.
//!
//! Every terrain type, agent type, footwear item, and footwear tag is named
//! by an [`Identifier`] of the form `namespace:path`. A bare `path` falls
//! back to [`DEFAULT_NAMESPACE`], matching how the host registry resolves
//! unqualified names.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Namespace assumed when an identifier is written without one.
pub const DEFAULT_NAMESPACE: &str = "minecraft";

/// Errors produced when parsing an [`Identifier`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentifierError {
    /// The input was empty or had an empty path component.
    #[error("identifier {0:?} has an empty path")]
    EmptyPath(String),

    /// The input had an explicit but empty namespace (e.g. `":stone"`).
    #[error("identifier {0:?} has an empty namespace")]
    EmptyNamespace(String),

    /// The input contained more than one `:` separator.
    #[error("identifier {0:?} has more than one ':' separator")]
    TooManySeparators(String),

    /// A component contained a character outside the allowed set:
    /// `[a-z0-9_.-]`, plus `/` in the path.
    #[error("identifier {0:?} contains invalid character {1:?}")]
    InvalidCharacter(String, char),
}

/// A namespaced registry identifier such as `minecraft:grass_block`.
///
/// Stored as the full `namespace:path` string so that hashing and equality
/// are a single string comparison on the hot path.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identifier {
    full: String,
    split: usize,
}

impl Identifier {
    /// Parse an identifier, applying [`DEFAULT_NAMESPACE`] when none is given.
    ///
    /// # Errors
    ///
    /// Returns an [`IdentifierError`] if either component is empty, the
    /// input contains more than one separator, or a component holds a
    /// character the host registry would reject.
    pub fn parse(raw: &str) -> Result<Self, IdentifierError> {
        let mut parts = raw.split(':');
        let first = parts.next().unwrap_or_default();
        let second = parts.next();
        if parts.next().is_some() {
            return Err(IdentifierError::TooManySeparators(raw.to_owned()));
        }
        match second {
            None => {
                if first.is_empty() {
                    return Err(IdentifierError::EmptyPath(raw.to_owned()));
                }
                check_chars(raw, first, is_path_char)?;
                Ok(Self::from_parts(DEFAULT_NAMESPACE, first))
            }
            Some(path) => {
                if first.is_empty() {
                    return Err(IdentifierError::EmptyNamespace(raw.to_owned()));
                }
                if path.is_empty() {
                    return Err(IdentifierError::EmptyPath(raw.to_owned()));
                }
                check_chars(raw, first, is_namespace_char)?;
                check_chars(raw, path, is_path_char)?;
                Ok(Self::from_parts(first, path))
            }
        }
    }

    fn from_parts(namespace: &str, path: &str) -> Self {
        let mut full = String::with_capacity(
            namespace.len().saturating_add(path.len()).saturating_add(1),
        );
        full.push_str(namespace);
        full.push(':');
        full.push_str(path);
        Self {
            full,
            split: namespace.len(),
        }
    }

    /// The well-known identifier for "no footwear equipped".
    pub fn none() -> Self {
        Self::from_parts(DEFAULT_NAMESPACE, "none")
    }

    /// The namespace component (before the `:`).
    pub fn namespace(&self) -> &str {
        self.full.get(..self.split).unwrap_or_default()
    }

    /// The path component (after the `:`).
    pub fn path(&self) -> &str {
        self.full
            .get(self.split.saturating_add(1)..)
            .unwrap_or_default()
    }

    /// The full `namespace:path` form.
    pub fn as_str(&self) -> &str {
        &self.full
    }
}

const fn is_namespace_char(c: char) -> bool {
    matches!(c, 'a'..='z' | '0'..='9' | '_' | '.' | '-')
}

const fn is_path_char(c: char) -> bool {
    is_namespace_char(c) || c == '/'
}

fn check_chars(raw: &str, part: &str, allowed: fn(char) -> bool) -> Result<(), IdentifierError> {
    part.chars()
        .find(|&c| !allowed(c))
        .map_or(Ok(()), |bad| Err(IdentifierError::InvalidCharacter(raw.to_owned(), bad)))
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full)
    }
}

impl FromStr for Identifier {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Identifier {
    type Error = IdentifierError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for Identifier {
    type Error = IdentifierError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Identifier> for String {
    fn from(id: Identifier) -> Self {
        id.full
    }
}
