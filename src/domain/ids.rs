//! Domain identifier types with validation
//!
//! Newtype wrappers for store identifiers. Each type guarantees the
//! identifier is usable before it reaches a store adapter.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Collection name newtype wrapper
///
/// Names a collection (document group) inside the record store.
///
/// # Examples
///
/// ```
/// use stockaudit::domain::ids::CollectionName;
/// use std::str::FromStr;
///
/// let name = CollectionName::from_str("inventoryitems").unwrap();
/// assert_eq!(name.as_str(), "inventoryitems");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CollectionName(String);

impl CollectionName {
    /// Creates a new CollectionName
    ///
    /// Names must be non-blank, at most 120 characters and must not contain
    /// path separators or NUL bytes, since the JSON snapshot store maps
    /// collections to file names.
    pub fn new(name: impl Into<String>) -> Result<Self, String> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err("Collection name cannot be empty".to_string());
        }
        if name.len() > 120 {
            return Err(format!(
                "Collection name too long ({} characters, max 120)",
                name.len()
            ));
        }
        if name.contains(['/', '\\', '\0']) {
            return Err(format!(
                "Collection name '{}' contains invalid characters",
                name.escape_default()
            ));
        }
        Ok(Self(name))
    }

    /// Returns the collection name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for CollectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CollectionName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for CollectionName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Identifier for one audit run
///
/// Attached to log lines and export receipts so evidence files can be traced
/// back to the run that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(uuid::Uuid);

impl RunId {
    /// Generates a fresh random run id
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Short form used in file names
    pub fn short(&self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
