use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical (year, make, model) used as the only cross-source join predicate.
///
/// Construct through [`crate::processors::KeyNormalizer`] so make and model are
/// always trimmed and uppercased.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JoinKey {
    pub year: i32,
    pub make: String,
    pub model: String,
}

impl fmt::Display for JoinKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.year, self.make, self.model)
    }
}
