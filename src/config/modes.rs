//! Listing failure policy definitions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What to do when a folder cannot be listed.
///
/// The root folder listing is fatal under every policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingFailurePolicy {
    /// Stop the whole run (default).
    #[default]
    Abort,
    /// Record the folder in the folder journal and continue with its siblings.
    Journal,
}

impl fmt::Display for ListingFailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListingFailurePolicy::Abort => write!(f, "abort"),
            ListingFailurePolicy::Journal => write!(f, "journal"),
        }
    }
}
