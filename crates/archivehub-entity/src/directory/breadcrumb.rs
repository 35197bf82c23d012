//! Breadcrumb trail entries.

use serde::{Deserialize, Serialize};

/// One step of a breadcrumb trail, from the root down to a leaf directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breadcrumb {
    /// Display name of the directory at this step.
    pub name: String,
    /// Cumulative path up to and including this step.
    pub path: String,
}
