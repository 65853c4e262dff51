//! Shared records passed between the pipeline stages.
//!
//! Records are kept open: anything the schema does not name survives in the
//! `extra` maps so hosts can carry their own attributes through the store.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// A content item in the flat node list.
///
/// Structural links (parent, children, siblings, branch) are not stored on
/// the record; they live in the flattened tree and are read through
/// [`crate::navigation::NodeRef`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Unique across the whole list. Empty only on the reset placeholder.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    /// Path segment. A page with an unnamed ancestor has no path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Frontmatter::is_empty")]
    pub frontmatter: Frontmatter,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Page {
    /// The name, treating an empty string the same as a missing one.
    pub fn segment(&self) -> Option<&str> {
        self.name.as_deref().filter(|n| !n.is_empty())
    }
}

/// Open attribute mapping attached to every page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Frontmatter {
    /// Excluded from every navigation view when set.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub hidden: bool,
    /// Marks the page as a section whose first visible child redirects to it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Frontmatter {
    pub fn is_empty(&self) -> bool {
        !self.hidden && self.template.is_none() && self.extra.is_empty()
    }

    /// A template marker counts only when it is a non-empty string.
    pub fn has_template(&self) -> bool {
        self.template.as_deref().is_some_and(|t| !t.is_empty())
    }
}

/// Object-storage credentials handed to the store by its host.
///
/// Pure configuration data: validated and typed, never transformed.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    #[serde(rename = "accessKeyId")]
    pub access_key_id: Option<String>,
    #[serde(rename = "Bucket")]
    pub bucket: Option<String>,
    pub endpoint: Option<String>,
    pub region: Option<String>,
    #[serde(rename = "secretAccessKey")]
    pub secret_access_key: Option<String>,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access_key_id", &self.access_key_id)
            .field("bucket", &self.bucket)
            .field("endpoint", &self.endpoint)
            .field("region", &self.region)
            .field(
                "secret_access_key",
                &self.secret_access_key.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}
