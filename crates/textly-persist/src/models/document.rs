use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Node in a user's document tree (a folder or a file)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub parent: Option<String>,
    pub is_folder: bool,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

/// Typed partial update for a document
///
/// `parent: Some(None)` detaches the document to the root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentUpdate {
    pub name: Option<String>,
    pub parent: Option<Option<String>>,
    pub updated: Option<DateTime<Utc>>,
}

impl DocumentUpdate {
    pub fn apply(&self, document: &mut Document) {
        if let Some(name) = &self.name {
            document.name = name.clone();
        }
        if let Some(parent) = &self.parent {
            document.parent = parent.clone();
        }
        if let Some(updated) = self.updated {
            document.updated = updated;
        }
    }
}
