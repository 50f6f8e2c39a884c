use serde::Deserialize;
use std::sync::Arc;

use crate::error::{PersistError, Result};
use crate::hierarchy::check_no_cycle;
use crate::models::{now_millis, Document, DocumentUpdate};
use crate::trait_client::DocumentStore;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewDocument {
    pub name: String,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub is_folder: bool,
}

/// Partial update. `parent: Some(None)` moves the document to the root.
#[derive(Debug, Clone, Default)]
pub struct DocumentPatch {
    pub name: Option<String>,
    pub parent: Option<Option<String>>,
}

/// Document tree mutations, each one guarded against parent cycles
#[derive(Clone)]
pub struct DocumentRepository {
    store: Arc<dyn DocumentStore>,
}

impl DocumentRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, user_id: &str, new: NewDocument) -> Result<Document> {
        if new.name.trim().is_empty() {
            return Err(PersistError::InvalidInput("document name is required".to_string()));
        }
        let parent = normalize_parent(new.parent);

        // The record has no id yet, so the guard passes trivially; it still runs
        // so every parent write goes through the same path.
        check_no_cycle(self.store.as_ref(), "", parent.as_deref()).await?;
        if let Some(parent_id) = &parent {
            self.check_parent(user_id, parent_id).await?;
        }

        let now = now_millis();
        let document = Document {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            name: new.name,
            parent,
            is_folder: new.is_folder,
            created: now,
            updated: now,
        };
        self.store.insert_document(document.clone()).await?;

        tracing::debug!(document_id = %document.id, is_folder = document.is_folder, "Document created");
        Ok(document)
    }

    pub async fn update(&self, user_id: &str, id: &str, patch: DocumentPatch) -> Result<Document> {
        let mut document = self.get(user_id, id).await?;

        let parent = patch.parent.map(normalize_parent);
        if let Some(Some(parent_id)) = &parent {
            check_no_cycle(self.store.as_ref(), id, Some(parent_id)).await?;
            self.check_parent(user_id, parent_id).await?;
        }
        if let Some(name) = &patch.name {
            if name.trim().is_empty() {
                return Err(PersistError::InvalidInput("document name cannot be empty".to_string()));
            }
        }

        let update = DocumentUpdate {
            name: patch.name,
            parent,
            updated: Some(now_millis()),
        };
        if !self.store.update_document(id, update.clone()).await? {
            return Err(PersistError::DocumentNotFound(id.to_string()));
        }
        update.apply(&mut document);
        Ok(document)
    }

    pub async fn get(&self, user_id: &str, id: &str) -> Result<Document> {
        let document = self
            .store
            .get_document(id)
            .await?
            .ok_or_else(|| PersistError::DocumentNotFound(id.to_string()))?;
        if document.user_id != user_id {
            return Err(PersistError::Forbidden(format!("document {}", id)));
        }
        Ok(document)
    }

    async fn check_parent(&self, user_id: &str, parent_id: &str) -> Result<()> {
        let parent = self.get(user_id, parent_id).await?;
        if !parent.is_folder {
            return Err(PersistError::InvalidInput(format!(
                "parent {} is not a folder",
                parent_id
            )));
        }
        Ok(())
    }
}

fn normalize_parent(parent: Option<String>) -> Option<String> {
    parent.filter(|p| !p.is_empty())
}
