use std::sync::Arc;

use crate::dbs::MemoryStore;
use crate::documents::DocumentRepository;
use crate::ledger::ConversationLedger;
use crate::trait_client::{ConversationStore, DocumentStore};

/// Storage handles shared by the service layer
#[derive(Clone)]
pub struct PersistClient {
    ledger: ConversationLedger,
    documents: DocumentRepository,
}

impl PersistClient {
    pub fn new(conversations: Arc<dyn ConversationStore>, documents: Arc<dyn DocumentStore>) -> Self {
        Self {
            ledger: ConversationLedger::new(conversations),
            documents: DocumentRepository::new(documents),
        }
    }

    /// Both record sets in one process-local store
    pub fn in_memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::new(store.clone(), store)
    }

    pub fn ledger(&self) -> &ConversationLedger {
        &self.ledger
    }

    pub fn documents(&self) -> &DocumentRepository {
        &self.documents
    }
}
