pub mod models;
pub mod trait_client;
pub mod dbs;
pub mod hierarchy;
pub mod ledger;
pub mod documents;
pub mod client;
pub mod builder;
pub mod error;

pub use models::{
    Conversation, ConversationFilter, ConversationKind, ConversationMessage, ConversationTotals,
    ConversationUpdate, Document, DocumentUpdate, MessageFilter, NewTurn,
};
pub use trait_client::{ConversationStore, DocumentStore};
pub use dbs::MemoryStore;
#[cfg(feature = "mongodb")]
pub use dbs::mongo::MongoStore;
pub use hierarchy::{check_no_cycle, ParentLookup};
pub use ledger::ConversationLedger;
pub use documents::{DocumentRepository, NewDocument, DocumentPatch};
pub use client::PersistClient;
pub use builder::{PersistClientBuilder, StorageBackend};
pub use error::{CycleKind, PersistError, Result};
