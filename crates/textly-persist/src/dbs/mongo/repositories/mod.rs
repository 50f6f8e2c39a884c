pub mod conversation;
pub mod document;
pub mod message;

pub use conversation::MongoConversationRepository;
pub use document::MongoDocumentRepository;
pub use message::MongoMessageRepository;
