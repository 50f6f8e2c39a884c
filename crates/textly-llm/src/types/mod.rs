pub mod message;
pub mod usage;

pub use message::{Message, Role};
pub use usage::{Cost, TokenUsage};
