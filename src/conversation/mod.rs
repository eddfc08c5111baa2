pub mod log;
pub mod store;

pub use log::{ConversationLog, ConversationRecord, Message, Role};
pub use store::{ConversationStore, JsonFileStore, update};
