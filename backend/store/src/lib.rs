pub mod sqlite_store;
pub mod store;

pub use sqlite_store::SqliteChatStore;
pub use store::InMemoryChatStore;
