pub mod db;
pub mod memory;
pub mod store;

pub use db::{create_db, DbPool, SqliteLearningStore, StoreOptions};
pub use memory::MemoryLearningStore;
pub use store::{LearningStore, StorageError};
