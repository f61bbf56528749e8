//! Loading and in-memory caching of the cleaned CRM source tables.

pub mod loader;
pub mod store;

pub use loader::load_tables;
pub use store::TableStore;
