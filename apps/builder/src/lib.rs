pub mod backends;
pub mod completeness;
pub mod compose;
pub mod config;
pub mod errors;
pub mod export;
pub mod format;
pub mod layout;
pub mod models;
pub mod sections;
pub mod state;
pub mod store;
