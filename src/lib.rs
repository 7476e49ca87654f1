pub mod api;
pub mod config;
pub mod constants;
pub mod error;
pub mod ledger;
pub mod membership;
pub mod models;
pub mod notify;
pub mod service;
pub mod storage;

pub use error::HisaabError;
pub use membership::in_memory::InMemoryMembership;
pub use notify::in_memory::InMemoryNotifier;
pub use service::HisaabService;
pub use storage::in_memory::InMemoryStorage;

#[cfg(test)]
mod tests; // Include integration tests
