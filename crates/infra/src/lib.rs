//! Infrastructure layer: concrete adapters for the ports declared in `roster-auth`.

pub mod user_store;

pub use user_store::InMemoryUserStore;

mod integration_tests;
