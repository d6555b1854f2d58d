//! User row storage.
//!
//! The [`roster_auth::UserStore`] port is implemented here. Only an in-memory
//! adapter exists; durable persistence is provided by the hosting deployment.

pub mod in_memory;

pub use in_memory::InMemoryUserStore;
