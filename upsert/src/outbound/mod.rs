//! Outbound adapters implementing the upsert ports.
//!
//! - **postgres**: column introspection, merge routine creation and
//!   execution over a synchronous `postgres` client
//!
//! Adapters translate between the domain types and the driver; they hold no
//! resolution or caching logic.

pub mod postgres;
