//! Hosted-database backend for the recovery store.
//!
//! Talks to a PostgREST endpoint (as exposed by Supabase) over HTTPS. Table
//! columns mirror the serde field names of the core record types, so rows
//! deserialise straight into [`gamblefree_core`] structs.

mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::{RemoteConfig, RemoteStore};
