//! Domain services and storage infrastructure for the Hearth rental
//! listing service.
//!
//! - [`store`]: repository ports for users and properties, with Postgres
//!   and in-memory implementations.
//! - [`storage`]: the external file-storage collaborator that turns
//!   uploaded bytes into durable URLs.
//! - [`service`]: the two services holding all decision logic,
//!   authentication and listing management with owner-scoped
//!   authorization.

pub mod error;
pub mod service;
pub mod storage;
pub mod store;

pub use error::{CoreError, Result};
