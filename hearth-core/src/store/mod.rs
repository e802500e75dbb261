//! Durable storage for user and property records.

pub mod memory;
pub mod ports;
pub mod postgres;

pub use memory::MemoryDatabase;
pub use ports::{PropertiesRepository, PropertyFilter, UsersRepository};
pub use postgres::PostgresDatabase;
