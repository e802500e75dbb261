//! Property listing endpoints.

pub mod handlers;
