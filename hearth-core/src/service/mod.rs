//! Decision logic: authentication and listing management.

pub mod auth;
pub mod listings;

pub use auth::AuthService;
pub use listings::{ImageSource, ListingService};
