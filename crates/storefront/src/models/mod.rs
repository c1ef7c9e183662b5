//! Customer-facing domain types.
//!
//! Validated domain objects separate from database row types. Record types
//! that only one repository touches (products, orders, reviews) live next to
//! their queries in [`crate::db`].

pub mod cart;
pub mod session;
pub mod user;

pub use cart::{Cart, CartLine};
pub use session::CurrentUser;
pub use session::keys as session_keys;
pub use user::User;
