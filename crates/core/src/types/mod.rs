//! Validated domain newtypes and enums.

pub mod email;
pub mod id;
pub mod price;
pub mod status;
pub mod taste;

pub use email::{Email, EmailError};
pub use id::*;
pub use price::{CurrencyCode, Price};
pub use status::*;
pub use taste::{GrindType, RoastLevel, TasteProfile, TasteScore, TasteScoreError};
