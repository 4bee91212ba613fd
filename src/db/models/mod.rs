//! Database models split into domain-specific modules.

pub mod account;
pub mod caterer;
pub mod common;
pub mod user;

pub use account::*;
pub use caterer::*;
pub use common::*;
pub use user::*;
