//! Database entities.

pub mod shared_access;
pub mod user;

pub use shared_access::Entity as SharedAccess;
pub use user::Entity as User;
