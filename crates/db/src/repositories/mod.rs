//! Database repositories.

mod shared_access;
mod user;

pub use shared_access::SharedAccessRepository;
pub use user::UserRepository;
