pub mod identity;
pub mod session;

pub use identity::IdentityProvider;
pub use session::{AuthSession, SessionStore};
