pub mod gateway;
pub mod impersonation;
pub mod manager;
pub mod store;

pub use gateway::{AuthGateway, HttpAuthGateway, ServiceGateway};
pub use impersonation::ImpersonationController;
pub use manager::SessionManager;
pub use store::{MemorySessionStore, SessionStore, StoredSession};
