pub mod account;
pub mod data_stores;
pub mod email;
pub mod issued_session;
pub mod password;
pub mod permissions;
pub mod session_claims;
pub mod token_pair;

pub use account::*;
pub use data_stores::*;
pub use email::*;
pub use issued_session::*;
pub use password::*;
pub use permissions::{evaluate, evaluate_all, evaluate_any, scope_of, PermissionRequirement, Scope};
pub use session_claims::*;
pub use token_pair::*;
