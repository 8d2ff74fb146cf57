//! Session and authorization core for a multi-tenant administration
//! product.
//!
//! - token issuance, single-use refresh rotation and revocation
//!   (`services`)
//! - scoped permission evaluation (`domain::permissions`)
//! - client session state, single-flight refresh and admin impersonation
//!   (`session`)
//!
//! Persistence, HTTP routing and the dashboard are external
//! collaborators; their seams are the `AccountStore`, `RefreshStore`,
//! `SessionStore` and `AuthGateway` traits.

pub mod domain;
pub mod errors;
pub mod services;
pub mod session;
pub mod utils;
pub mod validation;
