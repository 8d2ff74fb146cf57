mod codec;
mod impersonation;
mod login;
mod session;

pub use codec::*;
pub use impersonation::*;
pub use login::*;
pub use session::*;
