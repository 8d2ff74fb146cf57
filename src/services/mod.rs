pub mod hashmap_account_store;
pub mod hashset_refresh_store;
pub mod password;
pub mod token_codec;
pub mod token_service;

pub use hashmap_account_store::*;
pub use hashset_refresh_store::*;
pub use token_codec::*;
pub use token_service::*;
