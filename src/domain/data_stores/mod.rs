pub mod account_store;
pub mod account_store_err;
pub mod jwt_key_store;
pub mod refresh_err;
pub mod refresh_record;
pub mod refresh_store;

pub use account_store::AccountStore;
pub use account_store_err::AccountStoreError;
pub use jwt_key_store::JwtKeyStore;
pub use refresh_err::RefreshError;
pub use refresh_record::RefreshRecord;
pub use refresh_store::{hash_refresh, RefreshStore};
