use std::collections::HashMap;

use jsonwebtoken::{DecodingKey, EncodingKey};

/// HS256 key set with one active signing key.
///
/// Construction happens once at startup from validated configuration;
/// `Config` guarantees the active kid is present in the set.
#[derive(Clone)]
pub struct JwtKeyStore {
    active_kid: String,
    active_encoding: EncodingKey,
    // all accepted keys for verifying (kid -> key)
    decoding: HashMap<String, DecodingKey>,
}

impl JwtKeyStore {
    pub fn from_config(jwt_keys: &[(String, Vec<u8>)], jwt_active_kid: &str) -> Self {
        let active_secret = jwt_keys
            .iter()
            .find(|(kid, _)| kid == jwt_active_kid)
            .map(|(_, secret)| secret)
            .expect("active kid present in validated key set");

        let mut decoding = HashMap::new();
        for (kid, secret) in jwt_keys {
            decoding.insert(kid.clone(), DecodingKey::from_secret(secret));
        }

        Self {
            active_kid: jwt_active_kid.to_string(),
            active_encoding: EncodingKey::from_secret(active_secret),
            decoding,
        }
    }

    pub fn encoding_key_and_kid(&self) -> (&EncodingKey, &str) {
        (&self.active_encoding, &self.active_kid)
    }

    pub fn decoding_key_for_kid(&self, kid: Option<&str>) -> Option<&DecodingKey> {
        self.decoding.get(kid.unwrap_or(&self.active_kid))
    }
}
