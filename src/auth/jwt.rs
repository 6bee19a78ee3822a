use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

use crate::model::role::Role;

/// Claims issued by the identity provider. Only verified here, never issued.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: Role,
    pub exp: usize,
    /// Present only if this user is linked to an employee record
    pub employee_id: Option<u64>,
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| e.to_string())
}

#[cfg(test)]
pub fn issue_token(claims: &Claims, secret: &str) -> String {
    use jsonwebtoken::{EncodingKey, Header, encode};

    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}
