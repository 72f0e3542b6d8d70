//! Password hashing and bearer tokens
//!
//! Passwords are stored as `pbkdf2_sha256$<iterations>$<salt-hex>$<hash-hex>`.
//! Tokens are HS256 JWTs whose subject is the user id.

use anyhow::{Context, Result};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::time::Duration;

const ALGORITHM: &str = "pbkdf2_sha256";
const SALT_LEN: usize = 16;
const HASH_LEN: usize = 32;

/// Salted PBKDF2-HMAC-SHA256 password hasher
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    iterations: u32,
}

impl PasswordHasher {
    pub fn new(iterations: u32) -> Self {
        Self {
            iterations: iterations.max(1),
        }
    }

    pub fn hash(&self, password: &str) -> String {
        let salt: [u8; SALT_LEN] = rand::random();
        let digest = derive(password, &salt, self.iterations);
        format!(
            "{}${}${}${}",
            ALGORITHM,
            self.iterations,
            hex::encode(salt),
            hex::encode(digest)
        )
    }

    /// Encoded hash no password matches, at this hasher's cost
    ///
    /// Verifying against it costs the same as verifying a real hash.
    pub fn dummy_hash(&self) -> String {
        format!(
            "{}${}${}${}",
            ALGORITHM,
            self.iterations,
            hex::encode([0u8; SALT_LEN]),
            hex::encode([0u8; HASH_LEN])
        )
    }

    /// Check `password` against an encoded hash; iterations come from the hash
    pub fn verify(&self, password: &str, encoded: &str) -> bool {
        let mut parts = encoded.split('$');
        let (Some(ALGORITHM), Some(iterations), Some(salt), Some(expected), None) = (
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
        ) else {
            return false;
        };

        let (Ok(iterations), Ok(salt), Ok(expected)) = (
            iterations.parse::<u32>(),
            hex::decode(salt),
            hex::decode(expected),
        ) else {
            return false;
        };

        let digest = derive(password, &salt, iterations);
        constant_time_eq(&digest, &expected)
    }
}

fn derive(password: &str, salt: &[u8], iterations: u32) -> [u8; HASH_LEN] {
    let mut out = [0u8; HASH_LEN];
    pbkdf2::pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut out);
    out
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: u64,
    exp: u64,
}

/// Issues and verifies bearer tokens
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    pub fn issue(&self, user_id: i32) -> Result<String> {
        let now = chrono::Utc::now().timestamp().max(0) as u64;
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now,
            exp: now + self.ttl.as_secs(),
        };
        encode(&Header::default(), &claims, &self.encoding).context("failed to sign token")
    }

    /// Returns the user id of a valid, unexpired token
    pub fn verify(&self, token: &str) -> Option<i32> {
        match decode::<Claims>(token, &self.decoding, &Validation::default()) {
            Ok(data) => data.claims.sub.parse().ok(),
            Err(e) => {
                tracing::debug!(error = %e, "rejected bearer token");
                None
            }
        }
    }
}
