use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

#[cfg(not(test))]
pub const PBKDF2_ITERATIONS: u32 = 600_000;
#[cfg(test)]
pub const PBKDF2_ITERATIONS: u32 = 1_000;

pub const HASH_LENGTH: usize = 32;
pub const SALT_LENGTH: usize = 16;

/// Derived password hash, zeroed on drop
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct PasswordHash {
    bytes: [u8; HASH_LENGTH],
}

impl PasswordHash {
    /// Derive from password + salt using PBKDF2-SHA256
    pub fn derive(password: &str, salt: &[u8]) -> Self {
        let mut bytes = [0u8; HASH_LENGTH];
        pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, PBKDF2_ITERATIONS, &mut bytes);
        Self { bytes }
    }

    pub fn encode(&self) -> String {
        STANDARD.encode(self.bytes)
    }

    /// Constant-time comparison against a stored encoded hash.
    pub fn matches(&self, stored: &str) -> bool {
        match STANDARD.decode(stored) {
            Ok(mut expected) => {
                let equal = expected.len() == HASH_LENGTH && bool::from(self.bytes.ct_eq(&expected[..]));
                expected.zeroize();
                equal
            }
            Err(_) => false,
        }
    }
}

/// Hash a new password. Returns `(hash, salt)`, both base64.
pub fn hash_password(password: &str) -> (String, String) {
    let salt = generate_salt();
    let hash = PasswordHash::derive(password, &salt);
    (hash.encode(), STANDARD.encode(salt))
}

/// Check a password against stored `(hash, salt)`. Malformed material never verifies.
pub fn verify_password(password: &str, stored_hash: &str, stored_salt: &str) -> bool {
    match STANDARD.decode(stored_salt) {
        Ok(salt) => PasswordHash::derive(password, &salt).matches(stored_hash),
        Err(_) => false,
    }
}

/// Generate a cryptographically random salt
pub fn generate_salt() -> [u8; SALT_LENGTH] {
    use rand::RngCore;
    let mut salt = [0u8; SALT_LENGTH];
    rand::thread_rng().fill_bytes(&mut salt);
    salt
}
