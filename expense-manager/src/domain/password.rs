//! Salted PBKDF2-HMAC-SHA256 password credentials.
//!
//! Stored form: `pbkdf2-sha256$<iterations>$<salt-hex>$<digest-hex>`. The
//! iteration count travels with the credential, so raising the configured
//! cost only affects newly hashed passwords.

use rand::RngCore;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

const SCHEME: &str = "pbkdf2-sha256";
const SALT_LEN: usize = 16;
const DIGEST_LEN: usize = 32;
const BLOCK_SIZE: usize = 64;

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

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    pub fn hash(&self, password: &str) -> String {
        let mut salt = [0u8; SALT_LEN];
        rand::thread_rng().fill_bytes(&mut salt);
        let digest = pbkdf2_sha256(password.as_bytes(), &salt, self.iterations);
        format!(
            "{SCHEME}${}${}${}",
            self.iterations,
            hex::encode(salt),
            hex::encode(digest)
        )
    }

    /// A malformed stored credential never verifies.
    pub fn verify(&self, password: &str, stored: &str) -> bool {
        let Some(credential) = StoredCredential::parse(stored) else {
            return false;
        };
        let computed = pbkdf2_sha256(password.as_bytes(), &credential.salt, credential.iterations);
        computed.ct_eq(&credential.digest).into()
    }
}

struct StoredCredential {
    iterations: u32,
    salt: Vec<u8>,
    digest: [u8; DIGEST_LEN],
}

impl StoredCredential {
    fn parse(stored: &str) -> Option<Self> {
        let mut parts = stored.split('$');
        if parts.next()? != SCHEME {
            return None;
        }
        let iterations: u32 = parts.next()?.parse().ok().filter(|n| *n > 0)?;
        let salt = hex::decode(parts.next()?).ok()?;
        let digest: [u8; DIGEST_LEN] = hex::decode(parts.next()?).ok()?.try_into().ok()?;
        if parts.next().is_some() || salt.is_empty() {
            return None;
        }
        Some(Self {
            iterations,
            salt,
            digest,
        })
    }
}

/// PBKDF2 with a single output block, since the derived key is one SHA-256 digest long.
fn pbkdf2_sha256(password: &[u8], salt: &[u8], iterations: u32) -> [u8; DIGEST_LEN] {
    let key = HmacKey::new(password);

    let mut first = salt.to_vec();
    first.extend_from_slice(&1u32.to_be_bytes());

    let mut u = key.sign(&first);
    let mut output = u;
    for _ in 1..iterations {
        u = key.sign(&u);
        for (out, byte) in output.iter_mut().zip(u.iter()) {
            *out ^= byte;
        }
    }
    output
}

/// HMAC-SHA256 with the padded key already absorbed into both hash states.
struct HmacKey {
    inner: Sha256,
    outer: Sha256,
}

impl HmacKey {
    fn new(key: &[u8]) -> Self {
        let mut padded = [0u8; BLOCK_SIZE];
        if key.len() > BLOCK_SIZE {
            padded[..DIGEST_LEN].copy_from_slice(&Sha256::digest(key));
        } else {
            padded[..key.len()].copy_from_slice(key);
        }

        let mut inner = Sha256::new();
        inner.update(padded.map(|b| b ^ 0x36));
        let mut outer = Sha256::new();
        outer.update(padded.map(|b| b ^ 0x5c));
        Self { inner, outer }
    }

    fn sign(&self, data: &[u8]) -> [u8; DIGEST_LEN] {
        let mut inner = self.inner.clone();
        inner.update(data);
        let mut outer = self.outer.clone();
        outer.update(inner.finalize());
        let mut mac = [0u8; DIGEST_LEN];
        mac.copy_from_slice(&outer.finalize());
        mac
    }
}
