// Envelope encryption for admin video-platform secrets at rest.
//
// Each sealed value gets its own random data key (DEK); the DEK is wrapped by
// a versioned key-encryption key (KEK) from SECRETS_ENCRYPTION_KEY. Older KEKs
// listed in SECRETS_ENCRYPTION_KEY_PREVIOUS stay usable for opening, so keys
// can be rotated without a bulk rewrite.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use anyhow::{anyhow, bail, Context, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

const NONCE_SIZE: usize = 12;
const KEY_SIZE: usize = 32;
const PAYLOAD_VERSION: u8 = 1;
const ALGORITHM: &str = "AES-256-GCM";

/// Sealed secret as stored in the `ot_secret` column
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SealedSecret {
    pub version: u8,
    pub alg: String,
    /// KEK that wrapped the DEK
    pub key_id: String,
    /// base64(nonce || wrapped DEK)
    pub dek_wrapped: String,
    /// base64 nonce for the data
    pub nonce: String,
    /// base64 ciphertext including the auth tag
    pub ciphertext: String,
}

impl SealedSecret {
    fn parse(data: &[u8]) -> Result<Self> {
        let sealed: SealedSecret =
            serde_json::from_slice(data).context("Stored secret is not a sealed payload")?;
        if sealed.version != PAYLOAD_VERSION {
            bail!("Unsupported sealed secret version: {}", sealed.version);
        }
        if sealed.alg != ALGORITHM {
            bail!("Unsupported sealed secret algorithm: {}", sealed.alg);
        }
        Ok(sealed)
    }
}

/// True if the stored bytes look like a sealed payload rather than plaintext
pub fn is_sealed(data: &[u8]) -> bool {
    SealedSecret::parse(data).is_ok()
}

fn random_bytes<const N: usize>() -> [u8; N] {
    let mut bytes = [0u8; N];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes
}

fn cipher_from(bytes: &[u8]) -> Result<Aes256Gcm> {
    Aes256Gcm::new_from_slice(bytes).map_err(|e| anyhow!("Invalid AES-256 key: {}", e))
}

/// Seals and opens admin secrets. Cheap to clone.
#[derive(Clone)]
pub struct EncryptionService {
    primary_id: Arc<str>,
    keys: Arc<HashMap<String, Aes256Gcm>>,
}

impl std::fmt::Debug for EncryptionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptionService")
            .field("primary_id", &self.primary_id)
            .field("key_count", &self.keys.len())
            .finish()
    }
}

impl EncryptionService {
    /// Build from `key_id:base64_key` strings; the first one seals new values
    pub fn new(primary_key: &str, previous_keys: &[&str]) -> Result<Self> {
        let (primary_id, primary_cipher) = Self::parse_versioned_key(primary_key)?;

        let mut keys = HashMap::new();
        keys.insert(primary_id.clone(), primary_cipher);
        for key_str in previous_keys {
            let (id, cipher) = Self::parse_versioned_key(key_str)?;
            if keys.insert(id.clone(), cipher).is_some() {
                bail!("Duplicate key ID: {}", id);
            }
        }

        Ok(Self {
            primary_id: primary_id.into(),
            keys: Arc::new(keys),
        })
    }

    fn parse_versioned_key(key_str: &str) -> Result<(String, Aes256Gcm)> {
        let Some((key_id, encoded)) = key_str.split_once(':') else {
            bail!("Invalid key format, expected 'key_id:base64_key'");
        };
        let key_bytes = BASE64
            .decode(encoded)
            .with_context(|| format!("Key '{}' is not valid base64", key_id))?;
        if key_bytes.len() != KEY_SIZE {
            bail!(
                "Key '{}' must be {} bytes, got {}",
                key_id,
                KEY_SIZE,
                key_bytes.len()
            );
        }
        Ok((key_id.to_string(), cipher_from(&key_bytes)?))
    }

    pub fn primary_key_id(&self) -> &str {
        &self.primary_id
    }

    /// Seal a secret for storage
    pub fn seal(&self, secret: &str) -> Result<Vec<u8>> {
        let kek = self
            .keys
            .get(self.primary_id.as_ref())
            .ok_or_else(|| anyhow!("Primary key missing"))?;

        let dek = random_bytes::<KEY_SIZE>();
        let dek_nonce = random_bytes::<NONCE_SIZE>();
        let wrapped = kek
            .encrypt(Nonce::from_slice(&dek_nonce), dek.as_ref())
            .map_err(|e| anyhow!("Failed to wrap data key: {}", e))?;

        let data_nonce = random_bytes::<NONCE_SIZE>();
        let ciphertext = cipher_from(&dek)?
            .encrypt(Nonce::from_slice(&data_nonce), secret.as_bytes())
            .map_err(|e| anyhow!("Encryption failed: {}", e))?;

        let sealed = SealedSecret {
            version: PAYLOAD_VERSION,
            alg: ALGORITHM.to_string(),
            key_id: self.primary_id.to_string(),
            dek_wrapped: BASE64.encode([dek_nonce.as_slice(), wrapped.as_slice()].concat()),
            nonce: BASE64.encode(data_nonce),
            ciphertext: BASE64.encode(ciphertext),
        };
        serde_json::to_vec(&sealed).context("Failed to serialize sealed secret")
    }

    /// Open a sealed secret with whichever configured key sealed it
    pub fn open(&self, data: &[u8]) -> Result<String> {
        let sealed = SealedSecret::parse(data)?;
        let kek = self
            .keys
            .get(&sealed.key_id)
            .ok_or_else(|| anyhow!("Unknown key_id '{}'", sealed.key_id))?;

        let dek_wrapped = BASE64
            .decode(&sealed.dek_wrapped)
            .context("Failed to decode wrapped data key")?;
        if dek_wrapped.len() < NONCE_SIZE {
            bail!("Wrapped data key too short");
        }
        let (dek_nonce, wrapped) = dek_wrapped.split_at(NONCE_SIZE);
        let dek = kek
            .decrypt(Nonce::from_slice(dek_nonce), wrapped)
            .map_err(|e| anyhow!("Failed to unwrap data key: {}", e))?;

        let data_nonce = BASE64.decode(&sealed.nonce).context("Failed to decode nonce")?;
        if data_nonce.len() != NONCE_SIZE {
            bail!("Invalid nonce length");
        }
        let ciphertext = BASE64
            .decode(&sealed.ciphertext)
            .context("Failed to decode ciphertext")?;
        let plaintext = cipher_from(&dek)?
            .decrypt(Nonce::from_slice(&data_nonce), ciphertext.as_ref())
            .map_err(|e| anyhow!("Decryption failed (data may be corrupted): {}", e))?;

        String::from_utf8(plaintext).context("Decrypted secret is not valid UTF-8")
    }
}

/// Generate a new random key in `key_id:base64_key` format
pub fn generate_encryption_key(key_id: &str) -> String {
    format!("{}:{}", key_id, BASE64.encode(random_bytes::<KEY_SIZE>()))
}
