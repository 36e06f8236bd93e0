//! Encryption at rest.
//!
//! Every persisted object goes through [`seal`] and comes back through
//! [`open`]: ChaCha20-Poly1305 with a random nonce prepended to the
//! ciphertext, hex-encoded so it can be tracked as a text file.
//!
//! Stores created by earlier versions sealed with AES-256-GCM in the same
//! nonce-first layout under the same key; [`decrypt`] still accepts those.

use aes_gcm::Aes256Gcm;
use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Nonce,
};
use rand::RngCore;
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{Error, Result};

pub const KEY_SIZE: usize = 32;
pub const NONCE_SIZE: usize = 12;
pub const TAG_SIZE: usize = 16;

/// Symmetric key derived from the store password.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Key([u8; KEY_SIZE]);

impl Key {
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

impl std::fmt::Debug for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Key([redacted])")
    }
}

/// SHA-256 of the password. Unsalted, so equal passwords give equal keys.
pub fn derive_key(password: &[u8]) -> Key {
    let mut hasher = Sha256::new();
    hasher.update(password);
    Key(hasher.finalize().into())
}

pub fn encrypt(plaintext: &[u8], key: &Key) -> Result<Vec<u8>> {
    let cipher = ChaCha20Poly1305::new_from_slice(key.as_bytes())
        .map_err(|e| Error::Encryption(e.to_string()))?;

    let mut nonce_bytes = [0u8; NONCE_SIZE];
    rand::thread_rng().fill_bytes(&mut nonce_bytes);

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce_bytes), plaintext)
        .map_err(|e| Error::Encryption(e.to_string()))?;

    let mut out = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    out.extend_from_slice(&nonce_bytes);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// Wrong keys, truncation and tampering all surface as [`Error::Decryption`].
pub fn decrypt(ciphertext: &[u8], key: &Key) -> Result<Vec<u8>> {
    if ciphertext.len() < NONCE_SIZE + TAG_SIZE {
        return Err(Error::Decryption);
    }

    let (nonce, body) = ciphertext.split_at(NONCE_SIZE);
    let nonce = Nonce::from_slice(nonce);

    let cipher = ChaCha20Poly1305::new_from_slice(key.as_bytes())
        .map_err(|_| Error::Decryption)?;
    if let Ok(plaintext) = cipher.decrypt(nonce, body) {
        return Ok(plaintext);
    }

    let legacy = Aes256Gcm::new_from_slice(key.as_bytes()).map_err(|_| Error::Decryption)?;
    legacy.decrypt(nonce, body).map_err(|_| Error::Decryption)
}

pub fn seal(plaintext: &[u8], key: &Key) -> Result<String> {
    Ok(hex::encode(encrypt(plaintext, key)?))
}

pub fn open(text: &str, key: &Key) -> Result<Vec<u8>> {
    let ciphertext = hex::decode(text.trim()).map_err(|e| Error::Format(e.to_string()))?;
    decrypt(&ciphertext, key)
}
