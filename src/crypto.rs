use aes_gcm::{
    aead::{Aead, KeyInit, Payload},
    Aes256Gcm, Nonce,
};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};

const MAGIC: &[u8; 4] = b"CTRK";
const FORMAT_VERSION: u8 = 1;
const SALT_LEN: usize = 32;
const NONCE_LEN: usize = 12;
const KEY_LEN: usize = 32;
const HEADER_LEN: usize = MAGIC.len() + 1 + 3 * 4 + SALT_LEN + NONCE_LEN;

#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("key derivation failed")]
    KeyDerivation,
    #[error("encryption failed")]
    Encryption,
    #[error("decryption failed: wrong passphrase or corrupted data")]
    Decryption,
    #[error("not a cycle-tracker data file")]
    InvalidFormat,
    #[error("unsupported data file version {0}")]
    UnsupportedVersion(u8),
}

/// Argon2id cost parameters. They are written into every sealed blob so a
/// file always opens with the parameters it was sealed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            memory_kib: 65536,
            iterations: 3,
            parallelism: 1,
        }
    }
}

#[derive(Zeroize, ZeroizeOnDrop)]
struct DerivedKey([u8; KEY_LEN]);

impl DerivedKey {
    fn derive(passphrase: &str, salt: &[u8], kdf: KdfParams) -> Result<Self, CryptoError> {
        let params = Params::new(kdf.memory_kib, kdf.iterations, kdf.parallelism, Some(KEY_LEN))
            .map_err(|_| CryptoError::KeyDerivation)?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let mut key = DerivedKey([0u8; KEY_LEN]);
        argon2
            .hash_password_into(passphrase.as_bytes(), salt, &mut key.0)
            .map_err(|_| CryptoError::KeyDerivation)?;
        Ok(key)
    }

    fn cipher(&self) -> Result<Aes256Gcm, CryptoError> {
        Aes256Gcm::new_from_slice(&self.0).map_err(|_| CryptoError::KeyDerivation)
    }
}

/// Encrypt `plaintext` under a key derived from `passphrase`.
///
/// Layout: magic || version || kdf params (3 x u32 LE) || salt || nonce || ciphertext.
/// The whole header is authenticated as associated data.
pub fn seal(passphrase: &str, plaintext: &[u8], kdf: KdfParams) -> Result<Vec<u8>, CryptoError> {
    let mut salt = [0u8; SALT_LEN];
    let mut nonce_bytes = [0u8; NONCE_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    rand::thread_rng().fill_bytes(&mut nonce_bytes);

    let mut output = Vec::with_capacity(HEADER_LEN + plaintext.len() + 16);
    output.extend_from_slice(MAGIC);
    output.push(FORMAT_VERSION);
    output.extend_from_slice(&kdf.memory_kib.to_le_bytes());
    output.extend_from_slice(&kdf.iterations.to_le_bytes());
    output.extend_from_slice(&kdf.parallelism.to_le_bytes());
    output.extend_from_slice(&salt);
    output.extend_from_slice(&nonce_bytes);

    let key = DerivedKey::derive(passphrase, &salt, kdf)?;
    let ciphertext = key
        .cipher()?
        .encrypt(
            Nonce::from_slice(&nonce_bytes),
            Payload {
                msg: plaintext,
                aad: &output,
            },
        )
        .map_err(|_| CryptoError::Encryption)?;

    output.extend_from_slice(&ciphertext);
    Ok(output)
}

/// Decrypt a blob produced by [`seal`].
pub fn open(passphrase: &str, sealed: &[u8]) -> Result<Vec<u8>, CryptoError> {
    if sealed.len() < HEADER_LEN || &sealed[..MAGIC.len()] != MAGIC {
        return Err(CryptoError::InvalidFormat);
    }
    let version = sealed[MAGIC.len()];
    if version != FORMAT_VERSION {
        return Err(CryptoError::UnsupportedVersion(version));
    }

    let (header, ciphertext) = sealed.split_at(HEADER_LEN);
    let mut fields = header[MAGIC.len() + 1..].chunks_exact(4);
    let mut next_u32 = || {
        fields
            .next()
            .and_then(|b| b.try_into().ok())
            .map(u32::from_le_bytes)
            .ok_or(CryptoError::InvalidFormat)
    };
    let kdf = KdfParams {
        memory_kib: next_u32()?,
        iterations: next_u32()?,
        parallelism: next_u32()?,
    };
    let salt_start = MAGIC.len() + 1 + 12;
    let salt = &header[salt_start..salt_start + SALT_LEN];
    let nonce_bytes = &header[salt_start + SALT_LEN..];

    let key = DerivedKey::derive(passphrase, salt, kdf)?;
    key.cipher()?
        .decrypt(
            Nonce::from_slice(nonce_bytes),
            Payload {
                msg: ciphertext,
                aad: header,
            },
        )
        .map_err(|_| CryptoError::Decryption)
}

#[cfg(test)]
pub(crate) const TEST_KDF: KdfParams = KdfParams {
    memory_kib: 64,
    iterations: 1,
    parallelism: 1,
};
