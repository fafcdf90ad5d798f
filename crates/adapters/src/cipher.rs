// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The seam `Connection.encrypted_config` bytes pass through. Concrete ciphers
//! plug in here; the core never inspects the bytes itself (see §6 of the design).

use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key};

use crate::error::BackendError;

pub trait ConfigCipher: Send + Sync {
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, BackendError>;
    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, BackendError>;
}

/// Identity "cipher" used when no `ENCRYPTION_KEY` is configured. Explicitly
/// insecure; callers must have already logged the startup warning (see
/// `syncd-daemon::config`) before wiring this in.
pub struct PlaintextCipher;

impl ConfigCipher for PlaintextCipher {
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, BackendError> {
        Ok(plaintext.to_vec())
    }

    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, BackendError> {
        Ok(ciphertext.to_vec())
    }
}

/// AES-256-GCM, keyed by the 32-byte `ENCRYPTION_KEY` secret. Output is
/// `nonce || ciphertext`; the nonce is generated fresh per call and never
/// reused, so encrypting the same plaintext twice yields different bytes.
pub struct AesGcmCipher {
    cipher: Aes256Gcm,
}

const NONCE_LEN: usize = 12;

impl AesGcmCipher {
    pub fn new(key: &[u8; 32]) -> Self {
        Self { cipher: Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key)) }
    }
}

impl ConfigCipher for AesGcmCipher {
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, BackendError> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let mut ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext)
            .map_err(|e| BackendError::Other(format!("encryption failed: {e}")))?;
        let mut out = nonce.to_vec();
        out.append(&mut ciphertext);
        Ok(out)
    }

    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, BackendError> {
        if ciphertext.len() < NONCE_LEN {
            return Err(BackendError::InvalidInput("ciphertext shorter than nonce".to_string()));
        }
        let (nonce, body) = ciphertext.split_at(NONCE_LEN);
        self.cipher.decrypt(nonce.into(), body).map_err(|e| BackendError::Other(format!("decryption failed: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plaintext_cipher_round_trips() {
        let cipher = PlaintextCipher;
        let data = b"super secret".to_vec();
        let enc = cipher.encrypt(&data).unwrap();
        assert_eq!(enc, data);
        let dec = cipher.decrypt(&enc).unwrap();
        assert_eq!(dec, data);
    }

    #[test]
    fn aes_gcm_cipher_round_trips() {
        let cipher = AesGcmCipher::new(&[7u8; 32]);
        let data = b"super secret".to_vec();
        let enc = cipher.encrypt(&data).unwrap();
        assert_ne!(enc, data);
        let dec = cipher.decrypt(&enc).unwrap();
        assert_eq!(dec, data);
    }

    #[test]
    fn aes_gcm_cipher_produces_distinct_ciphertexts() {
        let cipher = AesGcmCipher::new(&[7u8; 32]);
        let data = b"super secret".to_vec();
        let a = cipher.encrypt(&data).unwrap();
        let b = cipher.encrypt(&data).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn aes_gcm_cipher_rejects_tampered_ciphertext() {
        let cipher = AesGcmCipher::new(&[7u8; 32]);
        let mut enc = cipher.encrypt(b"super secret").unwrap();
        let last = enc.len() - 1;
        enc[last] ^= 0xFF;
        assert!(cipher.decrypt(&enc).is_err());
    }

    #[test]
    fn aes_gcm_cipher_rejects_wrong_key() {
        let encrypted = AesGcmCipher::new(&[7u8; 32]).encrypt(b"super secret").unwrap();
        let wrong = AesGcmCipher::new(&[9u8; 32]);
        assert!(wrong.decrypt(&encrypted).is_err());
    }
}
