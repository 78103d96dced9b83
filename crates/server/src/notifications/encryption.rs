use aes_gcm::{
    Aes256Gcm, Nonce,
    aead::{Aead, AeadCore, KeyInit, OsRng},
};
use thiserror::Error;

const NONCE_SIZE: usize = 12; // AES-GCM standard nonce size

#[derive(Error, Debug)]
pub enum EncryptionError {
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),
    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),
    #[error("Invalid key length")]
    InvalidKeyLength,
    #[error("Invalid hex input: {0}")]
    InvalidHex(String),
}

/// Symmetric encryption for settings secrets at rest (SMTP password, AI api
/// key). Uses AES-256-GCM; ciphertexts are hex strings with the 12-byte
/// nonce prepended.
pub struct EncryptionService {
    cipher: Aes256Gcm,
}

impl EncryptionService {
    /// The 32-byte key should be loaded from configuration, never hardcoded
    /// outside of development defaults.
    pub fn new(key: &[u8]) -> Result<Self, EncryptionError> {
        Ok(Self {
            cipher: Aes256Gcm::new_from_slice(key)
                .map_err(|_| EncryptionError::InvalidKeyLength)?,
        })
    }

    pub fn encrypt_str(&self, plaintext: &str) -> Result<String, EncryptionError> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng); // must be unique per encryption
        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|e| EncryptionError::EncryptionFailed(e.to_string()))?;

        let mut result = nonce.to_vec();
        result.extend_from_slice(&ciphertext);
        Ok(hex::encode(result))
    }

    pub fn decrypt_str(&self, cipher_hex: &str) -> Result<String, EncryptionError> {
        let encrypted_data =
            hex::decode(cipher_hex).map_err(|e| EncryptionError::InvalidHex(e.to_string()))?;
        if encrypted_data.len() < NONCE_SIZE {
            return Err(EncryptionError::DecryptionFailed(
                "Invalid encrypted data: too short to contain a nonce".to_string(),
            ));
        }

        let (nonce_bytes, ciphertext) = encrypted_data.split_at(NONCE_SIZE);
        let nonce = Nonce::from_slice(nonce_bytes);

        let plaintext = self
            .cipher
            .decrypt(nonce, ciphertext)
            .map_err(|e| EncryptionError::DecryptionFailed(e.to_string()))?;

        String::from_utf8(plaintext)
            .map_err(|e| EncryptionError::DecryptionFailed(format!("Invalid UTF-8: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> EncryptionService {
        let key =
            hex::decode("000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f")
                .unwrap();
        EncryptionService::new(&key).unwrap()
    }

    #[test]
    fn encrypt_decrypt_round_trip() {
        let svc = service();
        let plain = "smtp-secret-password";

        let encrypted = svc.encrypt_str(plain).unwrap();
        assert_ne!(encrypted, plain);

        let decrypted = svc.decrypt_str(&encrypted).unwrap();
        assert_eq!(decrypted, plain);
    }

    #[test]
    fn decrypt_with_wrong_key_fails() {
        let svc = service();
        let encrypted = svc.encrypt_str("another secret").unwrap();

        let other_key =
            hex::decode("f1e1d1c1b1a191817161514131211101f0e0d0c0b0a090807060504030201000")
                .unwrap();
        let other = EncryptionService::new(&other_key).unwrap();
        assert!(other.decrypt_str(&encrypted).is_err());
    }

    #[test]
    fn invalid_key_length_is_rejected() {
        assert!(matches!(
            EncryptionService::new(&[0u8; 4]),
            Err(EncryptionError::InvalidKeyLength)
        ));
    }

    #[test]
    fn malformed_ciphertext_is_rejected() {
        let svc = service();
        assert!(matches!(
            svc.decrypt_str("not-a-hex-string"),
            Err(EncryptionError::InvalidHex(_))
        ));
        assert!(svc.decrypt_str("0011").is_err());
    }
}
