use crate::error::app_error::AppError;
use aes_gcm::{
    Aes256Gcm, Nonce,
    aead::{Aead, AeadCore, KeyInit, OsRng},
};
use base64::{Engine as _, engine::general_purpose};

const NONCE_LEN: usize = 12;

/// AES-256-GCM cipher for refresh tokens at rest. The nonce is prepended
/// to the ciphertext so a single base64 column holds everything.
#[derive(Clone)]
pub struct TokenCipher {
    cipher: Aes256Gcm,
}

impl TokenCipher {
    /// Build from a base64-encoded 32-byte key.
    pub fn from_base64_key(key_base64: &str) -> Result<Self, AppError> {
        let key_bytes = general_purpose::STANDARD
            .decode(key_base64)
            .map_err(|_| AppError::crypto("Token key is not valid base64"))?;

        let key: [u8; 32] = key_bytes
            .try_into()
            .map_err(|_| AppError::crypto("Token key must decode to exactly 32 bytes"))?;

        Ok(Self {
            cipher: Aes256Gcm::new(&key.into()),
        })
    }

    pub fn encrypt(&self, plaintext: &str) -> Result<String, AppError> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|_| AppError::crypto("Token encryption failed"))?;

        let mut combined = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        combined.extend_from_slice(nonce.as_slice());
        combined.extend_from_slice(&ciphertext);

        Ok(general_purpose::STANDARD.encode(combined))
    }

    pub fn decrypt(&self, encoded: &str) -> Result<String, AppError> {
        let combined = general_purpose::STANDARD
            .decode(encoded)
            .map_err(|_| AppError::crypto("Stored token is not valid base64"))?;

        if combined.len() <= NONCE_LEN {
            return Err(AppError::crypto("Stored token is too short"));
        }

        let (nonce_bytes, ciphertext) = combined.split_at(NONCE_LEN);
        let nonce = Nonce::from_slice(nonce_bytes);

        let plaintext = self
            .cipher
            .decrypt(nonce, ciphertext)
            .map_err(|_| AppError::crypto("Token decryption failed"))?;

        String::from_utf8(plaintext).map_err(|_| AppError::crypto("Decrypted token is not valid UTF-8"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_cipher() -> TokenCipher {
        let key = general_purpose::STANDARD.encode([7u8; 32]);
        TokenCipher::from_base64_key(&key).unwrap()
    }

    #[test]
    fn encrypt_decrypt_round_trip() {
        let cipher = test_cipher();
        let token = "1//0gRefreshTokenValue";
        let encrypted = cipher.encrypt(token).unwrap();
        assert_ne!(encrypted, token);
        assert_eq!(cipher.decrypt(&encrypted).unwrap(), token);
    }

    #[test]
    fn encryption_is_nondeterministic() {
        let cipher = test_cipher();
        let a = cipher.encrypt("same-token").unwrap();
        let b = cipher.encrypt("same-token").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn rejects_bad_key_material() {
        assert!(TokenCipher::from_base64_key("not base64!!!").is_err());
        let short = general_purpose::STANDARD.encode([1u8; 16]);
        assert!(TokenCipher::from_base64_key(&short).is_err());
    }

    #[test]
    fn rejects_truncated_ciphertext() {
        let cipher = test_cipher();
        let truncated = general_purpose::STANDARD.encode([0u8; 8]);
        assert!(cipher.decrypt(&truncated).is_err());
    }

    #[test]
    fn rejects_tampered_ciphertext() {
        let cipher = test_cipher();
        let encrypted = cipher.encrypt("secret").unwrap();
        let mut bytes = general_purpose::STANDARD.decode(&encrypted).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xff;
        let tampered = general_purpose::STANDARD.encode(bytes);
        assert!(cipher.decrypt(&tampered).is_err());
    }
}
