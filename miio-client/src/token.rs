//! Device token and the AES-128-CBC cipher derived from it

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use md5::{Digest, Md5};

use crate::error::MiioError;

type Aes128CbcEnc = cbc::Encryptor<aes::Aes128>;
type Aes128CbcDec = cbc::Decryptor<aes::Aes128>;

/// 16-byte shared secret of a miIO device.
///
/// The payload key is `MD5(token)` and the IV is `MD5(key || token)`.
#[derive(Clone, PartialEq, Eq)]
pub struct Token {
    bytes: [u8; 16],
    key: [u8; 16],
    iv: [u8; 16],
}

impl Token {
    /// Parse a token from its 32-character hexadecimal form
    pub fn from_hex(hex: &str) -> Result<Self, MiioError> {
        let hex = hex.trim();
        if hex.len() != 32 {
            return Err(MiioError::InvalidToken(format!(
                "expected 32 hex characters, got {}",
                hex.len()
            )));
        }
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(MiioError::InvalidToken("token is not hexadecimal".to_string()));
        }

        let mut bytes = [0u8; 16];
        for (i, byte) in bytes.iter_mut().enumerate() {
            let pair = &hex[i * 2..i * 2 + 2];
            *byte = u8::from_str_radix(pair, 16)
                .map_err(|_| MiioError::InvalidToken(format!("'{}' is not hexadecimal", pair)))?;
        }

        Ok(Self::from_bytes(bytes))
    }

    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        let key = md5(&[&bytes[..]]);
        let iv = md5(&[&key[..], &bytes[..]]);
        Self { bytes, key, iv }
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.bytes
    }

    pub(crate) fn encrypt(&self, plaintext: &[u8]) -> Vec<u8> {
        Aes128CbcEnc::new(&self.key.into(), &self.iv.into())
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext)
    }

    pub(crate) fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, MiioError> {
        Aes128CbcDec::new(&self.key.into(), &self.iv.into())
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
            .map_err(|e| MiioError::Crypto(e.to_string()))
    }
}

// Never print the secret.
impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Token(***)")
    }
}

pub(crate) fn md5(parts: &[&[u8]]) -> [u8; 16] {
    let mut hasher = Md5::new();
    for part in parts {
        hasher.update(part);
    }
    let mut out = [0u8; 16];
    out.copy_from_slice(&hasher.finalize());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOKEN: &str = "00112233445566778899aabbccddeeff";

    #[test]
    fn test_parse_token() {
        let token = Token::from_hex(TOKEN).unwrap();
        assert_eq!(token.as_bytes()[0], 0x00);
        assert_eq!(token.as_bytes()[1], 0x11);
        assert_eq!(token.as_bytes()[15], 0xff);
    }

    #[test]
    fn test_parse_token_uppercase_and_whitespace() {
        let lower = Token::from_hex(TOKEN).unwrap();
        let upper = Token::from_hex(&format!("  {}\n", TOKEN.to_uppercase())).unwrap();
        assert_eq!(lower, upper);
    }

    #[test]
    fn test_parse_token_wrong_length() {
        match Token::from_hex("abcd") {
            Err(MiioError::InvalidToken(msg)) => assert!(msg.contains("32 hex characters")),
            other => panic!("Expected InvalidToken, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_token_not_hex() {
        let bad = "zz112233445566778899aabbccddeeff";
        assert!(matches!(Token::from_hex(bad), Err(MiioError::InvalidToken(_))));
    }

    #[test]
    fn test_key_derivation() {
        let token = Token::from_hex(TOKEN).unwrap();
        assert_eq!(token.key, md5(&[&token.as_bytes()[..]]));
        assert_eq!(token.iv, md5(&[&token.key[..], &token.as_bytes()[..]]));
        assert_ne!(token.key, token.iv);
    }

    #[test]
    fn test_ciphertext_is_block_aligned() {
        let token = Token::from_hex(TOKEN).unwrap();
        let plaintext = br#"{"id":1,"method":"miIO.info","params":[]}"#;

        let ciphertext = token.encrypt(plaintext);
        assert_eq!(ciphertext.len() % 16, 0);
        assert!(ciphertext.len() > plaintext.len());
        assert_eq!(token.decrypt(&ciphertext).unwrap(), plaintext.to_vec());
    }

    #[test]
    fn test_decrypt_with_wrong_token_fails() {
        let token = Token::from_hex(TOKEN).unwrap();
        let other = Token::from_hex("ffeeddccbbaa99887766554433221100").unwrap();
        let ciphertext = token.encrypt(b"{\"id\":7}");

        match other.decrypt(&ciphertext) {
            Err(MiioError::Crypto(_)) => {}
            Ok(plaintext) => assert_ne!(plaintext, b"{\"id\":7}".to_vec()),
            Err(e) => panic!("Unexpected error: {:?}", e),
        }
    }

    #[test]
    fn test_debug_hides_secret() {
        let token = Token::from_hex(TOKEN).unwrap();
        assert_eq!(format!("{:?}", token), "Token(***)");
    }
}
