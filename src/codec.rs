//! 快照令牌编解码
//!
//! 明文字节与固定密钥逐字节异或（密钥循环使用），再用标准 Base64 转成可放进
//! 链接的文本。这只是混淆：密钥随程序一起分发，拿到源码的人可以直接解出棋盘，
//! 不提供任何保密性。

use base64::{Engine as _, engine::general_purpose::STANDARD};

/// 共享密钥
pub const SECRET_KEY: &[u8] = b"AGENT33";

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("令牌为空")]
    Empty,
    #[error("令牌不是有效的 Base64: {0}")]
    InvalidEncoding(#[from] base64::DecodeError),
    #[error("解码后的内容不是有效的 UTF-8")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}

/// 循环密钥异或，加密与解密是同一个操作
fn xor_with_key(bytes: &mut [u8]) {
    for (i, byte) in bytes.iter_mut().enumerate() {
        *byte ^= SECRET_KEY[i % SECRET_KEY.len()];
    }
}

pub fn encode(plaintext: &str) -> String {
    let mut bytes = plaintext.as_bytes().to_vec();
    xor_with_key(&mut bytes);
    STANDARD.encode(bytes)
}

pub fn decode(token: &str) -> Result<String, DecodeError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(DecodeError::Empty);
    }
    let mut bytes = STANDARD.decode(token)?;
    xor_with_key(&mut bytes);
    Ok(String::from_utf8(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn token_is_not_plaintext() {
        let token = encode(r#"{"turn":"blue"}"#);
        assert!(!token.contains("blue"));
        assert_eq!(decode(&token).unwrap(), r#"{"turn":"blue"}"#);
    }

    #[test]
    fn key_repeats_past_its_length() {
        // 密钥长度为 7，第 0 和第 7 个字节使用同一个密钥字节
        let token = encode("aaaaaaaa");
        let raw = STANDARD.decode(&token).unwrap();
        assert_eq!(raw[0], raw[7]);
        assert_eq!(raw[0], b'a' ^ b'A');
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(matches!(decode("%%% not base64"), Err(DecodeError::InvalidEncoding(_))));
        assert!(matches!(decode("   "), Err(DecodeError::Empty)));
    }

    #[test]
    fn non_utf8_payload_is_rejected() {
        let mut bytes = vec![0xff, 0xfe, 0xfd];
        xor_with_key(&mut bytes);
        let token = STANDARD.encode(bytes);
        assert!(matches!(decode(&token), Err(DecodeError::InvalidUtf8(_))));
    }

    proptest! {
        #[test]
        fn decode_inverts_encode(text in "\\PC{1,200}") {
            prop_assert_eq!(decode(&encode(&text)).unwrap(), text);
        }
    }
}
