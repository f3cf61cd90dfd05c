//! Byte/text conversion for the encodings accepted by the file accessors.

use std::fmt;
use std::str::FromStr;

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::engine::general_purpose;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::error::EncodingError;

const LENIENT: GeneralPurposeConfig =
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent);
const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, LENIENT);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    Ascii,
    #[default]
    #[serde(alias = "utf-8")]
    Utf8,
    #[serde(alias = "utf-16le", alias = "ucs2", alias = "ucs-2")]
    Utf16Le,
    Base64,
    Base64Url,
    #[serde(alias = "binary")]
    Latin1,
    Hex,
}

impl Encoding {
    pub fn name(self) -> &'static str {
        match self {
            Encoding::Ascii => "ascii",
            Encoding::Utf8 => "utf8",
            Encoding::Utf16Le => "utf16le",
            Encoding::Base64 => "base64",
            Encoding::Base64Url => "base64url",
            Encoding::Latin1 => "latin1",
            Encoding::Hex => "hex",
        }
    }

    /// Converts text into the bytes that end up on disk.
    ///
    /// `latin1` and `ascii` keep the low 8 bits of each UTF-16 code unit, so
    /// characters above U+00FF are truncated rather than rejected. `hex`,
    /// `base64` and `base64url` interpret the text as an encoded payload.
    pub fn encode(self, text: &str) -> Result<Vec<u8>, EncodingError> {
        let bytes = match self {
            Encoding::Utf8 => text.as_bytes().to_vec(),
            Encoding::Utf16Le => text.encode_utf16().flat_map(u16::to_le_bytes).collect(),
            Encoding::Latin1 | Encoding::Ascii => text.encode_utf16().map(|u| u as u8).collect(),
            Encoding::Hex => hex::decode(text)?,
            Encoding::Base64 | Encoding::Base64Url => decode_base64(text)?,
        };
        Ok(bytes)
    }

    /// Converts bytes read from disk into text.
    pub fn decode(self, bytes: Vec<u8>) -> Result<String, EncodingError> {
        let text = match self {
            Encoding::Utf8 => String::from_utf8(bytes)?,
            Encoding::Utf16Le => {
                let units = bytes
                    .chunks_exact(2)
                    .map(|pair| u16::from_le_bytes([pair[0], pair[1]]));
                char::decode_utf16(units)
                    .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
                    .collect()
            }
            Encoding::Latin1 => bytes.iter().map(|&b| b as char).collect(),
            Encoding::Ascii => bytes.iter().map(|&b| (b & 0x7f) as char).collect(),
            Encoding::Hex => hex::encode(bytes),
            Encoding::Base64 => general_purpose::STANDARD.encode(bytes),
            Encoding::Base64Url => general_purpose::URL_SAFE_NO_PAD.encode(bytes),
        };
        Ok(text)
    }
}

// URL-safe characters are folded into the standard alphabet, so both
// alphabets may be mixed in one payload. Padding is optional and whitespace
// is ignored.
fn decode_base64(text: &str) -> Result<Vec<u8>, EncodingError> {
    let normalized: String = text
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            other => other,
        })
        .collect();
    Ok(STANDARD_LENIENT.decode(normalized)?)
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Encoding {
    type Err = EncodingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ascii" => Ok(Encoding::Ascii),
            "utf8" | "utf-8" => Ok(Encoding::Utf8),
            "utf16le" | "utf-16le" | "ucs2" | "ucs-2" => Ok(Encoding::Utf16Le),
            "base64" => Ok(Encoding::Base64),
            "base64url" => Ok(Encoding::Base64Url),
            "latin1" | "binary" => Ok(Encoding::Latin1),
            "hex" => Ok(Encoding::Hex),
            _ => Err(EncodingError::Unknown(s.to_string())),
        }
    }
}

/// Data handed to a write or append: text goes through an [`Encoding`],
/// raw bytes are written unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Text(String),
    Bytes(Vec<u8>),
}

impl Content {
    pub fn into_bytes(self, encoding: Encoding) -> Result<Vec<u8>, EncodingError> {
        match self {
            Content::Text(text) => encoding.encode(&text),
            Content::Bytes(bytes) => Ok(bytes),
        }
    }
}

impl From<&str> for Content {
    fn from(text: &str) -> Self {
        Content::Text(text.to_string())
    }
}

impl From<String> for Content {
    fn from(text: String) -> Self {
        Content::Text(text)
    }
}

impl From<&String> for Content {
    fn from(text: &String) -> Self {
        Content::Text(text.clone())
    }
}

impl From<&[u8]> for Content {
    fn from(bytes: &[u8]) -> Self {
        Content::Bytes(bytes.to_vec())
    }
}

impl From<Vec<u8>> for Content {
    fn from(bytes: Vec<u8>) -> Self {
        Content::Bytes(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_names_and_aliases() {
        let cases = [
            ("ascii", Encoding::Ascii),
            ("utf8", Encoding::Utf8),
            ("UTF-8", Encoding::Utf8),
            ("utf16le", Encoding::Utf16Le),
            ("ucs2", Encoding::Utf16Le),
            ("ucs-2", Encoding::Utf16Le),
            ("base64", Encoding::Base64),
            ("base64url", Encoding::Base64Url),
            ("latin1", Encoding::Latin1),
            ("binary", Encoding::Latin1),
            ("Hex", Encoding::Hex),
        ];
        for (name, expected) in cases {
            assert_eq!(name.parse::<Encoding>().unwrap(), expected, "{name}");
        }
        assert!(matches!(
            "ebcdic".parse::<Encoding>(),
            Err(EncodingError::Unknown(name)) if name == "ebcdic"
        ));
    }

    #[test]
    fn test_serde_uses_lowercase_names() {
        let parsed: Encoding = serde_json::from_str("\"utf-8\"").unwrap();
        assert_eq!(parsed, Encoding::Utf8);
        let parsed: Encoding = serde_json::from_str("\"ucs2\"").unwrap();
        assert_eq!(parsed, Encoding::Utf16Le);
        assert_eq!(
            serde_json::to_string(&Encoding::Base64Url).unwrap(),
            "\"base64url\""
        );
    }

    #[test]
    fn test_utf16le_layout() {
        assert_eq!(Encoding::Utf16Le.encode("hé").unwrap(), vec![0x68, 0, 0xe9, 0]);
        // trailing odd byte is dropped
        assert_eq!(Encoding::Utf16Le.decode(vec![0x68, 0, 0x69]).unwrap(), "h");
    }

    #[test]
    fn test_latin1_and_ascii_truncate() {
        assert_eq!(Encoding::Latin1.encode("é€").unwrap(), vec![0xe9, 0xac]);
        assert_eq!(Encoding::Latin1.decode(vec![0xe9]).unwrap(), "é");
        assert_eq!(Encoding::Ascii.decode(vec![0xc1]).unwrap(), "A");
    }

    #[test]
    fn test_hex_and_base64_payloads() {
        assert_eq!(Encoding::Hex.encode("68690a").unwrap(), b"hi\n".to_vec());
        assert_eq!(Encoding::Hex.decode(b"hi\n".to_vec()).unwrap(), "68690a");
        assert!(matches!(
            Encoding::Hex.encode("zz"),
            Err(EncodingError::InvalidHex(_))
        ));

        assert_eq!(Encoding::Base64.decode(vec![0xfb, 0xff]).unwrap(), "+/8=");
        assert_eq!(Encoding::Base64Url.decode(vec![0xfb, 0xff]).unwrap(), "-_8");
        assert_eq!(Encoding::Base64.encode("-_8").unwrap(), vec![0xfb, 0xff]);
        assert_eq!(Encoding::Base64Url.encode("+/8=").unwrap(), vec![0xfb, 0xff]);
        assert_eq!(Encoding::Base64.encode("aGVs\nbG8").unwrap(), b"hello".to_vec());
        assert!(matches!(
            Encoding::Base64.encode("!!"),
            Err(EncodingError::InvalidBase64(_))
        ));
    }

    #[test]
    fn test_base64_accepts_mixed_alphabets() {
        assert_eq!(Encoding::Base64.encode("+_8=").unwrap(), vec![0xfb, 0xff]);
        assert_eq!(Encoding::Base64.encode("-/8").unwrap(), vec![0xfb, 0xff]);
        assert_eq!(Encoding::Base64Url.encode("-/8=").unwrap(), vec![0xfb, 0xff]);
        assert!(matches!(
            Encoding::Base64Url.encode("-_*8"),
            Err(EncodingError::InvalidBase64(_))
        ));
    }

    #[test]
    fn test_invalid_utf8_is_rejected() {
        assert!(matches!(
            Encoding::Utf8.decode(vec![0xff, 0xfe]),
            Err(EncodingError::InvalidUtf8(_))
        ));
    }

    #[test]
    fn test_bytes_content_ignores_encoding() {
        let content = Content::from(vec![0xff, 0x00]);
        assert_eq!(content.into_bytes(Encoding::Hex).unwrap(), vec![0xff, 0x00]);
    }
}
