//! Hex loading utilities for aspect-jp

use std::{fs, io::Read};

use alloy_primitives::{hex, Bytes};

use super::{JpError, Result};

/// Load hex-encoded bytes from an argument or a file. If the file is a dash (-), read from stdin.
/// Priority: arg > file. Returns `None` if neither is provided.
pub fn load_hex(arg: Option<&str>, file: Option<&str>) -> Result<Option<Bytes>> {
    let hex_string = if let Some(arg) = arg {
        arg.to_string()
    } else if let Some(file) = file {
        if file == "-" {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        } else {
            fs::read_to_string(file)?
        }
    } else {
        return Ok(None);
    };

    decode_hex(&hex_string).map(|bytes| Some(Bytes::from(bytes)))
}

/// Decode hex string, handling optional 0x prefix
fn decode_hex(s: &str) -> Result<Vec<u8>> {
    let s = s.trim();
    let hex_str = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);

    if hex_str.len() % 2 != 0 {
        return Err(JpError::InvalidInput(format!(
            "Invalid hex string length: {} (must be even)",
            hex_str.len()
        )));
    }

    Ok(hex::decode(hex_str)?)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::prefixed("0x0102ff", vec![0x01, 0x02, 0xff])]
    #[case::upper_prefix("0X0a", vec![0x0a])]
    #[case::bare(" 0a0b \n", vec![0x0a, 0x0b])]
    #[case::empty("", vec![])]
    #[case::empty_prefixed("0x", vec![])]
    fn test_decode_hex(#[case] input: &str, #[case] expected: Vec<u8>) {
        assert_eq!(decode_hex(input).unwrap(), expected);
    }

    #[rstest]
    #[case::odd_length("0x123")]
    #[case::not_hex("0xzz")]
    fn test_decode_hex_errors(#[case] input: &str) {
        assert!(decode_hex(input).is_err());
    }

    #[test]
    fn test_load_hex_priority() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "0xbeef").unwrap();
        let path = file.path().to_str().unwrap();

        assert_eq!(load_hex(None, None).unwrap(), None);
        assert_eq!(load_hex(None, Some(path)).unwrap(), Some(Bytes::from_static(&[0xbe, 0xef])));
        assert_eq!(load_hex(Some("0x01"), Some(path)).unwrap(), Some(Bytes::from_static(&[0x01])));
        assert!(matches!(load_hex(None, Some("/nonexistent/tx.hex")), Err(JpError::FileRead(_))));
    }
}
