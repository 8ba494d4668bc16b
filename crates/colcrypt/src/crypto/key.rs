//! Loading the 256-bit column key from a hex-encoded file.

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::KEY_LEN;

/// Number of hex characters that encode a [`KEY_LEN`]-byte key.
pub const KEY_HEX_LEN: usize = KEY_LEN * 2;

/// Most bytes read from a key file. Leaves room for surrounding whitespace;
/// anything longer cannot hold a valid key.
const KEY_FILE_READ_LIMIT: usize = KEY_HEX_LEN + 64;

/// Errors produced while reading a key file.
///
/// Messages name the path but never include any of the file's content, its
/// size, or the underlying io error.
#[derive(Debug, Error)]
pub enum KeyError {
    /// The file could not be opened or read, or is not a regular file.
    #[error("failed to read key from file {path}: file cannot be read")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file does not hold exactly [`KEY_HEX_LEN`] hex characters.
    #[error("failed to read key from file {path}: expected {KEY_HEX_LEN} hex characters")]
    WrongLength { path: PathBuf },

    /// The file holds a character outside `0-9a-fA-F`.
    #[error("failed to read key from file {path}: content is not hexadecimal")]
    NotHex { path: PathBuf },
}

/// Raw key material, exactly [`KEY_LEN`] bytes.
///
/// The buffer is zeroed when dropped and never printed.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct KeyBytes([u8; KEY_LEN]);

impl KeyBytes {
    #[cfg(test)]
    pub fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl std::fmt::Debug for KeyBytes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("KeyBytes([REDACTED])")
    }
}

/// Read a hex-encoded AES-256 key from `path`.
///
/// Surrounding whitespace (typically a trailing newline) is ignored. What
/// remains must be exactly [`KEY_HEX_LEN`] characters from `0-9a-fA-F`.
/// Only regular files are opened, and at most `KEY_FILE_READ_LIMIT` bytes
/// are read, so device files and FIFOs cannot stall or exhaust the caller.
///
/// # Errors
///
/// Returns [`KeyError::Unreadable`] if the path is not a regular file or
/// cannot be read, [`KeyError::WrongLength`] if it holds too few or too many
/// characters, and [`KeyError::NotHex`] if any character is not a hex digit.
pub fn load_key_file(path: &Path) -> Result<KeyBytes, KeyError> {
    let unreadable = |source| KeyError::Unreadable {
        path: path.to_owned(),
        source,
    };

    if !std::fs::metadata(path).map_err(unreadable)?.is_file() {
        return Err(unreadable(io::Error::new(
            io::ErrorKind::InvalidInput,
            "not a regular file",
        )));
    }

    let mut content = Vec::with_capacity(KEY_FILE_READ_LIMIT + 1);
    let read = File::open(path)
        .and_then(|file| file.take(KEY_FILE_READ_LIMIT as u64 + 1).read_to_end(&mut content));
    let result = match read {
        Err(source) => Err(unreadable(source)),
        Ok(_) if content.len() > KEY_FILE_READ_LIMIT => Err(KeyError::WrongLength {
            path: path.to_owned(),
        }),
        Ok(_) => decode_key(content.trim_ascii(), path),
    };
    content.zeroize();
    result
}

fn decode_key(hex_digits: &[u8], path: &Path) -> Result<KeyBytes, KeyError> {
    if hex_digits.len() != KEY_HEX_LEN {
        // A short token may be short because of an embedded non-hex byte; report
        // that first so the message points at the real problem.
        if !hex_digits.iter().all(u8::is_ascii_hexdigit) {
            return Err(KeyError::NotHex {
                path: path.to_owned(),
            });
        }
        return Err(KeyError::WrongLength {
            path: path.to_owned(),
        });
    }

    let mut key = [0u8; KEY_LEN];
    if hex::decode_to_slice(hex_digits, &mut key).is_err() {
        key.zeroize();
        return Err(KeyError::NotHex {
            path: path.to_owned(),
        });
    }
    Ok(KeyBytes(key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn key_file(content: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content).unwrap();
        file
    }

    #[test]
    fn loads_lowercase_key() {
        let file = key_file(b"000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f");
        let key = load_key_file(file.path()).unwrap();
        let expected: Vec<u8> = (0u8..32).collect();
        assert_eq!(key.as_bytes().as_slice(), expected.as_slice());
    }

    #[test]
    fn loads_mixed_case_key_with_trailing_newline() {
        let file = key_file(b"ABCDEFabcdef0123456789ABCDEFabcdef0123456789ABCDEFabcdef01234567\n");
        let key = load_key_file(file.path()).unwrap();
        assert_eq!(key.as_bytes()[0], 0xAB);
        assert_eq!(key.as_bytes()[31], 0x67);
    }

    #[test]
    fn rejects_short_key() {
        let file = key_file(&[b'a'; 63]);
        let err = load_key_file(file.path()).unwrap_err();
        assert!(matches!(err, KeyError::WrongLength { .. }));
    }

    #[test]
    fn rejects_long_key() {
        let file = key_file(&[b'a'; 66]);
        assert!(matches!(
            load_key_file(file.path()).unwrap_err(),
            KeyError::WrongLength { .. }
        ));
    }

    #[test]
    fn rejects_non_hex_character() {
        let mut content = [b'0'; 64];
        content[17] = b'g';
        let file = key_file(&content);
        assert!(matches!(
            load_key_file(file.path()).unwrap_err(),
            KeyError::NotHex { .. }
        ));
    }

    #[test]
    fn rejects_embedded_whitespace() {
        let mut content = [b'0'; 64];
        content[32] = b' ';
        let file = key_file(&content);
        assert!(matches!(
            load_key_file(file.path()).unwrap_err(),
            KeyError::NotHex { .. }
        ));
    }

    #[test]
    fn missing_file_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.key");
        let err = load_key_file(&path).unwrap_err();
        assert!(matches!(err, KeyError::Unreadable { .. }));
        assert!(err.to_string().contains("absent.key"));
    }

    #[test]
    fn oversized_file_is_rejected_without_reading_it_all() {
        let mut content = vec![b'a'; 1 << 20];
        content.push(b'\n');
        let file = key_file(&content);
        let err = load_key_file(file.path()).unwrap_err();
        assert!(matches!(err, KeyError::WrongLength { .. }));
    }

    #[test]
    fn whitespace_padding_within_limit_is_accepted() {
        let mut content = b"\n\n   ".to_vec();
        content.extend_from_slice(&[b'0'; KEY_HEX_LEN]);
        content.extend_from_slice(b"   \n\n");
        let file = key_file(&content);
        assert!(load_key_file(file.path()).is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn device_files_are_refused() {
        let err = load_key_file(Path::new("/dev/zero")).unwrap_err();
        assert!(matches!(err, KeyError::Unreadable { .. }));
    }

    #[test]
    fn directory_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_key_file(dir.path()).unwrap_err();
        assert!(matches!(err, KeyError::Unreadable { .. }));
    }

    #[test]
    fn error_hides_length_and_io_detail() {
        let file = key_file(&[b'a'; 40]);
        let message = load_key_file(file.path()).unwrap_err().to_string();
        assert!(message.ends_with("expected 64 hex characters"));

        let dir = tempfile::tempdir().unwrap();
        let message = load_key_file(&dir.path().join("absent.key")).unwrap_err().to_string();
        assert!(!message.to_lowercase().contains("no such file"));
        assert!(message.contains("absent.key"));
    }

    #[test]
    fn error_never_echoes_content() {
        let file = key_file(b"deadbeefZZ");
        let err = load_key_file(file.path()).unwrap_err();
        assert!(!err.to_string().contains("deadbeef"));
    }

    #[test]
    fn key_bytes_redacted_in_debug() {
        let key = KeyBytes::new([0xFF; KEY_LEN]);
        assert!(format!("{key:?}").contains("REDACTED"));
    }
}
