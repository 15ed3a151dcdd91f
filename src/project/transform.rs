//! File copy with optional line-ending normalization.

use crate::config::LineEnding;
use crate::error::{Result, SyncError};
use crate::fs::{copy_preserving, ensure_dir, ensure_distinct, remove_existing};
use std::fs;
use std::path::Path;

/// Copy `src` to `dst`, rewriting line endings per `policy`.
///
/// `LineEnding::None` and non-UTF-8 content are copied byte for byte.
pub fn copy_file(src: &Path, dst: &Path, policy: LineEnding) -> Result<()> {
    let Some(separator) = policy.separator() else {
        return copy_preserving(src, dst);
    };

    let bytes = fs::read(src).map_err(|e| SyncError::fs("read", src, e))?;
    let text = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(_) => return copy_preserving(src, dst),
    };

    if let Some(parent) = dst.parent() {
        ensure_dir(parent)?;
    }
    if fs::symlink_metadata(dst).is_ok_and(|m| m.file_type().is_symlink()) {
        remove_existing(dst)?;
    }
    ensure_distinct(src, dst)?;

    fs::write(dst, convert_line_endings(&text, separator))
        .map_err(|e| SyncError::fs("write", dst, e))
}

/// Normalize every `\r\n` and lone `\r` to `\n`, then expand to `separator`.
pub fn convert_line_endings(text: &str, separator: &str) -> String {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    if separator == "\n" {
        normalized
    } else {
        normalized.replace('\n', separator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const MIXED: &str = "one\ntwo\r\nthree\rfour";

    #[test]
    fn normalizes_mixed_endings_to_lf() {
        assert_eq!(convert_line_endings(MIXED, "\n"), "one\ntwo\nthree\nfour");
    }

    #[test]
    fn expands_to_crlf() {
        assert_eq!(
            convert_line_endings(MIXED, "\r\n"),
            "one\r\ntwo\r\nthree\r\nfour"
        );
    }

    #[test]
    fn expands_to_cr() {
        assert_eq!(convert_line_endings("a\r\nb\n", "\r"), "a\rb\r");
    }

    #[test]
    fn crlf_is_not_doubled() {
        assert_eq!(convert_line_endings("a\r\n", "\r\n"), "a\r\n");
    }

    #[test]
    fn copy_file_none_is_byte_identical() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("in.txt");
        fs::write(&src, MIXED).unwrap();
        let dst = temp.path().join("out.txt");

        copy_file(&src, &dst, LineEnding::None).unwrap();

        assert_eq!(fs::read(&dst).unwrap(), MIXED.as_bytes());
    }

    #[test]
    fn copy_file_binary_falls_back_to_raw_copy() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("blob.bin");
        let bytes: Vec<u8> = vec![0xff, 0xfe, b'\r', b'\n', 0x00, b'\r'];
        fs::write(&src, &bytes).unwrap();
        let dst = temp.path().join("nested/blob.bin");

        copy_file(&src, &dst, LineEnding::Lf).unwrap();

        assert_eq!(fs::read(&dst).unwrap(), bytes);
    }

    #[test]
    fn copy_file_text_is_rewritten() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("in.txt");
        fs::write(&src, MIXED).unwrap();
        let dst = temp.path().join("out.txt");

        copy_file(&src, &dst, LineEnding::Crlf).unwrap();

        assert_eq!(
            fs::read_to_string(&dst).unwrap(),
            "one\r\ntwo\r\nthree\r\nfour"
        );
    }
}
