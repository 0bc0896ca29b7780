//! Image intake: validate an uploaded photo and stage it on disk.
//!
//! ## Why stage to a temp file?
//!
//! The upload arrives as bytes plus a file name. Writing it to a
//! `NamedTempFile` gives the rest of the pipeline a real path to read back,
//! and the file is removed automatically when the [`StagedImage`] is
//! dropped, even on an early return or panic.

use crate::error::NotesError;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// File extensions accepted by the upload control.
pub const ACCEPTED_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// An uploaded photo held in memory.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    /// Original file name, used in logs and error messages.
    pub name: String,
    /// Lower-cased extension without the dot (`jpg`, `jpeg` or `png`).
    pub extension: String,
    pub bytes: Vec<u8>,
}

impl UploadedImage {
    /// Wrap in-memory bytes, validating the extension of `name`.
    pub fn from_bytes(bytes: Vec<u8>, name: impl Into<String>) -> Result<Self, NotesError> {
        let name = name.into();
        let extension = accepted_extension(&name)?;
        Ok(Self {
            name,
            extension,
            bytes,
        })
    }

    /// Read an image from disk, validating existence, permissions and extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, NotesError> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        let extension = accepted_extension(&name)?;

        if !path.exists() {
            return Err(NotesError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let bytes = match std::fs::read(path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                return Err(NotesError::PermissionDenied {
                    path: path.to_path_buf(),
                });
            }
            Err(_) => {
                return Err(NotesError::FileNotFound {
                    path: path.to_path_buf(),
                });
            }
        };

        debug!("Read {} ({} bytes)", path.display(), bytes.len());
        Ok(Self {
            name,
            extension,
            bytes,
        })
    }

    /// MIME type derived from the extension.
    pub fn mime_type(&self) -> &'static str {
        match self.extension.as_str() {
            "png" => "image/png",
            _ => "image/jpeg",
        }
    }

    /// Write the bytes to a temporary file that lives as long as the result.
    pub fn stage(self) -> Result<StagedImage, NotesError> {
        let mut tmp = tempfile::Builder::new()
            .prefix("notes2docx-")
            .suffix(&format!(".{}", self.extension))
            .tempfile()
            .map_err(|e| NotesError::Internal(format!("tempfile: {e}")))?;
        tmp.write_all(&self.bytes)
            .and_then(|_| tmp.flush())
            .map_err(|e| NotesError::Internal(format!("tempfile write: {e}")))?;

        debug!("Staged '{}' at {}", self.name, tmp.path().display());
        Ok(StagedImage {
            image: self,
            file: tmp,
        })
    }
}

/// An [`UploadedImage`] persisted to a temporary path.
///
/// Dropping the value deletes the file.
#[derive(Debug)]
pub struct StagedImage {
    image: UploadedImage,
    file: NamedTempFile,
}

impl StagedImage {
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn image(&self) -> &UploadedImage {
        &self.image
    }

    /// Delete the temp file now and report where it was.
    pub fn cleanup(self) -> PathBuf {
        let path = self.file.path().to_path_buf();
        if let Err(e) = self.file.close() {
            debug!("Temp file {} already gone: {}", path.display(), e);
        }
        path
    }
}

/// Return the lower-cased extension of `name` if it is an accepted type.
pub fn accepted_extension(name: &str) -> Result<String, NotesError> {
    let extension = Path::new(name)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    if ACCEPTED_EXTENSIONS.contains(&extension.as_str()) {
        Ok(extension)
    } else {
        Err(NotesError::UnsupportedImageType {
            name: name.to_string(),
            extension,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_known_extensions_case_insensitively() {
        assert_eq!(accepted_extension("notes.jpg").unwrap(), "jpg");
        assert_eq!(accepted_extension("notes.JPEG").unwrap(), "jpeg");
        assert_eq!(accepted_extension("dir/page.Png").unwrap(), "png");
    }

    #[test]
    fn rejects_other_extensions() {
        for name in ["notes.gif", "notes.pdf", "notes", ".png.txt"] {
            assert!(
                matches!(
                    accepted_extension(name),
                    Err(NotesError::UnsupportedImageType { .. })
                ),
                "{name} should be rejected"
            );
        }
    }

    #[test]
    fn mime_type_follows_extension() {
        let png = UploadedImage::from_bytes(vec![1], "a.png").unwrap();
        let jpg = UploadedImage::from_bytes(vec![1], "a.jpeg").unwrap();
        assert_eq!(png.mime_type(), "image/png");
        assert_eq!(jpg.mime_type(), "image/jpeg");
    }

    #[test]
    fn from_path_missing_file() {
        let err = UploadedImage::from_path("/definitely/not/here.png").unwrap_err();
        assert!(matches!(err, NotesError::FileNotFound { .. }));
    }

    #[test]
    fn staged_file_keeps_suffix_and_is_removed_on_drop() {
        let img = UploadedImage::from_bytes(b"hello".to_vec(), "page.png").unwrap();
        let staged = img.stage().unwrap();
        let path = staged.path().to_path_buf();

        assert!(path.exists());
        assert_eq!(path.extension().unwrap(), "png");
        assert_eq!(std::fs::read(staged.path()).unwrap(), b"hello");

        drop(staged);
        assert!(!path.exists(), "temp file should be deleted on drop");
    }

    #[test]
    fn cleanup_removes_file() {
        let img = UploadedImage::from_bytes(b"x".to_vec(), "page.jpg").unwrap();
        let path = img.stage().unwrap().cleanup();
        assert!(!path.exists());
    }
}
