//! File attachment screening.
//!
//! Attachments are only classified and announced.  Their contents are never
//! read, sent, or stored.

use std::path::Path;

use crate::chat::Notification;
use crate::error::{Error, Result};

/// MIME types an attachment may have.
pub const ALLOWED_MIME_TYPES: [&str; 5] = [
    "application/pdf",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "image/png",
    "image/jpeg",
    "image/jpg",
];

/// Result of screening one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachmentVerdict {
    /// The file type is on the allow-list.
    Accepted {
        /// File name without directories.
        name: String,
        /// Detected MIME type.
        mime: &'static str,
    },
    /// The file type is not allowed.
    Rejected {
        /// File name without directories.
        name: String,
        /// Detected MIME type, if the extension was recognised at all.
        mime: Option<&'static str>,
    },
}

impl AttachmentVerdict {
    /// Returns true if the attachment was accepted.
    pub fn is_accepted(&self) -> bool {
        matches!(self, AttachmentVerdict::Accepted { .. })
    }

    /// The notice announcing the verdict.
    pub fn notification(&self) -> Notification {
        match self {
            AttachmentVerdict::Accepted { name, .. } => Notification::info(
                "Document uploaded",
                format!("{name} has been uploaded successfully."),
            ),
            AttachmentVerdict::Rejected { .. } => Notification::error(
                "Invalid file type",
                "Please upload PDF, DOCX, PNG, or JPG files only.",
            ),
        }
    }
}

/// Guesses a MIME type from a file extension.
pub fn mime_for_path(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match extension.as_str() {
        "pdf" => "application/pdf",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "doc" => "application/msword",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "txt" => "text/plain",
        "html" | "htm" => "text/html",
        "zip" => "application/zip",
        _ => return None,
    };
    Some(mime)
}

/// Screens the file at `path` against [`ALLOWED_MIME_TYPES`].
///
/// Fails only if the path does not name a regular file.
pub fn screen(path: &Path) -> Result<AttachmentVerdict> {
    let metadata = std::fs::metadata(path)
        .map_err(|err| Error::io(format!("cannot attach {}", path.display()), err))?;
    if !metadata.is_file() {
        return Err(Error::validation(
            format!("{} is not a file", path.display()),
            Some("attach".to_string()),
        ));
    }
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(match mime_for_path(path) {
        Some(mime) if ALLOWED_MIME_TYPES.contains(&mime) => {
            AttachmentVerdict::Accepted { name, mime }
        }
        mime => AttachmentVerdict::Rejected { name, mime },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn scratch_file(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("nyaai-attach-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, b"contents are never read").unwrap();
        path
    }

    #[test]
    fn mime_detection() {
        assert_eq!(mime_for_path(Path::new("a/FIR.PDF")), Some("application/pdf"));
        assert_eq!(mime_for_path(Path::new("scan.jpeg")), Some("image/jpeg"));
        assert_eq!(mime_for_path(Path::new("noextension")), None);
    }

    #[test]
    fn allowed_types_are_accepted() {
        for name in ["lease.pdf", "notice.docx", "photo.png", "id.jpg", "id2.JPEG"] {
            let verdict = screen(&scratch_file(name)).unwrap();
            assert!(verdict.is_accepted(), "{name} should be accepted");
        }
        let verdict = screen(&scratch_file("lease.pdf")).unwrap();
        assert_eq!(
            verdict.notification(),
            Notification::info("Document uploaded", "lease.pdf has been uploaded successfully.")
        );
    }

    #[test]
    fn other_types_are_rejected() {
        for name in ["notes.txt", "old.doc", "archive.zip", "README"] {
            let verdict = screen(&scratch_file(name)).unwrap();
            assert!(!verdict.is_accepted(), "{name} should be rejected");
            assert!(verdict.notification().is_error());
        }
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = screen(Path::new("/definitely/not/here.pdf")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
