//! Failure-artifact transcoding.
//!
//! Converts a binary attachment (inline bytes or a file on disk) into a
//! `data:` URI so the rendered report embeds it with no external file
//! references. The read is synchronous and one-shot: it runs during end
//! -event ingestion, after the test itself has already concluded.

use std::path::PathBuf;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;

use crate::model::Attachment;

/// Errors raised while transcoding an attachment.
///
/// These never escape the aggregation layer: the caller catches them,
/// logs, and leaves the entry's screenshot field empty.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    /// The attachment declared neither inline bytes nor a path.
    #[error("attachment '{0}' has neither inline bytes nor a file path")]
    NoContent(String),

    /// The attachment's file could not be read.
    #[error("failed to read attachment file {path}")]
    Io {
        /// Path the host declared for the artifact.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Transcodes an attachment into a `data:<content-type>;base64,<payload>`
/// string.
///
/// Inline bytes are preferred; otherwise the declared file is read fully
/// into memory. Missing or unreadable files are an error; graceful
/// degradation is the caller's job, not this function's.
///
/// # Example
///
/// ```
/// use verdict::artifact::to_data_uri;
/// use verdict::model::Attachment;
///
/// let png = Attachment::inline("screenshot", "image/png", vec![0x89, 0x50]);
/// let uri = to_data_uri(&png).unwrap();
/// assert!(uri.starts_with("data:image/png;base64,"));
/// ```
pub fn to_data_uri(attachment: &Attachment) -> Result<String, ArtifactError> {
    let bytes = match (&attachment.body, &attachment.path) {
        (Some(body), _) => body.clone(),
        (None, Some(path)) => std::fs::read(path).map_err(|source| ArtifactError::Io {
            path: path.clone(),
            source,
        })?,
        (None, None) => return Err(ArtifactError::NoContent(attachment.name.clone())),
    };

    Ok(format!(
        "data:{};base64,{}",
        attachment.content_type,
        BASE64.encode(&bytes)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_bytes_round_trip() {
        let bytes = vec![0x89u8, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a];
        let attachment = Attachment::inline("screenshot", "image/png", bytes.clone());

        let uri = to_data_uri(&attachment).unwrap();
        let payload = uri.strip_prefix("data:image/png;base64,").unwrap();
        assert_eq!(BASE64.decode(payload).unwrap(), bytes);
    }

    #[test]
    fn test_reads_file_when_no_inline_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shot.png");
        std::fs::write(&path, b"not really a png").unwrap();

        let attachment = Attachment::from_path("screenshot", "image/png", &path);
        let uri = to_data_uri(&attachment).unwrap();
        let payload = uri.strip_prefix("data:image/png;base64,").unwrap();
        assert_eq!(BASE64.decode(payload).unwrap(), b"not really a png");
    }

    #[test]
    fn test_inline_bytes_win_over_path() {
        let attachment = Attachment {
            name: "screenshot".into(),
            content_type: "image/png".into(),
            body: Some(vec![1, 2, 3]),
            path: Some("/nonexistent/shot.png".into()),
        };
        let uri = to_data_uri(&attachment).unwrap();
        assert_eq!(uri, format!("data:image/png;base64,{}", BASE64.encode([1, 2, 3])));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let attachment =
            Attachment::from_path("screenshot", "image/png", "/nonexistent/shot.png");
        match to_data_uri(&attachment) {
            Err(ArtifactError::Io { path, .. }) => {
                assert_eq!(path, PathBuf::from("/nonexistent/shot.png"));
            }
            other => panic!("expected Io error, got {:?}", other),
        }
    }

    #[test]
    fn test_content_free_attachment_is_error() {
        let attachment = Attachment {
            name: "screenshot".into(),
            content_type: "image/png".into(),
            body: None,
            path: None,
        };
        assert!(matches!(
            to_data_uri(&attachment),
            Err(ArtifactError::NoContent(name)) if name == "screenshot"
        ));
    }
}
