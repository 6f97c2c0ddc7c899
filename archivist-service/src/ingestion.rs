//! Upload intake helpers: filename sanitization and content fingerprinting.

pub mod hash;

use std::path::Path;

use crate::error::{ServiceError, ServiceResult};

/// Reduce a client-supplied filename to its basename and require a PDF
/// extension. The basename step strips any path components a client smuggles
/// into the multipart filename.
pub fn sanitize_filename(raw: &str) -> ServiceResult<String> {
    let name = Path::new(raw)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("")
        .to_string();

    if name.is_empty() {
        return Err(ServiceError::InvalidRequest {
            message: "No selected file".to_string(),
        });
    }

    if !name.to_ascii_lowercase().ends_with(".pdf") {
        return Err(ServiceError::InvalidRequest {
            message: "Only PDF files are allowed".to_string(),
        });
    }

    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_path_components() {
        assert_eq!(
            sanitize_filename("../../etc/secrets.pdf").unwrap(),
            "secrets.pdf"
        );
        assert_eq!(
            sanitize_filename("/tmp/upload/report.pdf").unwrap(),
            "report.pdf"
        );
    }

    #[test]
    fn accepts_uppercase_extension() {
        assert_eq!(sanitize_filename("Manual.PDF").unwrap(), "Manual.PDF");
    }

    #[test]
    fn rejects_non_pdf() {
        assert!(sanitize_filename("notes.txt").is_err());
        assert!(sanitize_filename("archive.pdf.exe").is_err());
    }

    #[test]
    fn rejects_empty_and_pathless_names() {
        assert!(sanitize_filename("").is_err());
        assert!(sanitize_filename("..").is_err());
        assert!(sanitize_filename("uploads/").is_err());
    }
}
