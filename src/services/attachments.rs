//! File ingestion for the chat input.
//!
//! Two flavors: general attachments shown alongside a message, and LISP
//! source files whose text is folded into the prompt. Compiled AutoLISP
//! binaries are rejected outright since their contents cannot be reviewed.

use std::fs;
use std::path::Path;

use base64::Engine;

use crate::conversation::Attachment;
use crate::error::AppError;

/// Upper bound for a general chat attachment.
pub const MAX_ATTACHMENT_BYTES: u64 = 5 * 1024 * 1024;
/// Upper bound for a source file folded into the prompt.
pub const MAX_CODE_FILE_BYTES: u64 = 50 * 1024;

/// Source extensions whose content is treated as reviewable text.
const CODE_EXTENSIONS: &[&str] = &["lsp", "mnl", "scr", "txt"];
/// Compiled AutoLISP formats.
const COMPILED_EXTENSIONS: &[&str] = &["fas", "vlx"];

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_lowercase()
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("dosya")
        .to_string()
}

fn size_of(path: &Path) -> Result<u64, AppError> {
    Ok(fs::metadata(path)
        .map_err(|e| AppError::FormatError(format!("Dosya okunamadı: {e}")))?
        .len())
}

/// Loads a general attachment for display next to the user's message.
pub fn read_chat_attachment(path: &Path) -> Result<Attachment, AppError> {
    if size_of(path)? > MAX_ATTACHMENT_BYTES {
        return Err(AppError::FormatError(
            "Dosya çok büyük. En fazla 5MB eklenebilir.".to_string(),
        ));
    }
    let data = fs::read(path).map_err(|e| AppError::FormatError(format!("Dosya okunamadı: {e}")))?;
    let mime_type = match extension_of(path).as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "pdf" => "application/pdf",
        "lsp" | "mnl" | "scr" | "txt" => "text/plain",
        _ => "application/octet-stream",
    };
    Ok(Attachment {
        name: file_name_of(path),
        mime_type: mime_type.to_string(),
        data,
    })
}

/// Loads a source file as prompt text. Compiled formats, oversized files
/// and binary content are all format errors, never policy violations.
pub fn read_code_file(path: &Path) -> Result<String, AppError> {
    let ext = extension_of(path);
    if COMPILED_EXTENSIONS.contains(&ext.as_str()) {
        return Err(AppError::FormatError(
            "Derlenmiş LISP dosyaları (.fas/.vlx) incelenemez. Lütfen kaynak .lsp dosyasını ekleyin."
                .to_string(),
        ));
    }
    if !CODE_EXTENSIONS.contains(&ext.as_str()) {
        return Err(AppError::FormatError(
            "Desteklenmeyen dosya türü. Kabul edilenler: .lsp, .mnl, .scr, .txt".to_string(),
        ));
    }
    if size_of(path)? > MAX_CODE_FILE_BYTES {
        return Err(AppError::FormatError(
            "Kod dosyası çok büyük. En fazla 50KB eklenebilir.".to_string(),
        ));
    }

    let data = fs::read(path).map_err(|e| AppError::FormatError(format!("Dosya okunamadı: {e}")))?;
    if data.contains(&0) {
        return Err(AppError::FormatError(
            "Dosya ikili (binary) içerik taşıyor ve metin olarak okunamıyor.".to_string(),
        ));
    }
    String::from_utf8(data)
        .map_err(|_| AppError::FormatError("Dosya UTF-8 metin olarak okunamadı.".to_string()))
}

/// Inline data URL for rendering an attachment preview in the transcript.
pub fn as_data_url(attachment: &Attachment) -> String {
    format!(
        "data:{};base64,{}",
        attachment.mime_type,
        base64::engine::general_purpose::STANDARD.encode(&attachment.data)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &tempfile::TempDir, name: &str, bytes: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut f = fs::File::create(&path).unwrap();
        f.write_all(bytes).unwrap();
        path
    }

    #[test]
    fn source_file_round_trips_as_text() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write_file(&dir, "tool.lsp", b"(defun c:T () (princ))");
        assert_eq!(read_code_file(&path).unwrap(), "(defun c:T () (princ))");
    }

    #[test]
    fn compiled_formats_are_rejected_by_extension() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write_file(&dir, "tool.fas", b"whatever");
        assert!(matches!(
            read_code_file(&path),
            Err(AppError::FormatError(_))
        ));
    }

    #[test]
    fn binary_content_in_a_text_extension_is_rejected() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write_file(&dir, "fake.txt", b"abc\x00def");
        assert!(matches!(
            read_code_file(&path),
            Err(AppError::FormatError(_))
        ));
    }

    #[test]
    fn oversized_code_file_is_rejected() {
        let dir = tempfile::TempDir::new().unwrap();
        let big = vec![b'('; (MAX_CODE_FILE_BYTES + 1) as usize];
        let path = write_file(&dir, "big.lsp", &big);
        assert!(matches!(
            read_code_file(&path),
            Err(AppError::FormatError(_))
        ));
    }

    #[test]
    fn chat_attachment_carries_name_and_mime() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write_file(&dir, "plan.pdf", b"%PDF-1.4");
        let attachment = read_chat_attachment(&path).unwrap();
        assert_eq!(attachment.name, "plan.pdf");
        assert_eq!(attachment.mime_type, "application/pdf");
        assert!(as_data_url(&attachment).starts_with("data:application/pdf;base64,"));
    }
}
