//! Coarse file type classification.
//!
//! A declared MIME type wins; when it is missing or unrecognized the URL
//! extension decides; anything else is [`FileType::Other`].

use archivehub_entity::file::FileType;

/// Substring rules applied to a lower-cased MIME type, in precedence order.
const MIME_RULES: &[(&[&str], FileType)] = &[
    (&["image/"], FileType::Image),
    (&["video/"], FileType::Video),
    (&["audio/"], FileType::Audio),
    (&["pdf"], FileType::Document),
    (&["word", "document"], FileType::Document),
    (&["excel", "spreadsheet"], FileType::Document),
    (&["powerpoint", "presentation"], FileType::Document),
    (&["text/"], FileType::Document),
    (&["zip", "compressed", "tar", "gzip", "7z"], FileType::Archive),
];

const EXTENSIONS: &[(&[&str], FileType)] = &[
    (
        &[
            "jpg", "jpeg", "png", "gif", "webp", "svg", "bmp", "ico", "tif", "tiff", "avif", "heic",
        ],
        FileType::Image,
    ),
    (
        &["mp4", "mov", "avi", "mkv", "webm", "m4v", "wmv", "flv"],
        FileType::Video,
    ),
    (
        &["mp3", "wav", "ogg", "flac", "aac", "m4a", "wma", "opus"],
        FileType::Audio,
    ),
    (
        &[
            "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "txt", "md", "csv", "rtf", "odt",
            "ods", "odp", "json", "xml",
        ],
        FileType::Document,
    ),
    (
        &["zip", "rar", "7z", "tar", "gz", "tgz", "bz2", "xz"],
        FileType::Archive,
    ),
];

/// Classify by MIME type alone. `None` when no rule matches.
pub fn classify_by_mime(mime_type: &str) -> Option<FileType> {
    let mime = mime_type.trim().to_lowercase();
    if mime.is_empty() {
        return None;
    }
    MIME_RULES
        .iter()
        .find(|(needles, _)| needles.iter().any(|n| mime.contains(n)))
        .map(|(_, file_type)| *file_type)
}

/// Classify by the extension of the URL's last path segment.
pub fn classify_by_extension(url: &str) -> Option<FileType> {
    let without_fragment = url.split('#').next().unwrap_or_default();
    let without_query = without_fragment.split('?').next().unwrap_or_default();
    let segment = without_query.rsplit('/').next().unwrap_or_default();
    let (_, ext) = segment.rsplit_once('.')?;
    let ext = ext.to_lowercase();
    EXTENSIONS
        .iter()
        .find(|(exts, _)| exts.contains(&ext.as_str()))
        .map(|(_, file_type)| *file_type)
}

/// Declared MIME type, then URL extension, then [`FileType::Other`].
pub fn classify_file_type(mime_type: Option<&str>, url: &str) -> FileType {
    mime_type
        .and_then(classify_by_mime)
        .or_else(|| classify_by_extension(url))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_extension_without_mime() {
        assert_eq!(
            classify_file_type(None, "https://cdn.example.com/r/annual.PDF"),
            FileType::Document
        );
    }

    #[test]
    fn test_mime_wins_over_extension() {
        assert_eq!(
            classify_file_type(Some("image/png"), "https://x.test/file.zip"),
            FileType::Image
        );
    }

    #[test]
    fn test_unrecognized_is_other() {
        assert_eq!(
            classify_file_type(Some("application/x-unknown"), "https://x.test/blob.bin"),
            FileType::Other
        );
        assert_eq!(classify_file_type(None, "https://x.test/download"), FileType::Other);
    }

    #[test]
    fn test_mime_rule_order() {
        assert_eq!(
            classify_by_mime("application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
            Some(FileType::Document)
        );
        assert_eq!(classify_by_mime("application/x-7z-compressed"), Some(FileType::Archive));
        assert_eq!(classify_by_mime("text/plain"), Some(FileType::Document));
        assert_eq!(classify_by_mime("VIDEO/MP4"), Some(FileType::Video));
        assert_eq!(classify_by_mime(""), None);
    }

    #[test]
    fn test_extension_ignores_query_and_fragment() {
        assert_eq!(
            classify_by_extension("https://x.test/a/song.mp3?sig=abc.zip#t=10"),
            Some(FileType::Audio)
        );
        assert_eq!(classify_by_extension("https://x.test/a.dir/readme"), None);
    }

    #[test]
    fn test_unknown_mime_falls_back_to_extension() {
        assert_eq!(
            classify_file_type(Some("application/octet-stream"), "https://x.test/pack.tgz"),
            FileType::Archive
        );
    }
}
