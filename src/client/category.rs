//! File categories used to pick an icon, and human-readable sizes.

use std::fmt;
use std::path::Path;

/// Icon category of a stored file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileCategory {
    Image,
    Pdf,
    Word,
    Excel,
    Other,
}

const WORD_MIME: [&str; 2] = [
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

const EXCEL_MIME: [&str; 2] = [
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
];

impl FileCategory {
    /// Classify a file by its name suffix (case-insensitive) or MIME type.
    ///
    /// Checks run in the order image, pdf, word, excel, so the first match
    /// wins. Anything unrecognised is [`FileCategory::Other`].
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// assert_eq!(FileCategory::classify("Scan.JPG", ""), FileCategory::Image);
    /// assert_eq!(FileCategory::classify("notes", "application/pdf"), FileCategory::Pdf);
    /// ```
    pub fn classify(filename: &str, mimetype: &str) -> Self {
        let ext = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        let mime = mimetype.trim().to_ascii_lowercase();

        if matches!(ext.as_str(), "jpg" | "jpeg" | "png") || mime.starts_with("image/") {
            FileCategory::Image
        } else if ext == "pdf" || mime == "application/pdf" {
            FileCategory::Pdf
        } else if matches!(ext.as_str(), "doc" | "docx") || WORD_MIME.contains(&mime.as_str()) {
            FileCategory::Word
        } else if matches!(ext.as_str(), "xls" | "xlsx") || EXCEL_MIME.contains(&mime.as_str()) {
            FileCategory::Excel
        } else {
            FileCategory::Other
        }
    }

    /// Short label for terminal output.
    pub fn label(&self) -> &'static str {
        match self {
            FileCategory::Image => "image",
            FileCategory::Pdf => "pdf",
            FileCategory::Word => "word",
            FileCategory::Excel => "excel",
            FileCategory::Other => "file",
        }
    }
}

impl fmt::Display for FileCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

/// Format a byte count as `B`, `KB`, `MB` or `GB` (1024 based).
pub fn format_file_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    const GB: f64 = MB * 1024.0;

    let size = bytes as f64;
    if size < KB {
        format!("{} B", bytes)
    } else if size < MB {
        format!("{:.2} KB", size / KB)
    } else if size < GB {
        format!("{:.2} MB", size / MB)
    } else {
        format!("{:.2} GB", size / GB)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_by_extension() {
        let cases = [
            ("photo.jpg", FileCategory::Image),
            ("photo.JPEG", FileCategory::Image),
            ("shot.Png", FileCategory::Image),
            ("report.pdf", FileCategory::Pdf),
            ("letter.DOC", FileCategory::Word),
            ("letter.docx", FileCategory::Word),
            ("sheet.xls", FileCategory::Excel),
            ("sheet.XLSX", FileCategory::Excel),
            ("archive.zip", FileCategory::Other),
            ("README", FileCategory::Other),
        ];
        for (name, expected) in cases {
            assert_eq!(FileCategory::classify(name, ""), expected, "{}", name);
        }
    }

    #[test]
    fn test_classify_by_mime() {
        assert_eq!(FileCategory::classify("blob", "image/gif"), FileCategory::Image);
        assert_eq!(FileCategory::classify("blob", "application/pdf"), FileCategory::Pdf);
        assert_eq!(
            FileCategory::classify("blob", "application/msword"),
            FileCategory::Word
        );
        assert_eq!(
            FileCategory::classify(
                "blob",
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            ),
            FileCategory::Excel
        );
        assert_eq!(
            FileCategory::classify("blob", "application/octet-stream"),
            FileCategory::Other
        );
    }

    #[test]
    fn test_image_wins_over_later_categories() {
        assert_eq!(
            FileCategory::classify("scan.png", "application/pdf"),
            FileCategory::Image
        );
        assert_eq!(
            FileCategory::classify("report.pdf", "application/msword"),
            FileCategory::Pdf
        );
    }

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(0), "0 B");
        assert_eq!(format_file_size(1023), "1023 B");
        assert_eq!(format_file_size(1024), "1.00 KB");
        assert_eq!(format_file_size(1536), "1.50 KB");
        assert_eq!(format_file_size(16 * 1024 * 1024), "16.00 MB");
        assert_eq!(format_file_size(3 * 1024 * 1024 * 1024), "3.00 GB");
    }
}
