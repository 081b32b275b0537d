//! Client-side file validation
//!
//! Runs before any network call. Browsers report CSV MIME types
//! inconsistently, so a matching extension is accepted on its own.

use crate::config::DEFAULT_MAX_UPLOAD_BYTES;
use crate::error::ValidationError;
use crate::model::Document;

pub const ACCEPTED_MIME_TYPES: [&str; 3] = ["application/pdf", "text/csv", "application/vnd.ms-excel"];
pub const ACCEPTED_EXTENSIONS: [&str; 2] = [".pdf", ".csv"];

/// Size and type checks for candidate uploads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileValidator {
    limit_bytes: u64,
}

impl Default for FileValidator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_UPLOAD_BYTES)
    }
}

impl FileValidator {
    pub fn new(limit_bytes: u64) -> Self {
        Self { limit_bytes }
    }

    pub fn limit_bytes(&self) -> u64 {
        self.limit_bytes
    }

    pub fn validate(&self, document: &Document) -> Result<(), ValidationError> {
        if document.size_bytes > self.limit_bytes {
            return Err(ValidationError::TooLarge {
                size_bytes: document.size_bytes,
                limit_bytes: self.limit_bytes,
            });
        }

        if has_accepted_type(&document.declared_type) || has_accepted_extension(&document.name) {
            Ok(())
        } else {
            Err(ValidationError::UnsupportedType)
        }
    }
}

/// Validate against the default 15MB ceiling
pub fn validate_document(document: &Document) -> Result<(), ValidationError> {
    FileValidator::default().validate(document)
}

fn has_accepted_type(declared_type: &str) -> bool {
    ACCEPTED_MIME_TYPES.contains(&declared_type)
}

fn has_accepted_extension(name: &str) -> bool {
    let name = name.to_lowercase();
    ACCEPTED_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    const LIMIT: u64 = 15 * 1024 * 1024;

    proptest! {
        /// Property: oversized files are rejected and the reason reports the size to one decimal
        #[test]
        fn oversized_files_report_size(size in (LIMIT + 1)..(LIMIT * 20), name in "[a-z]{1,12}\\.pdf") {
            let doc = Document::new(name, size, "application/pdf");
            let err = validate_document(&doc).unwrap_err();

            let expected = format!("{:.1}MB", size as f64 / (1024.0 * 1024.0));
            prop_assert!(
                matches!(err, ValidationError::TooLarge { .. }),
                "expected TooLarge, got {:?}",
                err
            );
            prop_assert!(err.to_string().contains(&expected));
            prop_assert!(err.to_string().contains("15MB"));
        }

        /// Property: a .pdf/.csv name in any case is accepted whatever the declared type
        #[test]
        fn known_extensions_accepted(
            stem in "[A-Za-z0-9_ -]{1,20}",
            ext in prop_oneof![Just(".pdf"), Just(".csv"), Just(".PDF"), Just(".Csv")],
            declared in "[a-z/.-]{0,30}",
            size in 0..=LIMIT
        ) {
            let doc = Document::new(format!("{}{}", stem, ext), size, declared);
            prop_assert_eq!(validate_document(&doc), Ok(()));
        }
    }
}
