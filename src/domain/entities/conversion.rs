//! Conversion entity representing a shortened URL mapping.

/// A stored mapping between a short code and its original URL.
///
/// Records are never physically removed. Soft-deleted records keep answering
/// existence checks while resolution treats them as gone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    pub short_code: String,
    pub original_url: String,
    pub deleted: bool,
}

impl Conversion {
    /// Creates an active (not deleted) conversion.
    pub fn new(short_code: impl Into<String>, original_url: impl Into<String>) -> Self {
        Self {
            short_code: short_code.into(),
            original_url: original_url.into(),
            deleted: false,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }
}

/// Input data for inserting a conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewConversion {
    pub original_url: String,
    pub short_code: String,
}

impl NewConversion {
    pub fn new(original_url: impl Into<String>, short_code: impl Into<String>) -> Self {
        Self {
            original_url: original_url.into(),
            short_code: short_code.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversion_starts_active() {
        let conversion = Conversion::new("1389853602", "yandex.com");

        assert_eq!(conversion.short_code, "1389853602");
        assert_eq!(conversion.original_url, "yandex.com");
        assert!(!conversion.is_deleted());
    }
}
