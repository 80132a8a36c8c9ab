//! Short code derivation.
//!
//! Codes are the CRC-32 (IEEE) checksum of the URL's UTF-8 bytes rendered in
//! decimal. The checksum is deterministic across processes, which lets a
//! resubmitted URL land on its existing record without a hash index. It is not
//! collision resistant: two different URLs may share a code, in which case the
//! second insert is reported as a duplicate.

/// Computes the short code for a URL.
///
/// # Examples
///
/// ```
/// use shortener::utils::codec::short_code;
///
/// assert_eq!(short_code("yandex.com"), "1389853602");
/// ```
pub fn short_code(original_url: &str) -> String {
    crc32fast::hash(original_url.as_bytes()).to_string()
}

/// Builds the public short URL from the configured base address and a code.
pub fn short_url(base_url: &str, short_code: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), short_code)
}
