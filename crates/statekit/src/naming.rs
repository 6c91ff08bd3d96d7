//! Advisory checks for S3 bucket names.
//!
//! Nothing here rejects a name. The bucket is always requested as derived
//! and S3 has the final word; these checks only explain in advance why a
//! request is likely to fail.

use regex::Regex;
use std::sync::LazyLock;

static ALLOWED_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9.-]+$").expect("valid regex"));

static IP_ADDRESS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,3}(\.\d{1,3}){3}$").expect("valid regex"));

const MIN_LEN: usize = 3;
const MAX_LEN: usize = 63;

/// Problems S3 is likely to reject the bucket name for.
pub fn bucket_name_warnings(name: &str) -> Vec<String> {
    let mut warnings = Vec::new();

    let len = name.len();
    if !(MIN_LEN..=MAX_LEN).contains(&len) {
        warnings.push(format!(
            "length is {len}, S3 allows {MIN_LEN}-{MAX_LEN} characters"
        ));
    }

    if name.chars().any(|c| c.is_ascii_uppercase()) {
        warnings.push("contains uppercase letters".to_string());
    }

    if name.contains('_') {
        warnings.push("contains underscores".to_string());
    }

    if !ALLOWED_CHARS.is_match(&name.to_ascii_lowercase().replace('_', "")) {
        warnings.push("contains characters other than a-z, 0-9, '.' and '-'".to_string());
    }

    let starts_ok = name.chars().next().is_some_and(|c| c.is_ascii_alphanumeric());
    let ends_ok = name.chars().last().is_some_and(|c| c.is_ascii_alphanumeric());
    if !starts_ok || !ends_ok {
        warnings.push("must start and end with a letter or digit".to_string());
    }

    if name.contains("..") {
        warnings.push("contains consecutive dots".to_string());
    }

    if IP_ADDRESS.is_match(name) {
        warnings.push("is formatted as an IP address".to_string());
    }

    warnings
}
