//! Relative path validation.
//!
//! Paths come from a fingerprint database and are appended to a base URL, so
//! they must stay below that base.

use crate::error::{ErrorKind, Result};

/// Validates a relative asset path and returns it normalized.
///
/// Empty and `.` segments are dropped, `..` pops the previous segment and may
/// never climb above the base. Null bytes, backslashes, and URL query or
/// fragment delimiters are rejected.
///
/// # Examples
///
/// ```
/// use relprint_fetch::validate_path;
/// assert_eq!(validate_path("js/varien/form.js").unwrap(), "js/varien/form.js");
/// assert_eq!(validate_path("/js/./lib/../form.js").unwrap(), "js/form.js");
/// assert!(validate_path("../app/etc/local.xml").is_err());
/// ```
pub fn validate(path: &str) -> Result<String> {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {},
            ".." => {
                if segments.pop().is_none() {
                    exn::bail!(ErrorKind::InvalidPath(path.to_string()));
                }
            },
            _ if segment.contains(['\0', '\\', '?', '#']) => exn::bail!(ErrorKind::InvalidPath(path.to_string())),
            _ => segments.push(segment),
        }
    }
    match segments.is_empty() {
        true => exn::bail!(ErrorKind::InvalidPath(path.to_string())),
        false => Ok(segments.join("/")),
    }
}
