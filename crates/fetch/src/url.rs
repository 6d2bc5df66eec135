use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use crate::error::{Error, ErrorKind, Result};
use crate::path::validate as validate_path;

/// Root URL of a deployment, relative asset paths are appended to it.
///
/// Must use an explicit `http://` or `https://` scheme and end with `/`.
/// Parsing never touches the network.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BaseUrl(String);
impl BaseUrl {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Absolute URL of `path` below this base.
    pub fn join(&self, path: &str) -> Result<String> {
        let path = validate_path(path)?;
        Ok(format!("{}{path}", self.0))
    }
}
impl FromStr for BaseUrl {
    type Err = Error;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let invalid = |reason| ErrorKind::InvalidUrl { url: s.to_string(), reason };
        if !(s.starts_with("http://") || s.starts_with("https://")) {
            exn::bail!(invalid("must start with \"http://\" or \"https://\""));
        }
        if !s.ends_with('/') {
            exn::bail!(invalid("must end in a slash (/)"));
        }
        if s.trim_start_matches("https://").trim_start_matches("http://").starts_with('/') {
            exn::bail!(invalid("missing host"));
        }
        Ok(Self(s.to_string()))
    }
}
impl AsRef<str> for BaseUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
impl Display for BaseUrl {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("http://example.com/")]
    #[case("https://example.com/")]
    #[case("https://example.com/shop/")]
    #[case("http://127.0.0.1:8080/")]
    fn valid(#[case] input: &str) {
        let url: BaseUrl = input.parse().unwrap();
        assert_eq!(url.as_str(), input);
    }

    #[rstest]
    #[case("https://example.com")]
    #[case("example.com/")]
    #[case("ftp://example.com/")]
    #[case("HTTP://example.com/")]
    #[case("http:/example.com/")]
    #[case("http:///")]
    #[case("")]
    fn invalid(#[case] input: &str) {
        let err = input.parse::<BaseUrl>().unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidUrl { .. }));
    }

    #[test]
    fn join_appends_validated_path() {
        let url: BaseUrl = "https://example.com/shop/".parse().unwrap();
        assert_eq!(url.join("js/./varien/form.js").unwrap(), "https://example.com/shop/js/varien/form.js");
        assert!(url.join("../admin").is_err());
    }
}
