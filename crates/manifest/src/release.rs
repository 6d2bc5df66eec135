use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::error::{Error, ErrorKind};

/// Product edition.
///
/// Listings and release identifiers use the short code, the fingerprint
/// database and any user-facing output use the long name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Edition {
    /// (CE) Community
    Community,
    /// (EE) Enterprise
    Enterprise,
}
impl Edition {
    /// Every edition, in code order.
    pub const ALL: [Edition; 2] = [Edition::Community, Edition::Enterprise];

    /// Returns the short code used in release identifiers.
    pub fn code(&self) -> &'static str {
        match self {
            Edition::Community => "CE",
            Edition::Enterprise => "EE",
        }
    }

    /// Returns the long-form name.
    pub fn name(&self) -> &'static str {
        match self {
            Edition::Community => "Community",
            Edition::Enterprise => "Enterprise",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|edition| edition.code() == code)
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|edition| edition.name() == name)
    }
}
impl FromStr for Edition {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Self::from_code(s).or_else(|| Self::from_name(s)) {
            Some(edition) => Ok(edition),
            None => exn::bail!(ErrorKind::InvalidRelease(format!("unknown edition: {s}"))),
        }
    }
}
impl Display for Edition {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.name())
    }
}
impl Serialize for Edition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}
impl<'de> Deserialize<'de> for Edition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Self::from_name(&name).ok_or_else(|| de::Error::custom(format!("unknown edition: {name}")))
    }
}

/// A known release, identified as `EDITION-VERSION` (e.g. `CE-1.7.0.2`).
///
/// Opaque apart from its two fields. Ordering follows the identifier, so a
/// sorted collection of releases iterates in the same order as a sorted
/// directory listing of their manifests.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Release {
    edition: Edition,
    version: String,
}
impl Release {
    pub fn new(edition: Edition, version: impl Into<String>) -> Self {
        Self { edition, version: version.into() }
    }

    pub fn edition(&self) -> Edition {
        self.edition
    }

    /// Version label, exactly as it appeared in the identifier.
    pub fn version(&self) -> &str {
        &self.version
    }
}
impl FromStr for Release {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((code, version)) = s.split_once('-') else {
            exn::bail!(ErrorKind::InvalidRelease(s.to_string()));
        };
        let Some(edition) = Edition::from_code(code) else {
            exn::bail!(ErrorKind::InvalidRelease(s.to_string()));
        };
        if version.is_empty() {
            exn::bail!(ErrorKind::InvalidRelease(s.to_string()));
        }
        Ok(Self::new(edition, version))
    }
}
impl Display for Release {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}-{}", self.edition.code(), self.version)
    }
}
