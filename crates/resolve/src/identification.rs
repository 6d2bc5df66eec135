use relprint_fingerprint::Candidates;
use relprint_manifest::ContentHash;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// The database entry a deployment matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    /// File whose served contents matched.
    pub path: String,
    /// Hash of the served contents.
    pub hash: ContentHash,
    /// Releases recorded for that hash.
    pub candidates: Candidates,
}

/// Outcome of probing a deployment.
///
/// `Unidentified` is a normal result: the target is an unknown release, or
/// not a member of the fingerprinted family at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identification {
    Matched(Match),
    Unidentified,
}
impl Identification {
    pub fn is_identified(&self) -> bool {
        matches!(self, Self::Matched(_))
    }

    pub fn candidates(&self) -> Option<&Candidates> {
        match self {
            Self::Matched(found) => Some(&found.candidates),
            Self::Unidentified => None,
        }
    }
}

/// One `Edition`/`Version` block per edition, separated by `OR`.
impl Display for Identification {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let Self::Matched(found) = self else {
            return f.write_str("Unable to identify release");
        };
        let blocks: Vec<String> = found
            .candidates
            .iter()
            .map(|(edition, versions)| format!("Edition: {edition}\nVersion: {}", versions.join(", ")))
            .collect();
        f.write_str(&blocks.join("\nOR\n"))
    }
}
