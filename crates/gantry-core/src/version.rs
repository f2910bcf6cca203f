//! Semantic version bumping

use std::str::FromStr;

use semver::{BuildMetadata, Prerelease, Version};
use serde::{Deserialize, Serialize};

use crate::error::VersionError;

/// Result type for version operations
pub type Result<T> = std::result::Result<T, VersionError>;

/// Kind of version bump
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BumpKind {
    /// Patch bump (bug fixes)
    Patch,
    /// Minor bump (new features)
    Minor,
    /// Major bump (breaking changes)
    Major,
    /// Patch bump entering a prerelease
    Prepatch,
    /// Minor bump entering a prerelease
    Preminor,
    /// Major bump entering a prerelease
    Premajor,
    /// Increment the current prerelease
    Prerelease,
}

impl BumpKind {
    /// All accepted kinds, in documentation order
    pub const ALL: [BumpKind; 7] = [
        BumpKind::Patch,
        BumpKind::Minor,
        BumpKind::Major,
        BumpKind::Prepatch,
        BumpKind::Preminor,
        BumpKind::Premajor,
        BumpKind::Prerelease,
    ];
}

impl FromStr for BumpKind {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "patch" => Ok(Self::Patch),
            "minor" => Ok(Self::Minor),
            "major" => Ok(Self::Major),
            "prepatch" => Ok(Self::Prepatch),
            "preminor" => Ok(Self::Preminor),
            "premajor" => Ok(Self::Premajor),
            "prerelease" => Ok(Self::Prerelease),
            other => Err(VersionError::InvalidBumpKind(other.to_string())),
        }
    }
}

impl std::fmt::Display for BumpKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Patch => "patch",
            Self::Minor => "minor",
            Self::Major => "major",
            Self::Prepatch => "prepatch",
            Self::Preminor => "preminor",
            Self::Premajor => "premajor",
            Self::Prerelease => "prerelease",
        };
        write!(f, "{}", s)
    }
}

/// Bump a version string, returning the formatted result
///
/// The result is always strictly greater than the input under semver
/// ordering. Build metadata is cleared on every bump.
pub fn bump(current: &str, kind: BumpKind) -> Result<String> {
    let mut v = Version::parse(current)
        .map_err(|e| VersionError::ParseFailed(current.to_string(), e.to_string()))?;

    match kind {
        BumpKind::Major => {
            v.major += 1;
            v.minor = 0;
            v.patch = 0;
            v.pre = Prerelease::EMPTY;
        }
        BumpKind::Minor => {
            v.minor += 1;
            v.patch = 0;
            v.pre = Prerelease::EMPTY;
        }
        BumpKind::Patch => {
            // A prerelease graduates to its release version
            if v.pre.is_empty() {
                v.patch += 1;
            } else {
                v.pre = Prerelease::EMPTY;
            }
        }
        BumpKind::Premajor => {
            v.major += 1;
            v.minor = 0;
            v.patch = 0;
            v.pre = initial_prerelease();
        }
        BumpKind::Preminor => {
            v.minor += 1;
            v.patch = 0;
            v.pre = initial_prerelease();
        }
        BumpKind::Prepatch => {
            v.patch += 1;
            v.pre = initial_prerelease();
        }
        BumpKind::Prerelease => {
            if v.pre.is_empty() {
                v.patch += 1;
                v.pre = initial_prerelease();
            } else {
                let next = increment_prerelease(v.pre.as_str());
                v.pre = Prerelease::new(&next)
                    .map_err(|e| VersionError::ParseFailed(next, e.to_string()))?;
            }
        }
    }

    v.build = BuildMetadata::EMPTY;
    Ok(v.to_string())
}

fn initial_prerelease() -> Prerelease {
    Prerelease::new("0").expect("valid prerelease")
}

/// Increment the trailing numeric segment of a prerelease identifier
fn increment_prerelease(pre: &str) -> String {
    if let Ok(n) = pre.parse::<u64>() {
        return (n + 1).to_string();
    }

    if let Some(pos) = pre.rfind('.') {
        if let Ok(n) = pre[pos + 1..].parse::<u64>() {
            return format!("{}.{}", &pre[..pos], n + 1);
        }
    }

    // No numeric segment to increment, start one
    format!("{}.0", pre)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kinds() {
        assert_eq!("patch".parse::<BumpKind>().unwrap(), BumpKind::Patch);
        assert_eq!(
            "prerelease".parse::<BumpKind>().unwrap(),
            BumpKind::Prerelease
        );
    }

    #[test]
    fn test_parse_invalid_kind() {
        let result = "premium".parse::<BumpKind>();
        assert!(matches!(result, Err(VersionError::InvalidBumpKind(_))));
    }

    #[test]
    fn test_bump_patch() {
        assert_eq!(bump("1.2.3", BumpKind::Patch).unwrap(), "1.2.4");
    }

    #[test]
    fn test_bump_minor() {
        assert_eq!(bump("1.2.3", BumpKind::Minor).unwrap(), "1.3.0");
    }

    #[test]
    fn test_bump_major() {
        assert_eq!(bump("1.2.3", BumpKind::Major).unwrap(), "2.0.0");
    }

    #[test]
    fn test_patch_graduates_prerelease() {
        assert_eq!(bump("1.2.3-alpha.1", BumpKind::Patch).unwrap(), "1.2.3");
    }

    #[test]
    fn test_bump_prepatch() {
        assert_eq!(bump("1.2.3", BumpKind::Prepatch).unwrap(), "1.2.4-0");
    }

    #[test]
    fn test_bump_preminor() {
        assert_eq!(bump("1.2.3", BumpKind::Preminor).unwrap(), "1.3.0-0");
    }

    #[test]
    fn test_bump_premajor() {
        assert_eq!(bump("1.2.3", BumpKind::Premajor).unwrap(), "2.0.0-0");
    }

    #[test]
    fn test_bump_prerelease_from_release() {
        assert_eq!(bump("1.2.3", BumpKind::Prerelease).unwrap(), "1.2.4-0");
    }

    #[test]
    fn test_bump_prerelease_numeric() {
        assert_eq!(bump("1.2.3-0", BumpKind::Prerelease).unwrap(), "1.2.3-1");
    }

    #[test]
    fn test_bump_prerelease_named() {
        assert_eq!(
            bump("1.2.3-alpha.1", BumpKind::Prerelease).unwrap(),
            "1.2.3-alpha.2"
        );
    }

    #[test]
    fn test_bump_prerelease_without_number() {
        assert_eq!(
            bump("1.2.3-alpha", BumpKind::Prerelease).unwrap(),
            "1.2.3-alpha.0"
        );
    }

    #[test]
    fn test_bump_clears_build_metadata() {
        assert_eq!(bump("1.2.3+build.5", BumpKind::Patch).unwrap(), "1.2.4");
    }

    #[test]
    fn test_all_kinds_strictly_increase() {
        for version in ["0.0.1", "1.2.3", "1.2.3-alpha.1", "10.0.0-rc.9"] {
            let before = Version::parse(version).unwrap();
            for kind in BumpKind::ALL {
                let after = Version::parse(&bump(version, kind).unwrap()).unwrap();
                assert!(
                    after > before,
                    "{} bumped with {} gave {}, not greater",
                    before,
                    kind,
                    after
                );
            }
        }
    }

    #[test]
    fn test_bump_invalid_version() {
        let result = bump("not-a-version", BumpKind::Patch);
        assert!(matches!(result, Err(VersionError::ParseFailed(_, _))));
    }
}
