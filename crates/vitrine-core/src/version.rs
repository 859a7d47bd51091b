//! Version parsing and comparison
//!
//! Package indexes and host builds publish version strings that are not
//! always well formed. NetBox Docker images, for example, report versions
//! such as `4.5.1-Docker-3.4.2`. [`Version::parse`] accepts those by falling
//! back to the leading `MAJOR.MINOR.PATCH` prefix, and to the `0.0.0`
//! sentinel when nothing usable is found. It never fails.

use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::sync::LazyLock;
use tracing::warn;

static STRICT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^v?(\d+(?:\.\d+)*)(?:[-_.]?(a|alpha|b|beta|c|rc)[-_.]?(\d*)|[-_.]?post[-_.]?(\d*)|[-_.]?dev[-_.]?(\d*))?$",
    )
    .expect("strict version regex is valid")
});

static PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+\.\d+\.\d+)").expect("prefix version regex is valid"));

static README_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"NetBox\s+(\d+\.\d+)(?:\.x)?",
        r"NetBox\s*>=?\s*(\d+\.\d+)",
        r"[Rr]equires\s+NetBox\s+(\d+\.\d+)",
        r"\|\s*(\d+\.\d+)\.x\s*\|",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("readme version regex is valid"))
    .collect()
});

/// Pre-release phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PreKind {
    Alpha,
    Beta,
    Rc,
}

impl PreKind {
    fn from_tag(tag: &str) -> Self {
        match tag.to_ascii_lowercase().as_str() {
            "a" | "alpha" => PreKind::Alpha,
            "b" | "beta" => PreKind::Beta,
            _ => PreKind::Rc,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            PreKind::Alpha => "a",
            PreKind::Beta => "b",
            PreKind::Rc => "rc",
        }
    }
}

/// Release qualifier, declared in ascending precedence
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Qualifier {
    Dev(u64),
    Pre(PreKind, u64),
    Final,
    Post(u64),
}

/// A comparable dotted-numeric version
///
/// Release segments compare numerically, the shorter one padded with zeros,
/// so `4.0` and `4.0.0` are equal.
#[derive(Debug, Clone)]
pub struct Version {
    release: Vec<u64>,
    qualifier: Qualifier,
}

impl Version {
    /// Build a final release from numeric segments
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            release: vec![major, minor, patch],
            qualifier: Qualifier::Final,
        }
    }

    /// The `0.0.0` value used when a version cannot be understood
    pub fn sentinel() -> Self {
        Self::new(0, 0, 0)
    }

    /// Whether this is the sentinel value
    pub fn is_sentinel(&self) -> bool {
        self.release.iter().all(|n| *n == 0) && self.qualifier == Qualifier::Final
    }

    /// Parse a version, tolerating vendor suffixes
    ///
    /// Tries a strict parse, then the leading `MAJOR.MINOR.PATCH` prefix,
    /// then returns the sentinel and logs a warning.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() {
            return Self::sentinel();
        }

        if let Some(version) = Self::try_parse(raw) {
            return version;
        }

        if let Some(prefix) = PREFIX_RE.captures(raw).and_then(|c| c.get(1)) {
            if let Some(version) = Self::try_parse(prefix.as_str()) {
                return version;
            }
        }

        warn!("Could not parse version '{}', using 0.0.0", raw);
        Self::sentinel()
    }

    /// Strict parse; `None` when the string is not a well-formed version
    pub fn try_parse(raw: &str) -> Option<Self> {
        let caps = STRICT_RE.captures(raw.trim())?;

        let release = caps
            .get(1)?
            .as_str()
            .split('.')
            .map(|part| part.parse::<u64>().ok())
            .collect::<Option<Vec<_>>>()?;

        let number = |idx: usize| -> Option<u64> {
            caps.get(idx).map(|m| m.as_str().parse::<u64>().unwrap_or(0))
        };

        let qualifier = if let Some(tag) = caps.get(2) {
            Qualifier::Pre(PreKind::from_tag(tag.as_str()), number(3).unwrap_or(0))
        } else if let Some(n) = number(4) {
            Qualifier::Post(n)
        } else if let Some(n) = number(5) {
            Qualifier::Dev(n)
        } else {
            Qualifier::Final
        };

        Some(Self { release, qualifier })
    }

    /// Numeric release segments
    pub fn release(&self) -> &[u64] {
        &self.release
    }

    /// Whether this is a pre-release or development release
    pub fn is_prerelease(&self) -> bool {
        matches!(self.qualifier, Qualifier::Pre(..) | Qualifier::Dev(_))
    }

    fn cmp_release(&self, other: &Self) -> Ordering {
        let len = self.release.len().max(other.release.len());
        for i in 0..len {
            let a = self.release.get(i).copied().unwrap_or(0);
            let b = other.release.get(i).copied().unwrap_or(0);
            match a.cmp(&b) {
                Ordering::Equal => continue,
                ord => return ord,
            }
        }
        Ordering::Equal
    }
}

impl Default for Version {
    fn default() -> Self {
        Self::sentinel()
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cmp_release(other)
            .then_with(|| self.qualifier.cmp(&other.qualifier))
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let release: Vec<String> = self.release.iter().map(|n| n.to_string()).collect();
        write!(f, "{}", release.join("."))?;
        match self.qualifier {
            Qualifier::Final => Ok(()),
            Qualifier::Pre(kind, n) => write!(f, "{}{}", kind.as_str(), n),
            Qualifier::Post(n) => write!(f, ".post{}", n),
            Qualifier::Dev(n) => write!(f, ".dev{}", n),
        }
    }
}

/// Extract a host version hint from a package description
///
/// Recognises "NetBox 4.x", "NetBox >= 4.0", "Requires NetBox 4.0" and
/// compatibility-table rows such as `| 4.5.x |`. Returns `MAJOR.MINOR`.
pub fn readme_version_hint(description: &str) -> Option<String> {
    if description.is_empty() {
        return None;
    }

    README_RES
        .iter()
        .find_map(|re| re.captures(description))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
