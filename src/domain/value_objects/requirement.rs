//! Requirement Value Objects
//!
//! `PackageName` (normalized), `Specifier` (one version comparison) and
//! `Requirement` (`name[extras] specifier, specifier ; marker`).

use std::fmt;
use std::str::FromStr;

use super::version::Version;

/// Normalized package name: lowercase, with runs of `-`, `_`, `.` collapsed to `-`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackageName(String);

impl PackageName {
    pub fn new(raw: &str) -> Result<Self, RequirementError> {
        let raw = raw.trim();
        let valid_edges = raw
            .chars()
            .next()
            .zip(raw.chars().last())
            .is_some_and(|(first, last)| {
                first.is_ascii_alphanumeric() && last.is_ascii_alphanumeric()
            });
        if !valid_edges
            || !raw
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        {
            return Err(RequirementError::new(raw, "invalid package name"));
        }

        let mut normalized = String::with_capacity(raw.len());
        let mut in_separator = false;
        for c in raw.chars() {
            if matches!(c, '-' | '_' | '.') {
                if !in_separator {
                    normalized.push('-');
                }
                in_separator = true;
            } else {
                normalized.push(c.to_ascii_lowercase());
                in_separator = false;
            }
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PackageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequirementError {
    pub input: String,
    pub message: String,
}

impl RequirementError {
    fn new(input: &str, message: impl Into<String>) -> Self {
        Self {
            input: input.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for RequirementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid requirement '{}': {}", self.input, self.message)
    }
}

impl std::error::Error for RequirementError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Equal,
    NotEqual,
    GreaterEq,
    LessEq,
    Greater,
    Less,
    Compatible,
}

impl Operator {
    fn as_str(self) -> &'static str {
        match self {
            Operator::Equal => "==",
            Operator::NotEqual => "!=",
            Operator::GreaterEq => ">=",
            Operator::LessEq => "<=",
            Operator::Greater => ">",
            Operator::Less => "<",
            Operator::Compatible => "~=",
        }
    }
}

/// A single version comparison such as `>=0.110` or `==1.2.*`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Specifier {
    op: Operator,
    version: Version,
    wildcard: bool,
}

impl Specifier {
    pub fn contains(&self, candidate: &Version) -> bool {
        match self.op {
            Operator::Equal if self.wildcard => {
                candidate.release_starts_with(self.version.release())
            }
            Operator::NotEqual if self.wildcard => {
                !candidate.release_starts_with(self.version.release())
            }
            Operator::Equal => candidate == &self.version,
            Operator::NotEqual => candidate != &self.version,
            Operator::GreaterEq => candidate >= &self.version,
            Operator::LessEq => candidate <= &self.version,
            Operator::Greater => candidate > &self.version,
            Operator::Less => candidate < &self.version,
            Operator::Compatible => {
                let release = self.version.release();
                let prefix = &release[..release.len() - 1];
                candidate >= &self.version && candidate.release_starts_with(prefix)
            }
        }
    }
}

impl fmt::Display for Specifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.op.as_str(), self.version)?;
        if self.wildcard {
            f.write_str(".*")?;
        }
        Ok(())
    }
}

impl FromStr for Specifier {
    type Err = RequirementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        // Two-character operators first so `>=` is not read as `>`.
        const OPS: &[(&str, Operator)] = &[
            ("==", Operator::Equal),
            ("!=", Operator::NotEqual),
            (">=", Operator::GreaterEq),
            ("<=", Operator::LessEq),
            ("~=", Operator::Compatible),
            (">", Operator::Greater),
            ("<", Operator::Less),
        ];
        let (op, rest) = OPS
            .iter()
            .find_map(|(token, op)| s.strip_prefix(token).map(|rest| (*op, rest.trim())))
            .ok_or_else(|| RequirementError::new(s, "missing comparison operator"))?;

        let (version_str, wildcard) = match rest.strip_suffix(".*") {
            Some(prefix) => (prefix, true),
            None => (rest, false),
        };
        if wildcard && !matches!(op, Operator::Equal | Operator::NotEqual) {
            return Err(RequirementError::new(s, "wildcards are only allowed with == and !="));
        }

        let version: Version = version_str
            .parse()
            .map_err(|e: super::version::VersionParseError| {
                RequirementError::new(s, e.message)
            })?;
        if op == Operator::Compatible && version.release().len() < 2 {
            return Err(RequirementError::new(
                s,
                "~= needs at least two release segments",
            ));
        }

        Ok(Self {
            op,
            version,
            wildcard,
        })
    }
}

/// A declared dependency: `name[extras] specifiers ; marker`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    name: PackageName,
    extras: Vec<String>,
    specifiers: Vec<Specifier>,
    marker: Option<String>,
}

impl Requirement {
    pub fn name(&self) -> &PackageName {
        &self.name
    }

    pub fn extras(&self) -> &[String] {
        &self.extras
    }

    pub fn specifiers(&self) -> &[Specifier] {
        &self.specifiers
    }

    pub fn marker(&self) -> Option<&str> {
        self.marker.as_deref()
    }

    /// All specifiers hold for `version` (an empty set allows anything).
    pub fn is_satisfied_by(&self, version: &Version) -> bool {
        self.specifiers.iter().all(|s| s.contains(version))
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name.as_str())?;
        if !self.extras.is_empty() {
            write!(f, "[{}]", self.extras.join(","))?;
        }
        let specs: Vec<String> = self.specifiers.iter().map(|s| s.to_string()).collect();
        f.write_str(&specs.join(","))?;
        if let Some(marker) = &self.marker {
            write!(f, "; {}", marker)?;
        }
        Ok(())
    }
}

impl FromStr for Requirement {
    type Err = RequirementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (body, marker) = match s.split_once(';') {
            Some((body, marker)) => {
                let marker = marker.trim();
                if marker.is_empty() {
                    return Err(RequirementError::new(s, "empty environment marker"));
                }
                (body.trim(), Some(marker.to_string()))
            }
            None => (s.trim(), None),
        };

        let name_end = body
            .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
            .unwrap_or(body.len());
        let name = PackageName::new(&body[..name_end])
            .map_err(|e| RequirementError::new(s, e.message))?;
        let mut rest = body[name_end..].trim_start();

        let mut extras = Vec::new();
        if let Some(after) = rest.strip_prefix('[') {
            let close = after
                .find(']')
                .ok_or_else(|| RequirementError::new(s, "unclosed extras bracket"))?;
            for extra in after[..close].split(',') {
                let extra = extra.trim();
                if !extra.is_empty() {
                    extras.push(
                        PackageName::new(extra)
                            .map_err(|e| RequirementError::new(s, e.message))?
                            .to_string(),
                    );
                }
            }
            extras.sort();
            extras.dedup();
            rest = after[close + 1..].trim_start();
        }

        // PEP 508 allows `name (>=1.0)`
        let rest = rest
            .strip_prefix('(')
            .and_then(|r| r.strip_suffix(')'))
            .unwrap_or(rest);

        let specifiers = if rest.trim().is_empty() {
            Vec::new()
        } else {
            rest.split(',')
                .map(str::parse)
                .collect::<Result<Vec<Specifier>, _>>()?
        };

        Ok(Self {
            name,
            extras,
            specifiers,
            marker,
        })
    }
}
