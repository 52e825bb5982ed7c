//! Package Version Value Object
//!
//! A subset of PEP 440 versions: dotted release numbers with optional
//! pre-release, post-release and development segments. Epochs and local
//! version labels are rejected.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Pre-release phase, ordered alpha < beta < release candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PreKind {
    Alpha,
    Beta,
    Rc,
}

impl PreKind {
    fn as_str(self) -> &'static str {
        match self {
            PreKind::Alpha => "a",
            PreKind::Beta => "b",
            PreKind::Rc => "rc",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionParseError {
    pub input: String,
    pub message: &'static str,
}

impl fmt::Display for VersionParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid version '{}': {}", self.input, self.message)
    }
}

impl std::error::Error for VersionParseError {}

#[derive(Debug, Clone)]
pub struct Version {
    release: Vec<u64>,
    pre: Option<(PreKind, u64)>,
    post: Option<u64>,
    dev: Option<u64>,
}

/// Pre-release sort key: a bare `.devN` release sorts before every pre-release.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum PreKey {
    Min,
    Pre(PreKind, u64),
    Max,
}

impl Version {
    pub fn release(&self) -> &[u64] {
        &self.release
    }

    pub fn is_prerelease(&self) -> bool {
        self.pre.is_some() || self.dev.is_some()
    }

    fn pre_key(&self) -> PreKey {
        match (self.pre, self.post, self.dev) {
            (None, None, Some(_)) => PreKey::Min,
            (Some((kind, n)), _, _) => PreKey::Pre(kind, n),
            _ => PreKey::Max,
        }
    }

    fn dev_key(&self) -> (bool, u64) {
        match self.dev {
            Some(n) => (false, n),
            None => (true, 0),
        }
    }

    /// Release segment at `idx`, zero-padded.
    fn segment(&self, idx: usize) -> u64 {
        self.release.get(idx).copied().unwrap_or(0)
    }

    fn cmp_release(&self, other: &Self) -> Ordering {
        let len = self.release.len().max(other.release.len());
        (0..len)
            .map(|i| self.segment(i).cmp(&other.segment(i)))
            .find(|o| o.is_ne())
            .unwrap_or(Ordering::Equal)
    }

    /// True when this version's release starts with `prefix` (zero-padded).
    pub fn release_starts_with(&self, prefix: &[u64]) -> bool {
        prefix
            .iter()
            .enumerate()
            .all(|(i, segment)| self.segment(i) == *segment)
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cmp_release(other)
            .then_with(|| self.pre_key().cmp(&other.pre_key()))
            .then_with(|| self.post.cmp(&other.post))
            .then_with(|| self.dev_key().cmp(&other.dev_key()))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let release: Vec<String> = self.release.iter().map(|n| n.to_string()).collect();
        write!(f, "{}", release.join("."))?;
        if let Some((kind, n)) = self.pre {
            write!(f, "{}{}", kind.as_str(), n)?;
        }
        if let Some(n) = self.post {
            write!(f, ".post{}", n)?;
        }
        if let Some(n) = self.dev {
            write!(f, ".dev{}", n)?;
        }
        Ok(())
    }
}

struct Cursor<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn is_done(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn number(&mut self) -> Option<u64> {
        let digits = self
            .rest()
            .bytes()
            .take_while(|b| b.is_ascii_digit())
            .count();
        if digits == 0 {
            return None;
        }
        let value = self.rest()[..digits].parse().ok()?;
        self.pos += digits;
        Some(value)
    }

    fn separator(&mut self) -> bool {
        match self.rest().as_bytes().first() {
            Some(b'.' | b'-' | b'_') => {
                self.pos += 1;
                true
            }
            _ => false,
        }
    }

    /// Consume the longest matching keyword, returning its index in `words`.
    fn keyword(&mut self, words: &[&str]) -> Option<usize> {
        let rest = self.rest();
        let (idx, word) = words
            .iter()
            .enumerate()
            .filter(|(_, w)| rest.starts_with(**w))
            .max_by_key(|(_, w)| w.len())?;
        self.pos += word.len();
        Some(idx)
    }

    /// Try an optional `[sep]keyword[sep]N` segment, rewinding on no match.
    fn labelled(&mut self, words: &[&str]) -> Option<(usize, u64)> {
        let start = self.pos;
        self.separator();
        match self.keyword(words) {
            Some(idx) => {
                let before_num = self.pos;
                let had_sep = self.separator();
                let n = match self.number() {
                    Some(n) => n,
                    None => {
                        if had_sep {
                            self.pos = before_num;
                        }
                        0
                    }
                };
                Some((idx, n))
            }
            None => {
                self.pos = start;
                None
            }
        }
    }
}

impl FromStr for Version {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = |message| VersionParseError {
            input: s.to_string(),
            message,
        };
        let lowered = s.trim().to_ascii_lowercase();
        let body = lowered.strip_prefix('v').unwrap_or(&lowered);
        if body.is_empty() {
            return Err(err("empty version"));
        }
        if body.contains('!') {
            return Err(err("epochs are not supported"));
        }
        if body.contains('+') {
            return Err(err("local version labels are not supported"));
        }

        let mut cur = Cursor {
            input: body,
            pos: 0,
        };

        let mut release = vec![cur.number().ok_or_else(|| err("missing release number"))?];
        loop {
            let save = cur.pos;
            if cur.rest().starts_with('.') {
                cur.pos += 1;
                if let Some(n) = cur.number() {
                    release.push(n);
                    continue;
                }
            }
            cur.pos = save;
            break;
        }

        const PRE: &[&str] = &["a", "alpha", "b", "beta", "rc", "c", "pre", "preview"];
        let pre = cur.labelled(PRE).map(|(idx, n)| {
            let kind = match PRE[idx] {
                "a" | "alpha" => PreKind::Alpha,
                "b" | "beta" => PreKind::Beta,
                _ => PreKind::Rc,
            };
            (kind, n)
        });

        let post = match cur.labelled(&["post", "rev", "r"]) {
            Some((_, n)) => Some(n),
            None => {
                // Implicit post release: `1.0-1`
                let save = cur.pos;
                if cur.rest().starts_with('-') {
                    cur.pos += 1;
                    match cur.number() {
                        Some(n) => Some(n),
                        None => {
                            cur.pos = save;
                            None
                        }
                    }
                } else {
                    None
                }
            }
        };

        let dev = cur.labelled(&["dev"]).map(|(_, n)| n);

        if !cur.is_done() {
            return Err(err("unexpected trailing characters"));
        }

        Ok(Version {
            release,
            pre,
            post,
            dev,
        })
    }
}
