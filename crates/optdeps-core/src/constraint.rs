//! Version constraint syntax checking.
//!
//! Optional packages carry Composer-style constraint expressions. The engine
//! never resolves them; it only needs to know whether a declared constraint is
//! well formed before offering the package to the user.
//!
//! Supported syntax:
//!
//! - **Alternatives** separated by `||` (or a single `|`)
//! - **Conjunctions** separated by `,` or whitespace (`>=1.0 <2.0`)
//! - **Hyphen ranges** (`1.0 - 2.0`)
//! - **Operators** `>=`, `<=`, `>`, `<`, `=`, `==`, `!=`, `<>`, `^`, `~`
//! - **Wildcards** (`*`, `1.*`, `2.1.x`, `2.1.x-dev`)
//! - **Branches** (`dev-main`)
//! - **Stability flags** (`^1.0@beta`)
//!
//! # Examples
//!
//! ```
//! use optdeps_core::constraint::VersionConstraint;
//!
//! let constraint = VersionConstraint::parse("^1.0 || ^2.0").unwrap();
//! assert_eq!(constraint.alternatives().len(), 2);
//!
//! assert!(VersionConstraint::parse(">=1.0 <2.0").is_ok());
//! assert!(VersionConstraint::parse("not a version").is_err());
//! ```

use crate::error::{Error, Result};

/// Stability flags accepted after `@`.
const STABILITY_FLAGS: &[&str] = &["stable", "rc", "beta", "alpha", "dev"];

/// A single comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// `>=`
    Gte,
    /// `>`
    Gt,
    /// `<=`
    Lte,
    /// `<`
    Lt,
    /// `=`, `==` or a bare version
    Eq,
    /// `!=` or `<>`
    Ne,
    /// `^`
    Caret,
    /// `~`
    Tilde,
}

/// One term of a conjunction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Atom {
    /// `*` or a bare stability flag.
    Any,
    /// An operator applied to a concrete version.
    Compare {
        op: Operator,
        version: semver::Version,
    },
    /// A wildcard such as `1.2.*`; holds the fixed leading components.
    Wildcard(Vec<u64>),
    /// A hyphen range, inclusive on both ends.
    Range {
        low: semver::Version,
        high: semver::Version,
    },
    /// A `dev-<branch>` reference.
    Branch(String),
}

/// A parsed version constraint expression.
///
/// The outer list holds alternatives (any may match), each alternative holds
/// atoms that must all match.
#[derive(Debug, Clone)]
pub struct VersionConstraint {
    alternatives: Vec<Vec<Atom>>,
    raw: String,
}

impl VersionConstraint {
    /// Parse a constraint expression.
    pub fn parse(constraint: &str) -> Result<Self> {
        let raw = constraint.to_string();
        let trimmed = constraint.trim();
        if trimmed.is_empty() {
            return Err(invalid(&raw, "empty constraint"));
        }

        let alternatives = trimmed
            .replace("||", "|")
            .split('|')
            .map(|alt| parse_alternative(alt).map_err(|reason| invalid(&raw, reason)))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { alternatives, raw })
    }

    /// The parsed alternatives.
    pub fn alternatives(&self) -> &[Vec<Atom>] {
        &self.alternatives
    }

    /// Return the original constraint string.
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl std::fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

fn invalid(constraint: &str, reason: impl Into<String>) -> Error {
    Error::InvalidConstraint {
        constraint: constraint.to_string(),
        reason: reason.into(),
    }
}

/// Parse one `|`-separated alternative into its conjunction of atoms.
fn parse_alternative(alt: &str) -> std::result::Result<Vec<Atom>, String> {
    let tokens: Vec<&str> = alt
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .collect();

    if tokens.is_empty() {
        return Err("empty alternative".to_string());
    }

    let mut atoms = Vec::with_capacity(tokens.len());
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i];

        // `1.0 - 2.0`
        if tokens.get(i + 1) == Some(&"-") {
            let high = tokens
                .get(i + 2)
                .ok_or_else(|| format!("hyphen range '{token} -' has no upper bound"))?;
            atoms.push(Atom::Range {
                low: normalize_version(token)?,
                high: normalize_version(high)?,
            });
            i += 3;
            continue;
        }

        // `>= 1.0` written with a space after the operator
        if is_bare_operator(token) {
            let operand = tokens
                .get(i + 1)
                .ok_or_else(|| format!("operator '{token}' has no version"))?;
            atoms.push(parse_atom(&format!("{token}{operand}"))?);
            i += 2;
            continue;
        }

        atoms.push(parse_atom(token)?);
        i += 1;
    }

    Ok(atoms)
}

fn is_bare_operator(token: &str) -> bool {
    matches!(
        token,
        ">=" | "<=" | ">" | "<" | "=" | "==" | "!=" | "<>" | "^" | "~"
    )
}

fn parse_atom(token: &str) -> std::result::Result<Atom, String> {
    let token = match token.split_once('@') {
        Some((head, flag)) => {
            if !STABILITY_FLAGS.contains(&flag.to_ascii_lowercase().as_str()) {
                return Err(format!("unknown stability flag '@{flag}'"));
            }
            head
        }
        None => token,
    };

    if token.is_empty() || token == "*" {
        return Ok(Atom::Any);
    }

    if let Some(branch) = token.strip_prefix("dev-") {
        if branch.is_empty() {
            return Err("empty branch name after 'dev-'".to_string());
        }
        return Ok(Atom::Branch(branch.to_string()));
    }

    let (op, rest) = split_operator(token);
    if rest.is_empty() {
        return Err(format!("operator in '{token}' has no version"));
    }

    if let Some(prefix) = wildcard_prefix(rest)? {
        return Ok(Atom::Wildcard(prefix));
    }

    Ok(Atom::Compare {
        op,
        version: normalize_version(rest)?,
    })
}

fn split_operator(token: &str) -> (Operator, &str) {
    const PREFIXES: &[(&str, Operator)] = &[
        (">=", Operator::Gte),
        ("<=", Operator::Lte),
        ("!=", Operator::Ne),
        ("<>", Operator::Ne),
        ("==", Operator::Eq),
        (">", Operator::Gt),
        ("<", Operator::Lt),
        ("=", Operator::Eq),
        ("^", Operator::Caret),
        ("~", Operator::Tilde),
    ];

    for (prefix, op) in PREFIXES {
        if let Some(rest) = token.strip_prefix(prefix) {
            return (*op, rest.trim());
        }
    }
    (Operator::Eq, token)
}

/// Recognize `1.*`, `1.2.x` and `1.2.x-dev`; returns `None` for plain versions.
fn wildcard_prefix(s: &str) -> std::result::Result<Option<Vec<u64>>, String> {
    let s = s.strip_suffix("-dev").unwrap_or(s);
    let s = s.strip_prefix(['v', 'V']).unwrap_or(s);
    let Some(head) = s
        .strip_suffix(".*")
        .or_else(|| s.strip_suffix(".x"))
        .or_else(|| s.strip_suffix(".X"))
    else {
        return Ok(None);
    };

    head.split('.')
        .map(|part| {
            part.parse::<u64>()
                .map_err(|_| format!("invalid wildcard version '{s}'"))
        })
        .collect::<std::result::Result<Vec<_>, _>>()
        .map(Some)
}

/// Normalize a version to semver.
///
/// - `"1.2"` -> `1.2.0`
/// - `"v1.2.3"` -> `1.2.3`
/// - `"1.2.3.4"` -> `1.2.3` (the fourth component is checked, then dropped)
/// - `"1.0-beta1"` -> `1.0.0-beta1`
fn normalize_version(s: &str) -> std::result::Result<semver::Version, String> {
    let s = s.trim();
    let bare = s.strip_prefix(['v', 'V']).unwrap_or(s);
    let (numeric, suffix) = match bare.split_once('-') {
        Some((numeric, suffix)) => (numeric, Some(suffix)),
        None => (bare, None),
    };

    let parts = numeric
        .split('.')
        .map(|p| p.parse::<u64>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|_| format!("invalid version '{s}'"))?;

    if parts.is_empty() || parts.len() > 4 {
        return Err(format!("invalid version '{s}'"));
    }

    let component = |i: usize| parts.get(i).copied().unwrap_or(0);
    let mut normalized = format!("{}.{}.{}", component(0), component(1), component(2));
    if let Some(suffix) = suffix {
        normalized.push('-');
        normalized.push_str(suffix);
    }

    semver::Version::parse(&normalized).map_err(|e| format!("invalid version '{s}': {e}"))
}
