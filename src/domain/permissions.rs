//! Grant/deny evaluation over a claim set.
//!
//! Two distinct mechanisms live here and are deliberately not unified:
//!
//! 1. Prefix implication: holding `resource:action` grants every
//!    more-specific colon-suffixed variant (`resource:action:own` etc.).
//!    This is string matching, not a scope hierarchy — holding
//!    `resource:action:all` does not grant `resource:action:team`.
//! 2. `scope_of`: an ordered lookup (`:all`, bare, `:team`, `:own`)
//!    resolving the effective access level when several scoped grants
//!    could apply. The check order is load-bearing for callers.

use super::SessionClaims;

/// Access level suffix of a scoped permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Own,
    Team,
    All,
}

impl Scope {
    pub fn as_str(self) -> &'static str {
        match self {
            Scope::Own => "own",
            Scope::Team => "team",
            Scope::All => "all",
        }
    }
}

/// A permission check against a list: any-of or all-of.
#[derive(Debug, Clone)]
pub struct PermissionRequirement {
    pub permissions: Vec<String>,
    pub require_all: bool,
}

impl PermissionRequirement {
    pub fn satisfied_by(&self, claims: &SessionClaims) -> bool {
        if self.require_all {
            evaluate_all(claims, &self.permissions)
        } else {
            evaluate_any(claims, &self.permissions)
        }
    }
}

/// True if the claims hold `permission` exactly, or hold a strict
/// colon-delimited prefix of it.
pub fn evaluate(claims: &SessionClaims, permission: &str) -> bool {
    claims.permissions.iter().any(|held| {
        held == permission
            || (permission.len() > held.len()
                && permission.as_bytes()[held.len()] == b':'
                && permission.starts_with(held.as_str()))
    })
}

/// True iff at least one permission evaluates true; vacuously true on an
/// empty list.
pub fn evaluate_any<S: AsRef<str>>(claims: &SessionClaims, permissions: &[S]) -> bool {
    permissions.is_empty() || permissions.iter().any(|p| evaluate(claims, p.as_ref()))
}

/// True iff every permission evaluates true.
pub fn evaluate_all<S: AsRef<str>>(claims: &SessionClaims, permissions: &[S]) -> bool {
    permissions.iter().all(|p| evaluate(claims, p.as_ref()))
}

/// Effective access level for `base`, checked in order: `base:all`, bare
/// `base` (all-equivalent), `base:team`, `base:own`. First match wins.
pub fn scope_of(claims: &SessionClaims, base: &str) -> Option<Scope> {
    if claims.permissions.contains(&format!("{base}:all")) {
        return Some(Scope::All);
    }
    if claims.permissions.contains(base) {
        return Some(Scope::All);
    }
    if claims.permissions.contains(&format!("{base}:team")) {
        return Some(Scope::Team);
    }
    if claims.permissions.contains(&format!("{base}:own")) {
        return Some(Scope::Own);
    }
    None
}
