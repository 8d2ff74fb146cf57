use once_cell::sync::Lazy;
use regex::Regex;

// At least resource:action; deeper bases are allowed (e.g.
// user:list:read), with an optional own/team/all scope suffix.
static PERMISSION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z][a-z0-9_-]*(?::[a-z][a-z0-9_-]*)+(?::(?:own|team|all))?$").unwrap()
});

pub fn is_valid_permission(permission: &str) -> bool {
    PERMISSION_RE.is_match(permission)
}
