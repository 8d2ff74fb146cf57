/// Permission an admin must hold to assume another user's session.
pub const IMPERSONATE_PERMISSION: &str = "user:impersonate";

pub const DEFAULT_ACCESS_COOKIE_NAME: &str = "access";
pub const DEFAULT_REFRESH_COOKIE_NAME: &str = "refresh";
// Shadow slots holding the admin's own pair during impersonation.
pub const ORIGINAL_ACCESS_COOKIE_NAME: &str = "original_access";
pub const ORIGINAL_REFRESH_COOKIE_NAME: &str = "original_refresh";

/// Bound on how long queued refresh callers wait for the in-flight
/// rotation before the queue is rejected.
pub const DEFAULT_REFRESH_WAIT_MS: u64 = 10_000;
