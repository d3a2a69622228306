//! Sender allow-list checks.

/// Check whether `sender_id` may use the relay.
///
/// Matching is exact after trimming both sides. An empty allow-list
/// denies everyone; a misconfigured deployment must fail closed rather
/// than accept the whole world.
#[must_use]
pub fn is_authorized(allowlist: &[String], sender_id: &str) -> bool {
    let id = sender_id.trim();
    !id.is_empty() && allowlist.iter().any(|entry| entry.trim() == id)
}
