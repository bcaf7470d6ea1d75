use crate::error::CallboardError;

/// Slugs that collide with system routes and can never name an event.
pub const RESERVED_SLUGS: &[&str] = &["admin", "api", "auth", "dashboard", "_next"];

/// Validate an event slug: lowercase letters, digits, and hyphens, with a
/// letter or digit first. The reserved set is checked before the pattern
/// so names like `_next` always surface as reserved, not malformed.
pub fn validate_slug(slug: &str) -> Result<(), CallboardError> {
    if RESERVED_SLUGS.contains(&slug) {
        return Err(CallboardError::ReservedSlug);
    }
    let mut chars = slug.chars();
    let lead_ok = chars
        .next()
        .is_some_and(|c| c.is_ascii_lowercase() || c.is_ascii_digit());
    let rest_ok = chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if !lead_ok || !rest_ok {
        return Err(CallboardError::InvalidSlug(slug.to_string()));
    }
    Ok(())
}
