//! Role assignment scope classification.

/// Prefix of AU-restricted directory scopes.
pub const AU_SCOPE_PREFIX: &str = "/administrativeUnits/";

/// Directory scope of a role assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeKind {
    /// "/"
    TenantWide,
    /// AU ID fragment after the prefix; may differ from the canonical ID.
    AdministrativeUnit(String),
    Unrecognized(String),
}

/// Classify a raw `directoryScopeId`. Total over all inputs.
pub fn classify(scope_id: &str) -> ScopeKind {
    if scope_id == "/" {
        return ScopeKind::TenantWide;
    }

    match scope_id.strip_prefix(AU_SCOPE_PREFIX) {
        Some(fragment) => ScopeKind::AdministrativeUnit(fragment.to_string()),
        None => ScopeKind::Unrecognized(scope_id.to_string()),
    }
}
