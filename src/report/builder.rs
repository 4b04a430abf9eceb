//! Role entry construction.
//!
//! Turns raw role assignments into `RoleEntry` records. A failing AU lookup
//! only marks its own entry; role definition failures abort the run.

use tracing::{debug, info, warn};

use super::member::{self, MemberRecord};
use super::scope::{classify, ScopeKind};
use crate::directory::{DirectoryClient, RoleAssignment};
use crate::error::{GraphError, ReportError};

pub const TENANT_WIDE_SCOPE: &str = "/ (Tenant-wide)";
pub const NOT_SCOPED_TO_AU: &str = "Not scoped to an AU";
pub const NOT_APPLICABLE: &str = "N/A";
pub const FAILED_AU: &str = "[Failed to retrieve AU]";
pub const UNKNOWN_SCOPE: &str = "Unknown scope";
/// Displayed when the assignment carries an empty scope string.
pub const EMPTY_SCOPE: &str = "(empty scope)";

/// A fully resolved role assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleEntry {
    pub role_name: String,
    pub role_description: String,
    pub scope: String,
    pub au_name: String,
    pub au_id: String,
    /// Empty for tenant-wide scope, failed or unknown scopes, and empty AUs.
    pub members: Vec<MemberRecord>,
}

/// Who the report is about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subject {
    /// The signed-in caller.
    CurrentUser,
    /// Object ID or user principal name.
    Explicit(String),
}

/// Build one entry per assignment of `subject`, in the order the directory returns them.
pub async fn build_report<C>(client: &C, subject: &Subject) -> Result<Vec<RoleEntry>, ReportError>
where
    C: DirectoryClient + ?Sized,
{
    let principal_id = resolve_subject(client, subject).await?;
    info!("Building role report for principal {}", principal_id);

    let assignments = client
        .list_role_assignments(&principal_id)
        .await
        .map_err(|source| ReportError::Assignments {
            principal_id: principal_id.clone(),
            source,
        })?;

    let mut entries = Vec::with_capacity(assignments.len());
    for assignment in &assignments {
        entries.push(build_entry(client, assignment).await?);
    }

    info!("Resolved {} role entries", entries.len());
    Ok(entries)
}

async fn resolve_subject<C>(client: &C, subject: &Subject) -> Result<String, ReportError>
where
    C: DirectoryClient + ?Sized,
{
    match subject {
        Subject::CurrentUser => {
            client
                .current_principal_id()
                .await
                .map_err(|source| ReportError::Subject {
                    subject: "signed-in user".to_string(),
                    source,
                })
        }
        Subject::Explicit(subject) => client
            .resolve_principal_id(subject)
            .await
            .map_err(|source| ReportError::Subject {
                subject: subject.clone(),
                source,
            }),
    }
}

/// Resolve a single assignment.
pub async fn build_entry<C>(client: &C, assignment: &RoleAssignment) -> Result<RoleEntry, ReportError>
where
    C: DirectoryClient + ?Sized,
{
    let role = client
        .get_role_definition(&assignment.role_definition_id)
        .await
        .map_err(|source| ReportError::RoleDefinition {
            role_definition_id: assignment.role_definition_id.clone(),
            source,
        })?;

    debug!(
        "Resolving assignment {} ({}) at scope {}",
        assignment.id, role.display_name, assignment.directory_scope_id
    );

    let mut entry = RoleEntry {
        role_name: role.display_name,
        role_description: role.description.unwrap_or_default(),
        scope: String::new(),
        au_name: String::new(),
        au_id: String::new(),
        members: Vec::new(),
    };

    let raw_scope = assignment.directory_scope_id.as_str();
    match classify(raw_scope) {
        ScopeKind::TenantWide => {
            entry.scope = TENANT_WIDE_SCOPE.to_string();
            entry.au_name = NOT_SCOPED_TO_AU.to_string();
            entry.au_id = NOT_APPLICABLE.to_string();
        }
        ScopeKind::AdministrativeUnit(fragment) => {
            entry.scope = raw_scope.to_string();
            match resolve_unit(client, &fragment).await {
                Ok((au_id, au_name, members)) => {
                    entry.au_id = au_id;
                    entry.au_name = au_name;
                    entry.members = members;
                }
                Err(e) => {
                    warn!(
                        "Failed to resolve administrative unit {} for role {}: {}",
                        fragment, entry.role_name, e
                    );
                    entry.au_name = FAILED_AU.to_string();
                    entry.au_id = fragment;
                }
            }
        }
        ScopeKind::Unrecognized(raw) => {
            warn!("Unrecognized directory scope '{}' for role {}", raw, entry.role_name);
            entry.scope = if raw.is_empty() {
                EMPTY_SCOPE.to_string()
            } else {
                raw.clone()
            };
            entry.au_name = UNKNOWN_SCOPE.to_string();
            entry.au_id = raw;
        }
    }

    Ok(entry)
}

/// AU details, membership and member resolution as one unit of work.
async fn resolve_unit<C>(
    client: &C,
    fragment: &str,
) -> Result<(String, String, Vec<MemberRecord>), GraphError>
where
    C: DirectoryClient + ?Sized,
{
    let unit = client.get_administrative_unit(fragment).await?;
    let refs = client.list_administrative_unit_members(&unit.id).await?;
    debug!("Administrative unit {} has {} members", unit.id, refs.len());

    let mut members = Vec::with_capacity(refs.len());
    for reference in &refs {
        members.push(member::resolve(client, reference).await?);
    }

    let name = unit.name_or_id();
    Ok((unit.id, name, members))
}
