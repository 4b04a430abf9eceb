//! Identity directory access.
//!
//! `DirectoryClient` is the seam between the report pipeline and the
//! directory service; `GraphDirectory` implements it against Microsoft Graph.

pub mod client;
pub mod models;

use async_trait::async_trait;

use crate::error::GraphError;
use models::{AdministrativeUnit, DeviceDetails, GroupDetails, RoleDefinition, UserDetails};

pub use client::GraphDirectory;
pub use models::{DirectoryObjectRef, ObjectKind, RoleAssignment};

/// Read-only directory operations consumed by the report pipeline.
#[async_trait]
pub trait DirectoryClient: Send + Sync {
    /// Object ID of the signed-in caller.
    async fn current_principal_id(&self) -> Result<String, GraphError>;

    /// Object ID for a subject given as an object ID or user principal name.
    async fn resolve_principal_id(&self, subject: &str) -> Result<String, GraphError>;

    async fn list_role_assignments(
        &self,
        principal_id: &str,
    ) -> Result<Vec<RoleAssignment>, GraphError>;

    async fn get_role_definition(&self, id: &str) -> Result<RoleDefinition, GraphError>;

    async fn get_administrative_unit(&self, id: &str) -> Result<AdministrativeUnit, GraphError>;

    /// Members in the order the service returns them.
    async fn list_administrative_unit_members(
        &self,
        au_id: &str,
    ) -> Result<Vec<DirectoryObjectRef>, GraphError>;

    async fn get_user_details(&self, id: &str) -> Result<UserDetails, GraphError>;

    async fn get_group_details(&self, id: &str) -> Result<GroupDetails, GraphError>;

    async fn get_device_details(&self, id: &str) -> Result<DeviceDetails, GraphError>;
}
