//! In-memory directory used by pipeline tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::directory::models::{
    AdministrativeUnit, DeviceDetails, DirectoryObjectRef, GroupDetails, RoleAssignment,
    RoleDefinition, UserDetails,
};
use crate::directory::DirectoryClient;
use crate::error::GraphError;

pub struct FakeDirectory {
    me: String,
    subjects: HashMap<String, String>,
    assignments: HashMap<String, Vec<RoleAssignment>>,
    role_definitions: HashMap<String, RoleDefinition>,
    /// Keyed by the scope fragment used in lookups.
    units: HashMap<String, AdministrativeUnit>,
    /// Keyed by canonical AU ID.
    members: HashMap<String, Vec<DirectoryObjectRef>>,
    users: HashMap<String, UserDetails>,
    groups: HashMap<String, GroupDetails>,
    devices: HashMap<String, DeviceDetails>,
    /// Fragments whose AU lookup answers 403.
    forbidden_units: HashSet<String>,
    calls: AtomicUsize,
}

impl Default for FakeDirectory {
    fn default() -> Self {
        Self {
            me: "me-id".to_string(),
            subjects: HashMap::new(),
            assignments: HashMap::new(),
            role_definitions: HashMap::new(),
            units: HashMap::new(),
            members: HashMap::new(),
            users: HashMap::new(),
            groups: HashMap::new(),
            devices: HashMap::new(),
            forbidden_units: HashSet::new(),
            calls: AtomicUsize::new(0),
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

impl FakeDirectory {
    pub fn with_subject(mut self, subject: &str, principal_id: &str) -> Self {
        self.subjects
            .insert(subject.to_string(), principal_id.to_string());
        self
    }

    pub fn with_assignment(mut self, principal_id: &str, role_id: &str, scope: &str) -> Self {
        let list = self.assignments.entry(principal_id.to_string()).or_default();
        list.push(RoleAssignment {
            id: format!("assignment-{}", list.len()),
            principal_id: principal_id.to_string(),
            role_definition_id: role_id.to_string(),
            directory_scope_id: scope.to_string(),
        });
        self
    }

    pub fn with_role(mut self, id: &str, name: &str, description: &str) -> Self {
        self.role_definitions.insert(
            id.to_string(),
            RoleDefinition {
                id: id.to_string(),
                display_name: name.to_string(),
                description: non_empty(description),
            },
        );
        self
    }

    /// Register an AU reachable through `fragment`, with canonical ID `id`.
    pub fn with_unit(
        mut self,
        fragment: &str,
        id: &str,
        name: &str,
        members: Vec<DirectoryObjectRef>,
    ) -> Self {
        self.units.insert(
            fragment.to_string(),
            AdministrativeUnit {
                id: id.to_string(),
                display_name: non_empty(name),
            },
        );
        self.members.insert(id.to_string(), members);
        self
    }

    pub fn with_forbidden_unit(mut self, fragment: &str) -> Self {
        self.forbidden_units.insert(fragment.to_string());
        self
    }

    pub fn with_user(
        mut self,
        id: &str,
        name: &str,
        upn: &str,
        job_title: &str,
        enabled: Option<bool>,
    ) -> Self {
        self.users.insert(
            id.to_string(),
            UserDetails {
                display_name: non_empty(name),
                user_principal_name: non_empty(upn),
                user_type: Some("Member".to_string()),
                job_title: non_empty(job_title),
                account_enabled: enabled,
            },
        );
        self
    }

    pub fn with_group(mut self, id: &str, name: &str, mail: &str) -> Self {
        self.groups.insert(
            id.to_string(),
            GroupDetails {
                display_name: non_empty(name),
                mail: non_empty(mail),
            },
        );
        self
    }

    pub fn with_device(mut self, id: &str, name: &str, os: &str) -> Self {
        self.devices.insert(
            id.to_string(),
            DeviceDetails {
                display_name: non_empty(name),
                operating_system: non_empty(os),
            },
        );
        self
    }

    /// Number of directory calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

fn lookup<T: Clone>(map: &HashMap<String, T>, kind: &str, id: &str) -> Result<T, GraphError> {
    map.get(id)
        .cloned()
        .ok_or_else(|| GraphError::NotFound(format!("{}/{}", kind, id)))
}

#[async_trait]
impl DirectoryClient for FakeDirectory {
    async fn current_principal_id(&self) -> Result<String, GraphError> {
        self.record_call();
        Ok(self.me.clone())
    }

    async fn resolve_principal_id(&self, subject: &str) -> Result<String, GraphError> {
        self.record_call();
        lookup(&self.subjects, "users", subject)
    }

    async fn list_role_assignments(
        &self,
        principal_id: &str,
    ) -> Result<Vec<RoleAssignment>, GraphError> {
        self.record_call();
        Ok(self
            .assignments
            .get(principal_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_role_definition(&self, id: &str) -> Result<RoleDefinition, GraphError> {
        self.record_call();
        lookup(&self.role_definitions, "roleDefinitions", id)
    }

    async fn get_administrative_unit(&self, id: &str) -> Result<AdministrativeUnit, GraphError> {
        self.record_call();
        if self.forbidden_units.contains(id) {
            return Err(GraphError::Forbidden);
        }
        lookup(&self.units, "administrativeUnits", id)
    }

    async fn list_administrative_unit_members(
        &self,
        au_id: &str,
    ) -> Result<Vec<DirectoryObjectRef>, GraphError> {
        self.record_call();
        lookup(&self.members, "administrativeUnits", au_id)
    }

    async fn get_user_details(&self, id: &str) -> Result<UserDetails, GraphError> {
        self.record_call();
        lookup(&self.users, "users", id)
    }

    async fn get_group_details(&self, id: &str) -> Result<GroupDetails, GraphError> {
        self.record_call();
        lookup(&self.groups, "groups", id)
    }

    async fn get_device_details(&self, id: &str) -> Result<DeviceDetails, GraphError> {
        self.record_call();
        lookup(&self.devices, "devices", id)
    }
}
