//! Directory data models returned by Microsoft Graph.

use serde::{Deserialize, Serialize};

/// A directory role assignment (`/roleManagement/directory/roleAssignments`).
#[allow(dead_code)]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RoleAssignment {
    /// Assignment ID.
    #[serde(default)]
    pub id: String,

    /// Object ID of the principal holding the role.
    pub principal_id: String,

    /// Role definition (template) ID.
    pub role_definition_id: String,

    /// Scope the assignment applies to.
    /// Either "/" or "/administrativeUnits/{id}".
    pub directory_scope_id: String,
}

/// A directory role definition.
#[allow(dead_code)]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RoleDefinition {
    pub id: String,

    /// Human-readable role name (e.g., "User Administrator").
    pub display_name: String,

    #[serde(default)]
    pub description: Option<String>,
}

/// An administrative unit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AdministrativeUnit {
    /// Canonical AU object ID.
    pub id: String,

    #[serde(default)]
    pub display_name: Option<String>,
}

impl AdministrativeUnit {
    /// Get the AU display name or its ID.
    pub fn name_or_id(&self) -> String {
        self.display_name.clone().unwrap_or_else(|| self.id.clone())
    }
}

/// Declared object type of a directory object reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectKind {
    User,
    Group,
    Device,
    /// Any other type tag, kept verbatim (may be empty).
    Other(String),
}

impl ObjectKind {
    /// Map a Graph `@odata.type` tag (e.g. "#microsoft.graph.user").
    pub fn from_odata_type(tag: &str) -> Self {
        match tag {
            "#microsoft.graph.user" => Self::User,
            "#microsoft.graph.group" => Self::Group,
            "#microsoft.graph.device" => Self::Device,
            other => Self::Other(other.to_string()),
        }
    }
}

/// A type-tagged pointer to a directory object, as listed by AU membership.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawDirectoryObject")]
pub struct DirectoryObjectRef {
    pub id: String,
    pub kind: ObjectKind,
}

impl DirectoryObjectRef {
    #[allow(dead_code)]
    pub fn new(id: impl Into<String>, kind: ObjectKind) -> Self {
        Self {
            id: id.into(),
            kind,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawDirectoryObject {
    id: String,
    #[serde(rename = "@odata.type", default)]
    odata_type: String,
}

impl From<RawDirectoryObject> for DirectoryObjectRef {
    fn from(raw: RawDirectoryObject) -> Self {
        Self {
            id: raw.id,
            kind: ObjectKind::from_odata_type(&raw.odata_type),
        }
    }
}

/// Extended user attributes.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserDetails {
    pub display_name: Option<String>,
    pub user_principal_name: Option<String>,
    /// "Member" or "Guest".
    pub user_type: Option<String>,
    pub job_title: Option<String>,
    pub account_enabled: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GroupDetails {
    pub display_name: Option<String>,
    pub mail: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeviceDetails {
    pub display_name: Option<String>,
    pub operating_system: Option<String>,
}

/// Minimal object carrying only an ID (`/me`, `/users/{upn}`).
#[derive(Debug, Deserialize)]
pub(crate) struct ObjectId {
    pub id: String,
}

/// One page of a Graph collection response.
#[derive(Debug, Deserialize)]
pub(crate) struct CollectionPage<T> {
    pub value: Vec<T>,
    #[serde(rename = "@odata.nextLink", default)]
    pub next_link: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_page_decodes_type_tags() {
        let json = r##"{
            "@odata.context": "https://graph.microsoft.com/v1.0/$metadata#directoryObjects",
            "value": [
                {"@odata.type": "#microsoft.graph.user", "id": "u1", "displayName": "Felix"},
                {"@odata.type": "#microsoft.graph.group", "id": "g1"},
                {"@odata.type": "#microsoft.graph.device", "id": "d1"},
                {"@odata.type": "#microsoft.graph.servicePrincipal", "id": "sp1"},
                {"id": "x1"}
            ],
            "@odata.nextLink": "https://graph.microsoft.com/v1.0/next"
        }"##;

        let page: CollectionPage<DirectoryObjectRef> = serde_json::from_str(json).unwrap();
        let kinds: Vec<ObjectKind> = page.value.into_iter().map(|r| r.kind).collect();

        assert_eq!(
            kinds,
            vec![
                ObjectKind::User,
                ObjectKind::Group,
                ObjectKind::Device,
                ObjectKind::Other("#microsoft.graph.servicePrincipal".into()),
                ObjectKind::Other(String::new()),
            ]
        );
        assert_eq!(
            page.next_link.as_deref(),
            Some("https://graph.microsoft.com/v1.0/next")
        );
    }

    #[test]
    fn test_role_assignment_decodes() {
        let json = r#"{
            "id": "lAPpYvVpN0KRkAEhdxReEJC2sEqbR_9Hr48lds9SGHI-1",
            "principalId": "4ab0b690-479b-47ff-af8f-2576cf521872",
            "roleDefinitionId": "fe930be7-5e62-47db-91af-98c3a49a38b1",
            "directoryScopeId": "/administrativeUnits/5d107bba-d8e2-4e13-b6ae-884be90e5d1a"
        }"#;

        let assignment: RoleAssignment = serde_json::from_str(json).unwrap();
        assert_eq!(assignment.role_definition_id, "fe930be7-5e62-47db-91af-98c3a49a38b1");
        assert!(assignment.directory_scope_id.starts_with("/administrativeUnits/"));
    }

    #[test]
    fn test_user_details_tolerate_nulls() {
        let json = r#"{"displayName": "Guest", "userPrincipalName": null, "accountEnabled": false}"#;
        let user: UserDetails = serde_json::from_str(json).unwrap();

        assert_eq!(user.display_name.as_deref(), Some("Guest"));
        assert_eq!(user.user_principal_name, None);
        assert_eq!(user.job_title, None);
        assert_eq!(user.account_enabled, Some(false));
    }

    #[test]
    fn test_au_name_fallback() {
        let au = AdministrativeUnit {
            id: "au-1".into(),
            display_name: None,
        };
        assert_eq!(au.name_or_id(), "au-1");
    }
}
