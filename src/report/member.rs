//! Administrative unit member resolution.

use std::fmt;

use tracing::debug;

use crate::directory::{DirectoryClient, DirectoryObjectRef, ObjectKind};
use crate::error::GraphError;

/// Normalized member category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberType {
    User,
    Group,
    Device,
    Other,
}

impl fmt::Display for MemberType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::User => "User",
            Self::Group => "Group",
            Self::Device => "Device",
            Self::Other => "Other",
        };
        f.write_str(label)
    }
}

/// One resolved AU member.
///
/// Fields that don't apply to the member type are empty, so every record has
/// the same shape. `enabled` is `None` for non-users and for users whose
/// flag is unknown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberRecord {
    pub member_type: MemberType,
    pub name: String,
    /// UPN for users, mail for groups, operating system for devices.
    pub secondary_identifier: String,
    pub job_title: String,
    pub enabled: Option<bool>,
}

impl MemberRecord {
    fn non_user(member_type: MemberType, name: String, secondary_identifier: String) -> Self {
        Self {
            member_type,
            name,
            secondary_identifier,
            job_title: String::new(),
            enabled: None,
        }
    }

    /// `True`, `False`, or empty.
    pub fn enabled_label(&self) -> &'static str {
        match self.enabled {
            Some(true) => "True",
            Some(false) => "False",
            None => "",
        }
    }
}

/// Resolve a directory object reference by its declared type.
///
/// Users, groups and devices cost one lookup each; anything else becomes an
/// `Other` record named by its ID without a lookup.
pub async fn resolve<C>(client: &C, member: &DirectoryObjectRef) -> Result<MemberRecord, GraphError>
where
    C: DirectoryClient + ?Sized,
{
    let record = match &member.kind {
        ObjectKind::User => {
            let user = client.get_user_details(&member.id).await?;
            if let Some(user_type) = &user.user_type {
                debug!("User {} is a {}", member.id, user_type);
            }
            MemberRecord {
                member_type: MemberType::User,
                name: user.display_name.unwrap_or_default(),
                secondary_identifier: user.user_principal_name.unwrap_or_default(),
                job_title: user.job_title.unwrap_or_default(),
                enabled: user.account_enabled,
            }
        }
        ObjectKind::Group => {
            let group = client.get_group_details(&member.id).await?;
            MemberRecord::non_user(
                MemberType::Group,
                group.display_name.unwrap_or_default(),
                group.mail.unwrap_or_default(),
            )
        }
        ObjectKind::Device => {
            let device = client.get_device_details(&member.id).await?;
            MemberRecord::non_user(
                MemberType::Device,
                device.display_name.unwrap_or_default(),
                device.operating_system.unwrap_or_default(),
            )
        }
        ObjectKind::Other(tag) => {
            debug!("Member {} has unhandled type '{}'", member.id, tag);
            MemberRecord::non_user(MemberType::Other, member.id.clone(), String::new())
        }
    };

    Ok(record)
}
