use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::HostError;
use crate::host::content::Bitstream;
use crate::host::context::Context;

/// Group id the host assigns to the anonymous (unauthenticated) group
pub const ANONYMOUS_GROUP_ID: u32 = 0;

/// Actions a resource policy can grant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    Read,
    Write,
    Delete,
    Add,
    Remove,
    Admin,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Read => "READ",
            Self::Write => "WRITE",
            Self::Delete => "DELETE",
            Self::Add => "ADD",
            Self::Remove => "REMOVE",
            Self::Admin => "ADMIN",
        };
        f.write_str(name)
    }
}

/// A grant of one action on one resource to a group or an eperson
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourcePolicy {
    pub action: Action,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eperson_id: Option<u32>,
}

impl ResourcePolicy {
    pub fn for_group(action: Action, group_id: u32) -> Self {
        Self { action, group_id: Some(group_id), eperson_id: None }
    }

    pub fn is_anonymous(&self) -> bool {
        self.group_id == Some(ANONYMOUS_GROUP_ID)
    }
}

/// Host authorization lookups
pub trait AuthorizeService: Send + Sync {
    /// Policies on `bitstream` that grant `action`
    fn policies_for_action(
        &self,
        context: &dyn Context,
        bitstream: &Bitstream,
        action: Action,
    ) -> Result<Vec<ResourcePolicy>, HostError>;
}
