//! Groups and the reserved `everyone` group (spec §3 Group, invariant 4).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

crate::define_id! {
    pub struct GroupId("grp_");
}

pub const EVERYONE_GROUP_NAME: &str = "everyone";

/// Returns the well-known id of the `everyone` group (spec: `grp_everyone`).
///
/// `GroupId` ids are otherwise random 23-byte ids; `everyone` is the one
/// exception, so it can be found without a name lookup.
pub fn everyone_group_id() -> GroupId {
    GroupId::from_string(format!("{}{}", GroupId::PREFIX, EVERYONE_GROUP_NAME))
}

/// What kind of principal a group member (or mention target) is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberKind {
    Agent,
    Role,
    Group,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Member {
    pub kind: MemberKind,
    pub value: String,
}

impl Member {
    pub fn new(kind: MemberKind, value: impl Into<String>) -> Self {
        Self { kind, value: value.into() }
    }

    pub fn agent(value: impl Into<String>) -> Self {
        Self::new(MemberKind::Agent, value)
    }

    pub fn role(value: impl Into<String>) -> Self {
        Self::new(MemberKind::Role, value)
    }

    pub fn group(value: impl Into<String>) -> Self {
        Self::new(MemberKind::Group, value)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub group_id: GroupId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub members: HashSet<Member>,
}

impl Group {
    pub fn is_everyone(&self) -> bool {
        self.group_id == everyone_group_id()
    }
}

#[cfg(test)]
#[path = "group_tests.rs"]
mod tests;
