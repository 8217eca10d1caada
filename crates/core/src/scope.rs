//! Scope, Ref, and MentionTarget — the typed tags attached to messages and
//! sessions (spec §3, GLOSSARY).

use serde::{Deserialize, Serialize};

/// The audience/context a scope addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeKind {
    Module,
    Group,
    Session,
    Agent,
    Role,
    Worktree,
}

/// A typed tag attached to a message or session, identifying an audience
/// or context. Equality is by `(kind, value)`, matching the
/// SubscriptionMatcher's scope-equality check (spec §4.6).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Scope {
    #[serde(rename = "type")]
    pub kind: ScopeKind,
    pub value: String,
}

impl Scope {
    pub fn new(kind: ScopeKind, value: impl Into<String>) -> Self {
        Self { kind, value: value.into() }
    }

    pub fn module(value: impl Into<String>) -> Self {
        Self::new(ScopeKind::Module, value)
    }

    pub fn group(value: impl Into<String>) -> Self {
        Self::new(ScopeKind::Group, value)
    }

    pub fn session(value: impl Into<String>) -> Self {
        Self::new(ScopeKind::Session, value)
    }

    pub fn agent(value: impl Into<String>) -> Self {
        Self::new(ScopeKind::Agent, value)
    }

    pub fn role(value: impl Into<String>) -> Self {
        Self::new(ScopeKind::Role, value)
    }

    pub fn worktree(value: impl Into<String>) -> Self {
        Self::new(ScopeKind::Worktree, value)
    }
}

/// A free-form typed auxiliary reference attached to a message or session
/// (`reply_to`, `worktree`, `task`, …).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ref {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
}

impl Ref {
    pub fn new(kind: impl Into<String>, value: impl Into<String>) -> Self {
        Self { kind: kind.into(), value: value.into() }
    }

    pub fn worktree(path: impl Into<String>) -> Self {
        Self::new("worktree", path)
    }

    pub fn reply_to(message_id: impl Into<String>) -> Self {
        Self::new("reply_to", message_id)
    }
}

/// The kind of entity a message `@mention` targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MentionKind {
    Agent,
    Role,
    Group,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MentionTarget {
    pub kind: MentionKind,
    pub value: String,
}

impl MentionTarget {
    pub fn new(kind: MentionKind, value: impl Into<String>) -> Self {
        Self { kind, value: value.into() }
    }

    pub fn agent(value: impl Into<String>) -> Self {
        Self::new(MentionKind::Agent, value)
    }

    pub fn role(value: impl Into<String>) -> Self {
        Self::new(MentionKind::Role, value)
    }

    pub fn group(value: impl Into<String>) -> Self {
        Self::new(MentionKind::Group, value)
    }
}

#[cfg(test)]
#[path = "scope_tests.rs"]
mod tests;
