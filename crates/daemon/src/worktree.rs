//! The "worktree inspector" collaborator `session.heartbeat` consults when
//! a session carries a `worktree` ref (spec §4.3, §1 Non-goals: the actual
//! source-control helper is an external collaborator, not core scope).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thrum_core::WorkContext;

/// Snapshot of a working tree's state, handed back by [`WorktreeInspector`].
#[derive(Debug, Clone, Default)]
pub struct WorktreeSnapshot {
    pub branch: Option<String>,
    pub unmerged_commits: u32,
    pub uncommitted_files: u32,
    pub changed_files: Vec<String>,
}

/// Inspects a worktree on disk. Calls are best-effort: `session.heartbeat`
/// swallows failures rather than rejecting the heartbeat (spec §4.3).
#[async_trait]
pub trait WorktreeInspector: Send + Sync {
    async fn inspect(&self, worktree_path: &str) -> std::io::Result<WorktreeSnapshot>;
}

/// Shells out to `git` for branch name and working-tree status. A thin
/// collaborator, not a full porcelain reimplementation — Non-goals exclude
/// making this inspector part of the coordination engine's core scope.
pub struct GitWorktreeInspector;

#[async_trait]
impl WorktreeInspector for GitWorktreeInspector {
    async fn inspect(&self, worktree_path: &str) -> std::io::Result<WorktreeSnapshot> {
        let path = worktree_path.to_string();
        tokio::task::spawn_blocking(move || inspect_sync(&path))
            .await
            .map_err(|e| std::io::Error::other(e.to_string()))?
    }
}

fn inspect_sync(worktree_path: &str) -> std::io::Result<WorktreeSnapshot> {
    let branch_out = std::process::Command::new("git")
        .args(["-C", worktree_path, "rev-parse", "--abbrev-ref", "HEAD"])
        .output()?;
    let branch = String::from_utf8_lossy(&branch_out.stdout).trim().to_string();

    let status_out = std::process::Command::new("git")
        .args(["-C", worktree_path, "status", "--porcelain"])
        .output()?;
    let changed_files: Vec<String> = String::from_utf8_lossy(&status_out.stdout)
        .lines()
        .filter_map(|line| line.get(3..).map(str::to_string))
        .collect();

    let unmerged_out = std::process::Command::new("git")
        .args(["-C", worktree_path, "log", "@{u}..HEAD", "--oneline"])
        .output();
    let unmerged_commits = unmerged_out
        .ok()
        .map(|o| String::from_utf8_lossy(&o.stdout).lines().count() as u32)
        .unwrap_or(0);

    Ok(WorktreeSnapshot {
        branch: if branch.is_empty() { None } else { Some(branch) },
        unmerged_commits,
        uncommitted_files: changed_files.len() as u32,
        changed_files,
    })
}

/// Folds a [`WorktreeSnapshot`] into the session's [`WorkContext`] row,
/// preserving intent/task fields which heartbeats never touch.
pub fn apply_snapshot(
    context: &mut WorkContext,
    worktree_path: &str,
    snapshot: WorktreeSnapshot,
    now: DateTime<Utc>,
) {
    context.branch = snapshot.branch;
    context.worktree_path = Some(worktree_path.to_string());
    context.unmerged_commits = snapshot.unmerged_commits;
    context.uncommitted_files = snapshot.uncommitted_files;
    context.changed_files = snapshot.changed_files;
    context.git_updated_at = now;
}

/// Inspector used when no worktree collaborator is configured; every call
/// fails, which heartbeat handling already treats as best-effort.
pub struct NullWorktreeInspector;

#[async_trait]
impl WorktreeInspector for NullWorktreeInspector {
    async fn inspect(&self, _worktree_path: &str) -> std::io::Result<WorktreeSnapshot> {
        Err(std::io::Error::other("no worktree inspector configured"))
    }
}
