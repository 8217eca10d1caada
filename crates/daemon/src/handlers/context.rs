//! `context.save` / `show` / `clear` (spec §4.3): a file-backed per-agent
//! scratch blob, explicitly not event-sourced or replicated.

use std::fs;
use std::path::PathBuf;

use thrum_core::{Clock, ThrumError};
use thrum_wire::Response;

use super::Handlers;

fn context_path<C: Clock + 'static>(handlers: &Handlers<C>, agent_name: &str) -> Result<PathBuf, ThrumError> {
    if agent_name.is_empty() || agent_name.contains(['/', '\\']) || agent_name == "." || agent_name == ".." {
        return Err(ThrumError::invalid_request(format!("invalid agent_name: {agent_name}")));
    }
    Ok(handlers.context_dir.join(format!("{agent_name}.md")))
}

pub fn save<C: Clock + 'static>(
    handlers: &Handlers<C>,
    agent_name: &str,
    content: String,
) -> Result<Response, ThrumError> {
    let path = context_path(handlers, agent_name)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| ThrumError::io(e.to_string()))?;
    }
    fs::write(&path, content).map_err(|e| ThrumError::io(e.to_string()))?;
    Ok(Response::Ok)
}

pub fn show<C: Clock + 'static>(handlers: &Handlers<C>, agent_name: &str) -> Result<Response, ThrumError> {
    let path = context_path(handlers, agent_name)?;
    match fs::read_to_string(&path) {
        Ok(content) => Ok(Response::Context { content: Some(content) }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Response::Context { content: None }),
        Err(e) => Err(ThrumError::io(e.to_string())),
    }
}

pub fn clear<C: Clock + 'static>(handlers: &Handlers<C>, agent_name: &str) -> Result<Response, ThrumError> {
    let path = context_path(handlers, agent_name)?;
    match fs::remove_file(&path) {
        Ok(()) => Ok(Response::Ok),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Response::Ok),
        Err(e) => Err(ThrumError::io(e.to_string())),
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
