//! Semantic validation of an attack configuration.
//!
//! The command builder never reports problems; it silently omits fragments
//! that do not hold up. Everything an operator should hear about before a
//! run starts is checked here, and all problems are reported at once rather
//! than stopping at the first.

use std::fs;
use std::path::Path;

use crate::command::{expand_path, protocol, TASK_RANGE};

use super::{AttackConfig, TargetMode};

/// Valid range for a proxy port.
const PORT_RANGE: std::ops::RangeInclusive<u32> = 1..=65535;

/// A single problem found in an [`AttackConfig`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("{field} file not found: {path}")]
    FileNotFound { field: &'static str, path: String },
    #[error("{field} path is not a file: {path}")]
    NotAFile { field: &'static str, path: String },
    #[error("{field} file is not readable: {path}")]
    NotReadable { field: &'static str, path: String },
    #[error("target appears to be a file; switch to target list mode")]
    TargetIsFile,
    #[error("unknown protocol: {0}")]
    UnknownProtocol(String),
    #[error("task count must be an integer between 1 and 64")]
    BadTaskCount,
    #[error("proxy host and port must be set together")]
    IncompleteProxy,
    #[error("proxy port must be an integer between 1 and 65535")]
    BadProxyPort,
}

/// Check that a config is complete and points at real, readable inputs.
///
/// # Errors
///
/// Returns every problem found, in field order.
pub fn validate(config: &AttackConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let target = config.target.trim();
    if target.is_empty() {
        errors.push(ValidationError::Missing("target"));
    } else {
        match config.target_mode {
            TargetMode::Single => {
                // A single target that names an existing file is almost
                // certainly a mode mix-up.
                if Path::new(target).is_file() {
                    errors.push(ValidationError::TargetIsFile);
                }
            }
            TargetMode::ListFile => {
                check_list_file("target list", target, &mut errors);
            }
        }
    }

    check_required_file("user list", &config.user_list, &mut errors);
    check_required_file("pass list", &config.pass_list, &mut errors);

    if !protocol::is_known(config.protocol.trim()) {
        errors.push(ValidationError::UnknownProtocol(config.protocol.clone()));
    }

    let tasks = config.tasks.trim();
    if !tasks.is_empty()
        && !tasks
            .parse::<u32>()
            .is_ok_and(|n| TASK_RANGE.contains(&n))
    {
        errors.push(ValidationError::BadTaskCount);
    }

    if let Some(proxy) = &config.proxy {
        let host = proxy.host.trim();
        let port = proxy.port.trim();
        match (host.is_empty(), port.is_empty()) {
            (true, true) => {}
            (false, false) => {
                if !port.parse::<u32>().is_ok_and(|p| PORT_RANGE.contains(&p)) {
                    errors.push(ValidationError::BadProxyPort);
                }
            }
            _ => errors.push(ValidationError::IncompleteProxy),
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_required_file(field: &'static str, raw: &str, errors: &mut Vec<ValidationError>) {
    if raw.trim().is_empty() {
        errors.push(ValidationError::Missing(field));
    } else {
        check_list_file(field, raw.trim(), errors);
    }
}

fn check_list_file(field: &'static str, raw: &str, errors: &mut Vec<ValidationError>) {
    let path = expand_path(raw);
    let display = path.display().to_string();
    match fs::metadata(&path) {
        Err(_) => errors.push(ValidationError::FileNotFound {
            field,
            path: display,
        }),
        Ok(meta) if !meta.is_file() => errors.push(ValidationError::NotAFile {
            field,
            path: display,
        }),
        Ok(_) => {
            if fs::File::open(&path).is_err() {
                errors.push(ValidationError::NotReadable {
                    field,
                    path: display,
                });
            }
        }
    }
}
