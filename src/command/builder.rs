//! Attack command construction.
//!
//! [`build`] turns an [`AttackConfig`] into the literal argument vector
//! handed to process creation plus a display-only preview string. It is
//! total: fields that are missing or do not hold up are dropped, never
//! reported as errors (semantic validation is a separate pass in
//! [`crate::config::validate`]).

use std::path::PathBuf;

use crate::config::{AttackConfig, ProxyConfig, TargetMode};

/// Program token for the external tool.
pub const HYDRA_PROGRAM: &str = "hydra";

/// Inclusive range accepted for the parallel task flag.
pub const TASK_RANGE: std::ops::RangeInclusive<u32> = 1..=64;

/// Non-fatal problems discovered while building the vector. The run still
/// proceeds with the remaining arguments.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildWarning {
    /// Extra arguments had unbalanced quoting and were dropped entirely.
    #[error("extra arguments ignored: {0}")]
    ExtraArgs(String),
}

/// A fully built invocation.
///
/// `args` is the sole contract with the process supervisor and is passed to
/// process creation as-is. `preview` re-quotes tokens for human eyes and
/// must never be parsed back or fed to a command interpreter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub preview: String,
    pub args: Vec<String>,
    pub warnings: Vec<BuildWarning>,
}

/// Expand a leading `~` and make the path absolute.
#[must_use]
pub fn expand_path(raw: &str) -> PathBuf {
    let expanded = if let Some(rest) = raw.strip_prefix("~/") {
        dirs::home_dir().map_or_else(|| PathBuf::from(raw), |home| home.join(rest))
    } else if raw == "~" {
        dirs::home_dir().unwrap_or_else(|| PathBuf::from(raw))
    } else {
        PathBuf::from(raw)
    };
    std::path::absolute(&expanded).unwrap_or(expanded)
}

/// Build the argument vector and its preview.
///
/// Token order is load-bearing: hydra expects options, then the target,
/// then the protocol, then any protocol payload.
#[must_use]
pub fn build(config: &AttackConfig) -> CommandLine {
    let mut args = vec![HYDRA_PROGRAM.to_string()];
    let mut warnings = Vec::new();

    if let Ok(tasks) = config.tasks.trim().parse::<u32>() {
        if TASK_RANGE.contains(&tasks) {
            args.push("-t".to_string());
            args.push(tasks.to_string());
        }
    }

    if !config.user_list.trim().is_empty() {
        args.push("-L".to_string());
        args.push(expand_path(config.user_list.trim()).display().to_string());
    }
    if !config.pass_list.trim().is_empty() {
        args.push("-P".to_string());
        args.push(expand_path(config.pass_list.trim()).display().to_string());
    }

    if let Some(proxy) = &config.proxy {
        if !proxy.host.trim().is_empty() && !proxy.port.trim().is_empty() {
            args.push("-x".to_string());
            args.push(proxy_url(proxy));
        }
    }

    // Target must precede the protocol token.
    let target = config.target.trim();
    if !target.is_empty() {
        match config.target_mode {
            TargetMode::ListFile => {
                args.push("-M".to_string());
                args.push(expand_path(target).display().to_string());
            }
            TargetMode::Single => args.push(target.to_string()),
        }
    }

    args.push(config.protocol.trim().to_string());

    if config.protocol.contains("form") {
        if let Some(form) = config.http_form.as_deref() {
            if !form.trim().is_empty() {
                args.push(form.to_string());
            }
        }
    }

    if let Some(extra) = config.extra_args.as_deref() {
        if !extra.trim().is_empty() {
            match shell_words::split(extra) {
                Ok(tokens) => args.extend(tokens),
                Err(err) => warnings.push(BuildWarning::ExtraArgs(err.to_string())),
            }
        }
    }

    args.retain(|token| !token.trim().is_empty());

    let preview = render_preview(&args);
    CommandLine {
        preview,
        args,
        warnings,
    }
}

fn proxy_url(proxy: &ProxyConfig) -> String {
    let scheme = proxy.kind.scheme();
    let host = proxy.host.trim();
    let port = proxy.port.trim();
    let user = proxy.user.as_deref().map_or("", str::trim);
    let pass = proxy.pass.as_deref().map_or("", str::trim);
    if user.is_empty() || pass.is_empty() {
        format!("{scheme}://{host}:{port}")
    } else {
        format!("{scheme}://{user}:{pass}@{host}:{port}")
    }
}

/// Characters that force quoting in the preview string.
const PREVIEW_QUOTE_CHARS: &[char] = &['&', '|', ';', '<', '>', '(', ')', '$', '`'];

/// Join tokens for display, wrapping anything shell-meaningful in double
/// quotes. Display only; never execute the result.
#[must_use]
pub fn render_preview(args: &[String]) -> String {
    args.iter()
        .map(|token| {
            if token.contains(' ') || token.contains(PREVIEW_QUOTE_CHARS) {
                format!("\"{token}\"")
            } else {
                token.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
