//! Attack configuration types.

use serde::{Deserialize, Serialize};

/// How the target field is interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetMode {
    /// A single host or domain, passed as a bare token.
    #[default]
    Single,
    /// A path to a file listing one target per line (`-M`).
    ListFile,
}

/// Proxy flavor for the `-x` flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProxyKind {
    #[default]
    Http,
    Socks4,
    Socks5,
}

impl ProxyKind {
    /// Scheme token used in the proxy URL, always lower-cased.
    #[must_use]
    pub fn scheme(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Socks4 => "socks4",
            Self::Socks5 => "socks5",
        }
    }
}

/// Proxy settings. Credentials go into the proxy URL only when both user
/// and pass are non-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyConfig {
    pub kind: ProxyKind,
    pub host: String,
    /// Kept as entered; must parse as a port number to pass validation.
    pub port: String,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub pass: Option<String>,
}

/// Configuration for one attack run.
///
/// Caller-owned and read-only to the supervisor core. Free-form fields keep
/// the operator's raw input (`tasks` stays a string so the command builder
/// can silently drop a value that does not parse); semantic checks live in
/// [`validate`](super::validate).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttackConfig {
    #[serde(default)]
    pub target_mode: TargetMode,
    /// Single host/domain or list-file path, depending on `target_mode`.
    pub target: String,
    pub user_list: String,
    pub pass_list: String,
    pub protocol: String,
    /// Parallel task count, accepted when it parses into `[1, 64]`.
    #[serde(default)]
    pub tasks: String,
    /// Form spec appended after form-based protocols.
    #[serde(default)]
    pub http_form: Option<String>,
    #[serde(default)]
    pub proxy: Option<ProxyConfig>,
    /// Free text, shell-tokenized but never shell-interpreted.
    #[serde(default)]
    pub extra_args: Option<String>,
}
