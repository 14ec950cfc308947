//! Supported protocol identifiers.
//!
//! The table is immutable and loaded once at compile time; identifiers form
//! a deduplicated set.

/// Protocol identifiers hydra accepts, paired with a short description.
pub const PROTOCOLS: &[(&str, &str)] = &[
    ("ssh", "Secure Shell"),
    ("ftp", "File Transfer Protocol"),
    ("smb", "Server Message Block"),
    ("http-form-post", "HTTP POST forms"),
    ("https-form-post", "HTTPS POST forms"),
    ("telnet", "Telnet protocol"),
    ("smtp", "Simple Mail Transfer Protocol"),
    ("imap", "IMAP email"),
    ("pop3", "POP3 email"),
    ("rdp", "Remote Desktop Protocol"),
    ("vnc", "Virtual Network Computing"),
    ("mysql", "MySQL database"),
    ("postgres", "PostgreSQL database"),
    ("mssql", "Microsoft SQL Server"),
    ("oracle", "Oracle database"),
    ("mongodb", "MongoDB database"),
    ("redis", "Redis database"),
    ("afp", "Apple Filing Protocol"),
    ("cisco-enable", "Cisco enable"),
    ("ldap3", "LDAP v3"),
    ("snmp", "SNMP"),
    ("sip", "Session Initiation Protocol"),
    ("xmpp", "XMPP"),
    ("cvs", "CVS"),
    ("svn", "Subversion"),
    ("imaps", "IMAP over SSL"),
    ("pop3s", "POP3 over SSL"),
    ("smtps", "SMTP over SSL"),
    ("ftps", "FTP over SSL"),
    ("sftp", "SSH File Transfer Protocol"),
    ("http-proxy", "HTTP Proxy"),
    ("https-proxy", "HTTPS Proxy"),
    ("socks5", "SOCKS5 Proxy"),
];

/// Whether `name` is a known protocol identifier.
#[must_use]
pub fn is_known(name: &str) -> bool {
    PROTOCOLS.iter().any(|(proto, _)| *proto == name)
}

/// Description for a known protocol identifier.
#[must_use]
pub fn description(name: &str) -> Option<&'static str> {
    PROTOCOLS
        .iter()
        .find(|(proto, _)| *proto == name)
        .map(|(_, desc)| *desc)
}

/// All known protocol identifiers, in table order.
pub fn names() -> impl Iterator<Item = &'static str> {
    PROTOCOLS.iter().map(|(proto, _)| *proto)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_has_no_duplicates() {
        let mut names: Vec<&str> = names().collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), PROTOCOLS.len());
    }

    #[test]
    fn knows_common_protocols() {
        for proto in ["ssh", "ftp", "rdp", "http-form-post", "imap"] {
            assert!(is_known(proto), "{proto}");
        }
        assert!(!is_known("gopher"));
        assert!(!is_known("SSH"));
    }

    #[test]
    fn describes_known_protocols() {
        assert_eq!(description("ssh"), Some("Secure Shell"));
        assert_eq!(description("nope"), None);
    }
}
