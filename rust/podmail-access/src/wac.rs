use std::fmt::{self, Display};
use std::str::FromStr;

use crate::CapabilityError;

/// Name of the capability advertisement header
pub const WAC_ALLOW: &str = "wac-allow";

/// An access mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    /// Read the resource
    Read,
    /// Replace or modify the resource
    Write,
    /// Add to the resource without removing anything
    Append,
    /// Change the access control of the resource
    Control,
}

impl FromStr for Permission {
    type Err = String;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token {
            "read" => Ok(Permission::Read),
            "write" => Ok(Permission::Write),
            "append" => Ok(Permission::Append),
            "control" => Ok(Permission::Control),
            other => Err(format!("unknown access mode {other:?}")),
        }
    }
}

impl Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = match self {
            Permission::Read => "read",
            Permission::Write => "write",
            Permission::Append => "append",
            Permission::Control => "control",
        };
        write!(f, "{token}")
    }
}

/// Access modes granted on a resource
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionSet {
    /// Modes granted to the requesting identity
    pub user: Vec<Permission>,
    /// Modes granted to everybody
    pub public: Vec<Permission>,
}

impl PermissionSet {
    /// Returns true if the requesting identity may add data to the resource,
    /// either through `write` or `append`
    pub fn user_can_write(&self) -> bool {
        self.user
            .iter()
            .any(|mode| matches!(mode, Permission::Write | Permission::Append))
    }
}

/// Parses a `WAC-Allow` header value such as `user="read write",public="read"`.
///
/// Groups other than `user` and `public` are ignored. A group that is absent
/// grants nothing. An unquoted value or an unknown access mode is an error.
///
/// ```
/// use podmail_access::{Permission, parse_capability_header};
///
/// let permissions = parse_capability_header(r#"user="read write",public="read""#).unwrap();
/// assert_eq!(permissions.user, vec![Permission::Read, Permission::Write]);
/// assert_eq!(permissions.public, vec![Permission::Read]);
/// ```
pub fn parse_capability_header(header: &str) -> Result<PermissionSet, CapabilityError> {
    let malformed = |reason: String| CapabilityError::Parse {
        header: header.to_string(),
        reason,
    };
    let mut permissions = PermissionSet::default();

    for entry in header.split(',').map(str::trim).filter(|entry| !entry.is_empty()) {
        let (key, value) = entry
            .split_once('=')
            .ok_or_else(|| malformed(format!("expected key=\"modes\" in {entry:?}")))?;
        let value = value.trim();
        let modes = value
            .strip_prefix('"')
            .and_then(|value| value.strip_suffix('"'))
            .ok_or_else(|| malformed(format!("modes of {:?} are not quoted", key.trim())))?;

        let mut granted = Vec::new();
        for token in modes.split_whitespace() {
            let mode = token.parse::<Permission>().map_err(&malformed)?;
            if !granted.contains(&mode) {
                granted.push(mode);
            }
        }

        match key.trim() {
            "user" => permissions.user = granted,
            "public" => permissions.public = granted,
            _ => {}
        }
    }

    Ok(permissions)
}
