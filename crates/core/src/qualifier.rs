//! Access qualifiers and import modes.

use crate::result::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Access qualifier attached to a contract, interface or function declaration.
///
/// Serialized with the surface keywords: `all`, `account`, `self`, `auth`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccessQualifier {
    /// `access(all)`
    #[serde(rename = "all")]
    Public,
    /// `access(account)`
    #[serde(rename = "account")]
    AccountLocal,
    /// `access(self)`
    #[serde(rename = "self")]
    SelfOnly,
    /// `auth`: calls carry a hidden authorization token; on a contract, importing requires
    /// an authorized import.
    #[serde(rename = "auth")]
    Authorized,
}

impl AccessQualifier {
    pub fn keyword(self) -> &'static str {
        match self {
            AccessQualifier::Public => "all",
            AccessQualifier::AccountLocal => "account",
            AccessQualifier::SelfOnly => "self",
            AccessQualifier::Authorized => "auth",
        }
    }

    pub fn is_authorized(self) -> bool {
        matches!(self, AccessQualifier::Authorized)
    }

    /// Returns true when `self` admits no caller that `other` would reject.
    ///
    /// The visibility levels form a chain `all < account < self`. `auth` sits above `all` only:
    /// every caller can present a token, but `auth` says nothing about account or contract
    /// membership, so it is incomparable with `account` and `self`.
    pub fn is_stricter_or_equal(self, other: AccessQualifier) -> bool {
        use AccessQualifier::*;
        match (self, other) {
            (a, b) if a == b => true,
            (AccountLocal | SelfOnly | Authorized, Public) => true,
            (SelfOnly, AccountLocal) => true,
            _ => false,
        }
    }
}

impl fmt::Display for AccessQualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessQualifier::Authorized => f.write_str("auth"),
            other => write!(f, "access({})", other.keyword()),
        }
    }
}

impl FromStr for AccessQualifier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "all" => Ok(AccessQualifier::Public),
            "account" => Ok(AccessQualifier::AccountLocal),
            "self" => Ok(AccessQualifier::SelfOnly),
            "auth" => Ok(AccessQualifier::Authorized),
            other => Err(Error::UnknownQualifier(other.to_string())),
        }
    }
}

/// How an import statement binds the imported contract.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportMode {
    /// `import Foo from 0x01`
    #[default]
    Plain,
    /// `import auth Foo from 0x01`
    #[serde(alias = "auth")]
    Authorized,
}

impl fmt::Display for ImportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportMode::Plain => f.write_str("plain"),
            ImportMode::Authorized => f.write_str("auth"),
        }
    }
}

/// How an implementation's qualifier must relate to the interface it conforms to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConformancePolicy {
    /// Implementation qualifier must equal the interface qualifier.
    #[default]
    Exact,
    /// Implementation may be stricter than the interface.
    AllowStricter,
}

impl ConformancePolicy {
    /// Returns true when `implementation` may stand in for `interface` under this policy.
    pub fn accepts(self, interface: AccessQualifier, implementation: AccessQualifier) -> bool {
        match self {
            ConformancePolicy::Exact => interface == implementation,
            ConformancePolicy::AllowStricter => implementation.is_stricter_or_equal(interface),
        }
    }
}
