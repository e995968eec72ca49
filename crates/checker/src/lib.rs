pub mod authorizers;
pub mod call;
pub mod checker;
pub mod imports;
pub mod lower;
pub mod resolver;
pub mod token;

pub use call::{AnnotatedCall, AuthSource, CallAnnotation, CallAuthorizer, CallSite, TokenOrigin};
pub use checker::{CheckReport, Checker, UnitReport, check_batch, worker_count};
pub use resolver::{QualifierEntry, QualifierTable, resolve_declarations};
pub use token::{AuthorizationToken, HiddenArgument, TokenSource};

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use warden_core::ConformancePolicy;

/// Checker error type encompassing all checker module errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Core operation failed.
    #[error("core error: {0}")]
    Core(#[from] warden_core::Error),

    /// Report serialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A unit checking thread panicked; names the units of its chunk.
    #[error("checking worker for units '{0}' panicked")]
    WorkerPanicked(String),
}

/// Checker result type
pub type Result<T> = std::result::Result<T, Error>;

/// Configuration for a checking run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckConfig {
    /// How implementation qualifiers must relate to interface qualifiers.
    pub policy: ConformancePolicy,
    /// Check units on parallel threads against the shared declaration snapshot.
    pub parallel: bool,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            policy: ConformancePolicy::Exact,
            parallel: true,
        }
    }
}

impl CheckConfig {
    /// Loads a JSON config file; missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| warden_core::Error::FileRead {
            path: path.display().to_string(),
            source,
        })?;
        Ok(serde_json::from_str(&raw)?)
    }
}
