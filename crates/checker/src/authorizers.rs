//! Transaction authorizer binder.
//!
//! Each `prepare` parameter becomes a named token source bound to the authorizer at the same
//! position of the submitted transaction. The bare prefix only resolves when there is exactly
//! one authorizer; with more it is ambiguous and never defaults to any of them.

use crate::token::AuthorizationToken;
use std::collections::HashSet;
use warden_core::{AuthorizerParam, Diagnostic, DiagnosticKind, Diagnostics};

/// Authorizer parameters of one transaction, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorizerScope {
    names: Vec<String>,
}

/// Why a prefix did not resolve to an authorizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizerError {
    /// Bare prefix with no authorizer declared.
    None,
    /// Bare prefix with two or more authorizers declared.
    Ambiguous(Vec<String>),
    /// Named prefix that is not a parameter of `prepare`.
    Unknown(String),
}

impl AuthorizerScope {
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Token for a bare `auth` prefix.
    pub fn resolve_bare(&self) -> Result<AuthorizationToken, AuthorizerError> {
        match self.names.as_slice() {
            [] => Err(AuthorizerError::None),
            [only] => Ok(AuthorizationToken::authorizer(only, 0, 1)),
            many => Err(AuthorizerError::Ambiguous(many.to_vec())),
        }
    }

    /// Token for a named prefix. Duplicate names resolve to their first position.
    pub fn resolve_named(&self, name: &str) -> Result<AuthorizationToken, AuthorizerError> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|index| AuthorizationToken::authorizer(name, index, self.names.len()))
            .ok_or_else(|| AuthorizerError::Unknown(name.to_string()))
    }
}

/// Binds the `prepare` parameters of a transaction, reporting duplicate names.
pub fn bind_authorizers(params: &[AuthorizerParam], sink: &mut Diagnostics) -> AuthorizerScope {
    let mut seen = HashSet::new();
    for param in params {
        if !seen.insert(param.name.as_str()) {
            sink.report(Diagnostic::new(
                DiagnosticKind::QualifierConflict,
                param.span.clone(),
                format!("authorizer parameter `{}` is declared more than once", param.name),
            ));
        }
    }

    tracing::debug!("  {} authorizers bound", params.len());
    AuthorizerScope {
        names: params.iter().map(|p| p.name.clone()).collect(),
    }
}
