//! Structured compile errors produced by the checker passes.

use crate::program::{DeclId, Span};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The rule a diagnostic reports a violation of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticKind {
    /// Interface/implementation qualifier mismatch, duplicate qualifier or duplicate
    /// declaration.
    QualifierConflict,
    /// Plain import of an `auth` contract, or access through such an import.
    ImportNotAuthorized,
    /// Call to an `auth` function with no authorization source.
    MissingAuthorization,
    /// Bare prefix in a `prepare` phase with more than one authorizer.
    AmbiguousAuthorizer,
    /// Named prefix that is not an authorizer parameter in scope.
    UnknownAuthorizer,
    /// Reference to a contract, member or interface that does not resolve.
    UnresolvedDeclaration,
    /// Authorization identifier read outside an `auth` function.
    AuthIdentifierUnavailable,
}

impl DiagnosticKind {
    pub fn code(self) -> &'static str {
        match self {
            DiagnosticKind::QualifierConflict => "qualifier-conflict",
            DiagnosticKind::ImportNotAuthorized => "import-not-authorized",
            DiagnosticKind::MissingAuthorization => "missing-authorization",
            DiagnosticKind::AmbiguousAuthorizer => "ambiguous-authorizer",
            DiagnosticKind::UnknownAuthorizer => "unknown-authorizer",
            DiagnosticKind::UnresolvedDeclaration => "unresolved-declaration",
            DiagnosticKind::AuthIdentifierUnavailable => "auth-identifier-unavailable",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One rejected declaration, import or call site.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// Declaration the violation is attributed to, when there is one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declaration: Option<DeclId>,
    pub location: Span,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, location: Span, message: impl Into<String>) -> Self {
        Self {
            kind,
            declaration: None,
            location,
            message: message.into(),
        }
    }

    pub fn with_declaration(mut self, id: DeclId) -> Self {
        self.declaration = Some(id);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error[{}]: {}: {}", self.kind, self.location, self.message)
    }
}

/// Append-only sink the passes report into.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Diagnostics {
    records: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, diagnostic: Diagnostic) {
        tracing::warn!("{diagnostic}");
        self.records.push(diagnostic);
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.records.extend(other.records);
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.records.iter()
    }

    /// Number of diagnostics of the given kind.
    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.records.iter().filter(|d| d.kind == kind).count()
    }

    pub fn kinds(&self) -> Vec<DiagnosticKind> {
        self.records.iter().map(|d| d.kind).collect()
    }

    /// Orders records by source location; equal locations keep report order.
    pub fn sort_by_location(&mut self) {
        self.records.sort_by(|a, b| a.location.cmp(&b.location));
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.records
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
