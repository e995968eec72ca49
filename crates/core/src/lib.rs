//! Data model for the warden authorization checker.
//!
//! The checker consumes a host compiler's declaration table, imports and call expressions
//! (see [`program`]) and reports violations of the `auth` qualifier rules as
//! [`diagnostics::Diagnostic`]s.

pub mod address;
pub mod diagnostics;
pub mod program;
pub mod qualifier;
pub mod result;

pub use address::Address;
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
pub use program::{
    AuthPrefix, AuthorizerParam, Batch, CallExpr, CompilationUnit, DeclId, DeclKind, Declaration,
    FunctionDecl, ImportDecl, Param, Phase, Span, UnitKind,
};
pub use qualifier::{AccessQualifier, ConformancePolicy, ImportMode};
pub use result::{Error, Result};

/// Resolves the effective qualifier of a declaration from the qualifiers written on it.
///
/// Returns `None` when more than one qualifier is written; nothing is ever chosen among
/// conflicting qualifiers.
#[inline]
pub fn effective_qualifier(written: &[AccessQualifier]) -> Option<AccessQualifier> {
    match written {
        [] => Some(AccessQualifier::Public),
        [single] => Some(*single),
        _ => None,
    }
}
