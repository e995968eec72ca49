//! Import binder: resolves each import statement of a unit to a binding mode.

use crate::resolver::QualifierTable;
use serde::Serialize;
use std::collections::BTreeMap;
use warden_core::{
    AccessQualifier, CompilationUnit, DeclId, Diagnostic, DiagnosticKind, Diagnostics, ImportMode,
    Span,
};

/// One import statement after binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportBinding {
    pub contract: String,
    pub mode: ImportMode,
    /// Qualifier the imported contract declares for itself.
    pub declared: AccessQualifier,
    /// False when the binding makes nothing reachable (plain import of an `auth` contract).
    pub usable: bool,
    pub span: Span,
}

impl ImportBinding {
    /// Calls through this binding implicitly carry the authorization prefix.
    pub fn implies_authorization(&self) -> bool {
        self.usable && self.mode == ImportMode::Authorized
    }
}

/// Bindings visible in one compilation unit, keyed by contract name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ImportScope {
    bindings: BTreeMap<String, ImportBinding>,
}

impl ImportScope {
    pub fn binding(&self, contract: &str) -> Option<&ImportBinding> {
        self.bindings.get(contract)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ImportBinding> {
        self.bindings.values()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Binds every import of `unit` against the resolved declaration table.
pub fn bind_imports(
    unit: &CompilationUnit,
    table: &QualifierTable,
    sink: &mut Diagnostics,
) -> ImportScope {
    let mut scope = ImportScope::default();

    for import in &unit.imports {
        let id = DeclId::contract(&import.contract);
        if table.is_rejected(&id) {
            tracing::debug!("  import of rejected `{id}` skipped");
            continue;
        }
        let Some(entry) = table.contract(&import.contract) else {
            sink.report(
                Diagnostic::new(
                    DiagnosticKind::UnresolvedDeclaration,
                    import.span.clone(),
                    format!("import of unknown contract `{}`", import.contract),
                )
                .with_declaration(id),
            );
            continue;
        };

        if let Some(existing) = scope.binding(&import.contract) {
            if existing.mode != import.mode {
                sink.report(
                    Diagnostic::new(
                        DiagnosticKind::QualifierConflict,
                        import.span.clone(),
                        format!(
                            "`{}` is already imported in {} mode at {}",
                            import.contract, existing.mode, existing.span
                        ),
                    )
                    .with_declaration(id),
                );
            }
            continue;
        }

        let usable = !(entry.qualifier.is_authorized() && import.mode == ImportMode::Plain);
        if !usable {
            sink.report(
                Diagnostic::new(
                    DiagnosticKind::ImportNotAuthorized,
                    import.span.clone(),
                    format!(
                        "contract `{}` is declared auth and must be imported with `import auth`",
                        import.contract
                    ),
                )
                .with_declaration(id),
            );
        }

        scope.bindings.insert(
            import.contract.clone(),
            ImportBinding {
                contract: import.contract.clone(),
                mode: import.mode,
                declared: entry.qualifier,
                usable,
                span: import.span.clone(),
            },
        );
    }

    tracing::debug!("  {} imports bound in `{}`", scope.len(), unit.name);
    scope
}
