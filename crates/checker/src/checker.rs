//! Checking pipeline.
//!
//! The declaration resolver runs once per batch and its table is frozen behind an `Arc`. Every
//! unit is then bound and authorized against that snapshot only, so units can be checked on
//! separate threads; reports are collected back in unit order.

use crate::authorizers::{AuthorizerScope, bind_authorizers};
use crate::call::{AnnotatedCall, CallAuthorizer};
use crate::imports::{ImportBinding, bind_imports};
use crate::resolver::{QualifierTable, resolve_declarations};
use crate::{CheckConfig, Error, Result};
use serde::Serialize;
use sha3::{Digest, Sha3_256};
use std::sync::Arc;
use warden_core::{
    Batch, CompilationUnit, DeclId, Declaration, Diagnostic, DiagnosticKind, Diagnostics, Span,
    UnitKind,
};

/// Outcome of checking one compilation unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitReport {
    pub unit: String,
    pub imports: Vec<ImportBinding>,
    pub calls: Vec<AnnotatedCall>,
    pub diagnostics: Diagnostics,
}

impl UnitReport {
    pub fn is_accepted(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Outcome of checking a whole batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckReport {
    /// Diagnostics of the declaration resolver.
    pub declarations: Diagnostics,
    pub units: Vec<UnitReport>,
}

impl CheckReport {
    /// All diagnostics: declarations first, then each unit in order.
    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.declarations
            .iter()
            .chain(self.units.iter().flat_map(|unit| unit.diagnostics.iter()))
    }

    pub fn diagnostic_count(&self) -> usize {
        self.declarations.len() + self.units.iter().map(|u| u.diagnostics.len()).sum::<usize>()
    }

    pub fn kinds(&self) -> Vec<DiagnosticKind> {
        self.diagnostics().map(|d| d.kind).collect()
    }

    pub fn is_accepted(&self) -> bool {
        self.diagnostic_count() == 0
    }

    pub fn unit(&self, name: &str) -> Option<&UnitReport> {
        self.units.iter().find(|unit| unit.unit == name)
    }

    /// SHA3-256 of the serialized report, `0x`-prefixed.
    ///
    /// Re-checking unchanged input yields the same digest.
    pub fn digest(&self) -> Result<String> {
        let bytes = serde_json::to_vec(self)?;
        let mut hasher = Sha3_256::new();
        hasher.update(&bytes);
        Ok(format!("0x{}", hex::encode(hasher.finalize())))
    }
}

/// A resolved declaration snapshot that units are checked against.
#[derive(Debug, Clone)]
pub struct Checker {
    table: Arc<QualifierTable>,
    declarations: Diagnostics,
    config: CheckConfig,
}

impl Checker {
    /// Runs the declaration resolver and freezes its table.
    pub fn new(declarations: &[Declaration], config: CheckConfig) -> Self {
        tracing::debug!("Resolving {} declarations", declarations.len());
        let mut sink = Diagnostics::new();
        let table = resolve_declarations(declarations, config.policy, &mut sink);
        sink.sort_by_location();

        Self {
            table: Arc::new(table),
            declarations: sink,
            config,
        }
    }

    pub fn table(&self) -> &QualifierTable {
        &self.table
    }

    /// Shared handle to the frozen table.
    pub fn snapshot(&self) -> Arc<QualifierTable> {
        Arc::clone(&self.table)
    }

    pub fn declaration_diagnostics(&self) -> &Diagnostics {
        &self.declarations
    }

    pub fn config(&self) -> &CheckConfig {
        &self.config
    }

    pub fn check_unit(&self, unit: &CompilationUnit) -> UnitReport {
        check_unit(unit, &self.table)
    }

    /// Checks every unit, in parallel when configured; reports keep the input order.
    ///
    /// Parallel runs split the units into at most [`worker_count`] contiguous chunks, one
    /// thread per chunk.
    pub fn check_units(&self, units: &[CompilationUnit]) -> Result<Vec<UnitReport>> {
        let workers = worker_count().min(units.len());
        if !self.config.parallel || workers < 2 {
            return Ok(units.iter().map(|unit| self.check_unit(unit)).collect());
        }

        let table: &QualifierTable = &self.table;
        let chunk_size = units.len().div_ceil(workers);
        tracing::debug!("Checking {} units on {workers} workers", units.len());

        std::thread::scope(|scope| -> Result<Vec<UnitReport>> {
            let handles: Vec<_> = units
                .chunks(chunk_size)
                .map(|chunk| {
                    let handle = scope.spawn(move || {
                        chunk
                            .iter()
                            .map(|unit| check_unit(unit, table))
                            .collect::<Vec<_>>()
                    });
                    (chunk, handle)
                })
                .collect();

            let mut reports = Vec::with_capacity(units.len());
            for (chunk, handle) in handles {
                let chunk_reports = handle
                    .join()
                    .map_err(|_| Error::WorkerPanicked(chunk_label(chunk)))?;
                reports.extend(chunk_reports);
            }
            Ok(reports)
        })
    }

    pub fn check(&self, units: &[CompilationUnit]) -> Result<CheckReport> {
        let units = self.check_units(units)?;
        Ok(CheckReport {
            declarations: self.declarations.clone(),
            units,
        })
    }
}

/// Upper bound on checking threads: the available parallelism, or 4 when it is unknown.
pub fn worker_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

fn chunk_label(chunk: &[CompilationUnit]) -> String {
    match chunk {
        [] => String::new(),
        [only] => only.name.clone(),
        [first, .., last] => format!("{}..{}", first.name, last.name),
    }
}

/// Resolves the batch's declarations and checks all of its units.
pub fn check_batch(batch: &Batch, config: &CheckConfig) -> Result<CheckReport> {
    tracing::debug!("Starting authorization check:");
    tracing::debug!("  Declarations: {}", batch.declarations.len());
    tracing::debug!("  Units: {}", batch.units.len());
    tracing::debug!("  Policy: {:?}", config.policy);

    let checker = Checker::new(&batch.declarations, config.clone());
    let report = checker.check(&batch.units)?;

    tracing::info!(
        "Checked {} units: {} diagnostics",
        report.units.len(),
        report.diagnostic_count()
    );
    Ok(report)
}

/// Binds imports and authorizers of one unit and authorizes each of its calls.
pub fn check_unit(unit: &CompilationUnit, table: &QualifierTable) -> UnitReport {
    tracing::debug!("Checking unit `{}`", unit.name);
    let mut sink = Diagnostics::new();

    let imports = bind_imports(unit, table, &mut sink);
    let authorizers = match &unit.kind {
        UnitKind::Transaction { authorizers } => bind_authorizers(authorizers, &mut sink),
        _ => AuthorizerScope::default(),
    };

    let calls: Vec<AnnotatedCall> = match CallAuthorizer::new(unit, table, &imports, &authorizers)
    {
        Some(authorizer) => unit
            .calls
            .iter()
            .map(|call| authorizer.authorize(call, &mut sink))
            .collect(),
        None => {
            let contract = unit.own_contract().unwrap_or_default();
            if !table.is_rejected(&DeclId::contract(contract)) {
                sink.report(
                    Diagnostic::new(
                        DiagnosticKind::UnresolvedDeclaration,
                        Span::new(unit.name.clone(), 0, 0),
                        format!("unit `{}` holds code of unknown contract `{contract}`", unit.name),
                    )
                    .with_declaration(DeclId::contract(contract)),
                );
            }
            unit.calls.iter().map(AnnotatedCall::skipped).collect()
        }
    };

    sink.sort_by_location();
    tracing::debug!(
        "  {} calls, {} diagnostics in `{}`",
        calls.len(),
        sink.len(),
        unit.name
    );

    UnitReport {
        unit: unit.name.clone(),
        imports: imports.iter().cloned().collect(),
        calls,
        diagnostics: sink,
    }
}
