//! Declaration resolver: builds the qualifier table every later pass reads.
//!
//! One pass over the batch's declarations. Contract qualifiers gate importability and function
//! qualifiers gate callability; the two are recorded independently and never inherited. A
//! declaration with conflicting qualifiers is rejected, not resolved to either side, and later
//! passes skip it without reporting again.

use crate::lower::{LoweredSignature, lower_signature};
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Dfs;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use warden_core::{
    AccessQualifier, Address, ConformancePolicy, DeclId, DeclKind, Declaration, Diagnostic,
    DiagnosticKind, Diagnostics, Span, effective_qualifier,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Contract,
    Interface,
    Function,
}

impl From<DeclKind> for EntryKind {
    fn from(kind: DeclKind) -> Self {
        match kind {
            DeclKind::Contract => EntryKind::Contract,
            DeclKind::Interface => EntryKind::Interface,
        }
    }
}

/// Resolved qualifier of one declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QualifierEntry {
    pub kind: EntryKind,
    pub qualifier: AccessQualifier,
    /// Deployment address of the declaring contract or interface.
    pub address: Address,
    pub span: Span,
}

/// Immutable snapshot of every resolved declaration in a batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QualifierTable {
    entries: BTreeMap<DeclId, QualifierEntry>,
    rejected: BTreeSet<DeclId>,
    lowered: BTreeMap<DeclId, LoweredSignature>,
}

impl QualifierTable {
    pub fn get(&self, id: &DeclId) -> Option<&QualifierEntry> {
        self.entries.get(id)
    }

    pub fn contract(&self, name: &str) -> Option<&QualifierEntry> {
        self.entries.get(&DeclId::contract(name))
    }

    pub fn qualifier(&self, id: &DeclId) -> Option<AccessQualifier> {
        self.get(id).map(|entry| entry.qualifier)
    }

    /// True when the declaration, or the contract declaring it, was rejected.
    pub fn is_rejected(&self, id: &DeclId) -> bool {
        self.rejected.contains(id) || self.rejected.contains(&DeclId::contract(id.contract_name()))
    }

    pub fn rejected(&self) -> impl Iterator<Item = &DeclId> {
        self.rejected.iter()
    }

    pub fn lowered(&self, id: &DeclId) -> Option<&LoweredSignature> {
        self.lowered.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&DeclId, &QualifierEntry)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn reject(&mut self, id: DeclId) {
        if id.is_member() {
            self.entries.remove(&id);
            self.lowered.remove(&id);
        } else {
            let name = id.as_str();
            self.entries.retain(|entry, _| entry.contract_name() != name);
            self.lowered.retain(|entry, _| entry.contract_name() != name);
        }
        self.rejected.insert(id);
    }
}

/// Resolves every declaration of the batch into a [`QualifierTable`].
pub fn resolve_declarations(
    declarations: &[Declaration],
    policy: ConformancePolicy,
    sink: &mut Diagnostics,
) -> QualifierTable {
    let mut table = QualifierTable::default();
    let mut by_name: HashMap<&str, &Declaration> = HashMap::new();

    for decl in declarations {
        if by_name.contains_key(decl.name.as_str()) {
            sink.report(
                Diagnostic::new(
                    DiagnosticKind::QualifierConflict,
                    decl.span.clone(),
                    format!("{} `{}` is declared more than once", decl.kind, decl.name),
                )
                .with_declaration(decl.id()),
            );
            continue;
        }
        by_name.insert(&decl.name, decl);
        register_declaration(decl, &mut table, sink);
    }

    check_conformance(declarations, &by_name, policy, &mut table, sink);

    tracing::debug!(
        "Resolved {} declarations, {} rejected",
        table.entries.len(),
        table.rejected.len()
    );
    table
}

fn register_declaration(decl: &Declaration, table: &mut QualifierTable, sink: &mut Diagnostics) {
    let id = decl.id();
    let Some(qualifier) = effective_qualifier(&decl.qualifiers) else {
        sink.report(duplicate_qualifiers(&id, &decl.qualifiers, &decl.span));
        table.rejected.insert(id);
        return;
    };
    table.entries.insert(
        id,
        QualifierEntry {
            kind: decl.kind.into(),
            qualifier,
            address: decl.address,
            span: decl.span.clone(),
        },
    );

    let mut seen = BTreeSet::new();
    for function in &decl.functions {
        let fid = DeclId::member(&decl.name, &function.name);
        if !seen.insert(function.name.as_str()) {
            sink.report(
                Diagnostic::new(
                    DiagnosticKind::QualifierConflict,
                    function.span.clone(),
                    format!("function `{fid}` is declared more than once"),
                )
                .with_declaration(fid),
            );
            continue;
        }

        let Some(qualifier) = effective_qualifier(&function.qualifiers) else {
            sink.report(duplicate_qualifiers(&fid, &function.qualifiers, &function.span));
            table.rejected.insert(fid);
            continue;
        };

        if function.reads_auth && !qualifier.is_authorized() {
            sink.report(
                Diagnostic::new(
                    DiagnosticKind::AuthIdentifierUnavailable,
                    function.span.clone(),
                    format!(
                        "`{fid}` reads the authorization identifier but is declared {qualifier}; \
                         only auth functions receive it"
                    ),
                )
                .with_declaration(fid.clone()),
            );
        }

        if qualifier.is_authorized() {
            table
                .lowered
                .insert(fid.clone(), lower_signature(fid.clone(), function));
        }
        table.entries.insert(
            fid,
            QualifierEntry {
                kind: EntryKind::Function,
                qualifier,
                address: decl.address,
                span: function.span.clone(),
            },
        );
    }
}

fn duplicate_qualifiers(id: &DeclId, written: &[AccessQualifier], span: &Span) -> Diagnostic {
    let written: Vec<String> = written.iter().map(ToString::to_string).collect();
    Diagnostic::new(
        DiagnosticKind::QualifierConflict,
        span.clone(),
        format!(
            "`{id}` carries more than one access qualifier ({})",
            written.join(", ")
        ),
    )
    .with_declaration(id.clone())
}

/// Checks every declaration against all interfaces it transitively conforms to.
fn check_conformance(
    declarations: &[Declaration],
    by_name: &HashMap<&str, &Declaration>,
    policy: ConformancePolicy,
    table: &mut QualifierTable,
    sink: &mut Diagnostics,
) {
    // Only the first declaration of each name takes part; later duplicates were rejected.
    let canonical = declarations
        .iter()
        .filter(|decl| std::ptr::eq(*decl, by_name[decl.name.as_str()]));

    let mut graph: DiGraph<&str, ()> = DiGraph::new();
    let mut nodes: HashMap<&str, NodeIndex> = HashMap::new();
    for decl in canonical.clone() {
        nodes.insert(&decl.name, graph.add_node(&decl.name));
    }

    for decl in canonical.clone() {
        for target in &decl.conforms {
            match by_name.get(target.as_str()) {
                Some(parent) if parent.kind == DeclKind::Interface => {
                    graph.add_edge(nodes[decl.name.as_str()], nodes[target.as_str()], ());
                }
                Some(parent) => {
                    sink.report(
                        Diagnostic::new(
                            DiagnosticKind::UnresolvedDeclaration,
                            decl.span.clone(),
                            format!(
                                "`{}` conforms to `{target}`, which is a {}, not an interface",
                                decl.name, parent.kind
                            ),
                        )
                        .with_declaration(decl.id()),
                    );
                    table.reject(decl.id());
                }
                None => {
                    sink.report(
                        Diagnostic::new(
                            DiagnosticKind::UnresolvedDeclaration,
                            decl.span.clone(),
                            format!("`{}` conforms to unknown interface `{target}`", decl.name),
                        )
                        .with_declaration(decl.id()),
                    );
                    table.reject(decl.id());
                }
            }
        }
    }

    let mut cycles: Vec<Vec<&str>> = tarjan_scc(&graph)
        .into_iter()
        .filter(|component| {
            component.len() > 1 || graph.contains_edge(component[0], component[0])
        })
        .map(|component| {
            let mut members: Vec<&str> = component.iter().map(|&n| graph[n]).collect();
            members.sort_unstable();
            members
        })
        .collect();
    cycles.sort();

    for members in &cycles {
        for name in members {
            let decl = by_name[name];
            sink.report(
                Diagnostic::new(
                    DiagnosticKind::UnresolvedDeclaration,
                    decl.span.clone(),
                    format!(
                        "interface `{name}` takes part in a conformance cycle ({})",
                        members.join(" -> ")
                    ),
                )
                .with_declaration(decl.id()),
            );
            table.reject(decl.id());
        }
    }

    for decl in canonical {
        if table.is_rejected(&decl.id()) {
            continue;
        }
        let start = nodes[decl.name.as_str()];
        let mut dfs = Dfs::new(&graph, start);
        while let Some(node) = dfs.next(&graph) {
            if node == start {
                continue;
            }
            let interface = by_name[graph[node]];
            if table.is_rejected(&interface.id()) {
                continue;
            }
            check_against_interface(decl, interface, policy, table, sink);
        }
    }
}

fn check_against_interface(
    decl: &Declaration,
    interface: &Declaration,
    policy: ConformancePolicy,
    table: &mut QualifierTable,
    sink: &mut Diagnostics,
) {
    for required in &interface.functions {
        let required_id = DeclId::member(&interface.name, &required.name);
        let implemented_id = DeclId::member(&decl.name, &required.name);
        let (Some(expected), Some(actual)) = (
            table.qualifier(&required_id),
            table.qualifier(&implemented_id),
        ) else {
            // Missing members are the host's conformance error; rejected ones are reported.
            continue;
        };

        if !(expected.is_authorized() || actual.is_authorized()) {
            continue;
        }
        if policy.accepts(expected, actual) {
            continue;
        }

        let span = table
            .get(&implemented_id)
            .map(|entry| entry.span.clone())
            .unwrap_or_else(|| decl.span.clone());
        sink.report(
            Diagnostic::new(
                DiagnosticKind::QualifierConflict,
                span,
                format!(
                    "`{implemented_id}` is declared {actual} but interface `{required_id}` \
                     requires {expected}"
                ),
            )
            .with_declaration(implemented_id.clone()),
        );
        table.reject(implemented_id);
    }
}
