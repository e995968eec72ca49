use crate::common::{batch_from_value, check, check_with};
use serde_json::json;
use warden_checker::{CallAnnotation, CheckConfig, Checker};
use warden_core::{AccessQualifier, ConformancePolicy, DeclId, DiagnosticKind};

fn stricter_implementation() -> serde_json::Value {
    json!({
        "declarations": [
            {
                "kind": "interface",
                "name": "Pool",
                "address": "0x10",
                "functions": [{"name": "deposit"}]
            },
            {
                "kind": "contract",
                "name": "Reserve",
                "address": "0x11",
                "conforms": ["Pool"],
                "functions": [{"name": "deposit", "qualifiers": ["auth"]}]
            }
        ],
        "units": [
            {
                "name": "Reserve.cdc",
                "kind": {"type": "contract", "contract": "Reserve"},
                "calls": [{"contract": "Reserve", "member": "deposit"}]
            }
        ]
    })
}

#[test]
fn stricter_implementation_depends_on_policy() {
    let batch = batch_from_value(stricter_implementation());

    let exact = check(&batch);
    assert_eq!(exact.kinds(), [DiagnosticKind::QualifierConflict]);
    assert_eq!(
        exact.unit("Reserve.cdc").unwrap().calls[0].annotation,
        CallAnnotation::Skipped
    );

    let relaxed = check_with(&batch, &CheckConfig {
        policy: ConformancePolicy::AllowStricter,
        ..CheckConfig::default()
    });
    assert!(relaxed.is_accepted());
    assert!(relaxed.unit("Reserve.cdc").unwrap().calls[0].token().is_some());
}

#[test]
fn weaker_implementation_is_rejected_under_every_policy() {
    let batch = batch_from_value(json!({
        "declarations": [
            {
                "kind": "interface",
                "name": "Pool",
                "address": "0x10",
                "functions": [{"name": "deposit", "qualifiers": ["auth"]}]
            },
            {
                "kind": "contract",
                "name": "Reserve",
                "address": "0x11",
                "conforms": ["Pool"],
                "functions": [{"name": "deposit", "qualifiers": ["account"]}]
            }
        ]
    }));

    for policy in [ConformancePolicy::Exact, ConformancePolicy::AllowStricter] {
        let report = check_with(&batch, &CheckConfig {
            policy,
            ..CheckConfig::default()
        });
        assert_eq!(report.kinds(), [DiagnosticKind::QualifierConflict]);
    }
}

#[test]
fn inherited_interfaces_are_checked_transitively() {
    let batch = batch_from_value(json!({
        "declarations": [
            {
                "kind": "interface",
                "name": "Base",
                "address": "0x20",
                "functions": [{"name": "close", "qualifiers": ["auth"]}]
            },
            {
                "kind": "interface",
                "name": "Derived",
                "address": "0x21",
                "conforms": ["Base"]
            },
            {
                "kind": "contract",
                "name": "Impl",
                "address": "0x22",
                "conforms": ["Derived"],
                "functions": [{"name": "close"}]
            }
        ]
    }));

    let checker = Checker::new(&batch.declarations, CheckConfig::default());
    assert_eq!(checker.declaration_diagnostics().kinds(), [
        DiagnosticKind::QualifierConflict
    ]);
    assert!(checker.table().is_rejected(&DeclId::member("Impl", "close")));
    assert_eq!(
        checker.table().qualifier(&DeclId::member("Base", "close")),
        Some(AccessQualifier::Authorized)
    );
}

#[test]
fn conformance_cycle_rejects_its_members() {
    let batch = batch_from_value(json!({
        "declarations": [
            {"kind": "interface", "name": "A", "address": "0x30", "conforms": ["B"]},
            {"kind": "interface", "name": "B", "address": "0x31", "conforms": ["A"]},
            {"kind": "contract", "name": "C", "address": "0x32", "conforms": ["Missing"]}
        ]
    }));

    let checker = Checker::new(&batch.declarations, CheckConfig::default());
    let diagnostics = checker.declaration_diagnostics();
    assert_eq!(diagnostics.count(DiagnosticKind::UnresolvedDeclaration), 3);
    for name in ["A", "B", "C"] {
        assert!(checker.table().is_rejected(&DeclId::contract(name)));
    }
}

#[test]
fn non_auth_mismatch_is_left_to_the_host() {
    let batch = batch_from_value(json!({
        "declarations": [
            {
                "kind": "interface",
                "name": "Reader",
                "address": "0x40",
                "functions": [{"name": "read", "qualifiers": ["account"]}]
            },
            {
                "kind": "contract",
                "name": "Book",
                "address": "0x41",
                "conforms": ["Reader"],
                "functions": [{"name": "read"}]
            }
        ]
    }));

    assert!(check(&batch).is_accepted());
}

#[test]
fn calls_inside_rejected_functions_are_skipped() {
    let batch = batch_from_value(json!({
        "declarations": [
            {
                "kind": "contract",
                "name": "Foo",
                "address": "0x01",
                "functions": [{"name": "bar", "qualifiers": ["auth"]}]
            },
            {
                "kind": "interface",
                "name": "Joinable",
                "address": "0x0a",
                "functions": [{"name": "join", "qualifiers": ["auth"]}]
            },
            {
                "kind": "contract",
                "name": "Club",
                "address": "0x0b",
                "conforms": ["Joinable"],
                "functions": [
                    {"name": "join"},
                    {"name": "dup", "qualifiers": ["all", "auth"]},
                    {"name": "open"}
                ]
            }
        ],
        "units": [
            {
                "name": "Club.cdc",
                "kind": {"type": "contract", "contract": "Club"},
                "imports": [{"contract": "Foo"}],
                "calls": [
                    {"contract": "Foo", "member": "bar", "function": "join",
                     "span": {"file": "Club.cdc", "line": 4}},
                    {"contract": "Foo", "member": "bar", "function": "dup",
                     "span": {"file": "Club.cdc", "line": 8}},
                    {"contract": "Foo", "member": "bar", "function": "open",
                     "span": {"file": "Club.cdc", "line": 12}}
                ]
            }
        ]
    }));

    let report = check(&batch);
    assert_eq!(report.kinds(), [
        DiagnosticKind::QualifierConflict,
        DiagnosticKind::QualifierConflict,
        DiagnosticKind::MissingAuthorization,
    ]);

    let unit = report.unit("Club.cdc").unwrap();
    assert_eq!(unit.calls[0].annotation, CallAnnotation::Skipped);
    assert_eq!(unit.calls[1].annotation, CallAnnotation::Skipped);
    assert!(unit.calls[2].is_rejected());
    assert_eq!(unit.diagnostics.len(), 1);
}
