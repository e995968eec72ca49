use crate::common::{batch_from_value, check};
use serde_json::{Value, json};
use warden_checker::{AuthSource, CallAnnotation, TokenOrigin, TokenSource};
use warden_core::DiagnosticKind;

fn declarations() -> Value {
    json!([
        {
            "kind": "contract",
            "name": "Nodes",
            "address": "0x05",
            "functions": [
                {"name": "executed", "qualifiers": ["auth"]},
                {"name": "count"}
            ]
        }
    ])
}

fn transaction(authorizers: &[&str], imports: Value, calls: Value) -> Value {
    let authorizers: Vec<Value> = authorizers.iter().map(|name| json!({"name": name})).collect();
    json!({
        "declarations": declarations(),
        "units": [
            {
                "name": "tx.cdc",
                "kind": {"type": "transaction", "authorizers": authorizers},
                "imports": imports,
                "calls": calls
            }
        ]
    })
}

#[test]
fn single_authorizer_resolves_bare_prefix() {
    let report = check(&batch_from_value(transaction(
        &["signer"],
        json!([{"contract": "Nodes"}]),
        json!([{"contract": "Nodes", "member": "executed", "prefix": "bare", "phase": "prepare"}]),
    )));

    assert!(report.is_accepted());
    let call = &report.units[0].calls[0];
    assert_eq!(call.token().unwrap().source(), &TokenSource::Authorizer {
        name: "signer".into(),
        index: 0,
        of: 1,
    });
    assert_eq!(call.site.auth_source, AuthSource::AuthorizerName("signer".into()));
}

#[test]
fn authorized_import_resolves_through_the_authorizer() {
    let report = check(&batch_from_value(transaction(
        &["signer"],
        json!([{"contract": "Nodes", "mode": "auth"}]),
        json!([{"contract": "Nodes", "member": "executed", "phase": "prepare"}]),
    )));

    assert!(report.is_accepted());
    let call = &report.units[0].calls[0];
    assert!(matches!(
        call.annotation,
        CallAnnotation::Authorized {
            origin: TokenOrigin::AuthorizedImport,
            ..
        }
    ));
    assert!(call.site.has_auth_prefix);
}

#[test]
fn explicit_prefix_overrides_authorized_import() {
    let report = check(&batch_from_value(transaction(
        &["a1", "a2"],
        json!([{"contract": "Nodes", "mode": "auth"}]),
        json!([
            {"contract": "Nodes", "member": "executed", "phase": "prepare"},
            {"contract": "Nodes", "member": "executed", "prefix": {"named": "a2"},
             "phase": "prepare"}
        ]),
    )));

    // The implied bare prefix is still ambiguous with two authorizers.
    assert_eq!(report.kinds(), [DiagnosticKind::AmbiguousAuthorizer]);
    let explicit = &report.units[0].calls[1];
    assert!(matches!(
        explicit.annotation,
        CallAnnotation::Authorized {
            origin: TokenOrigin::ExplicitPrefix,
            ..
        }
    ));
    assert_eq!(explicit.token().unwrap().source(), &TokenSource::Authorizer {
        name: "a2".into(),
        index: 1,
        of: 2,
    });
}

#[test]
fn authorizers_are_only_visible_in_prepare() {
    let report = check(&batch_from_value(transaction(
        &["signer"],
        json!([{"contract": "Nodes"}]),
        json!([
            {"contract": "Nodes", "member": "executed", "prefix": "bare", "phase": "execute",
             "span": {"file": "tx.cdc", "line": 10}},
            {"contract": "Nodes", "member": "executed", "prefix": {"named": "signer"},
             "phase": "condition", "span": {"file": "tx.cdc", "line": 12}},
            {"contract": "Nodes", "member": "count", "phase": "execute",
             "span": {"file": "tx.cdc", "line": 13}}
        ]),
    )));

    assert_eq!(report.kinds(), [
        DiagnosticKind::MissingAuthorization,
        DiagnosticKind::UnknownAuthorizer
    ]);
    assert_eq!(
        report.units[0].calls[2].annotation,
        CallAnnotation::Unqualified
    );
}

#[test]
fn no_authorizer_and_unknown_name_fail() {
    let report = check(&batch_from_value(transaction(
        &[],
        json!([{"contract": "Nodes"}]),
        json!([
            {"contract": "Nodes", "member": "executed", "prefix": "bare", "phase": "prepare",
             "span": {"file": "tx.cdc", "line": 3}},
            {"contract": "Nodes", "member": "executed", "prefix": {"named": "ghost"},
             "phase": "prepare", "span": {"file": "tx.cdc", "line": 4}}
        ]),
    )));

    assert_eq!(report.kinds(), [
        DiagnosticKind::MissingAuthorization,
        DiagnosticKind::UnknownAuthorizer
    ]);
}

#[test]
fn duplicate_authorizer_names_conflict() {
    let report = check(&batch_from_value(transaction(
        &["payer", "payer"],
        json!([]),
        json!([]),
    )));

    assert_eq!(report.kinds(), [DiagnosticKind::QualifierConflict]);
}

#[test]
fn scripts_have_no_authorization_source() {
    let batch = batch_from_value(json!({
        "declarations": declarations(),
        "units": [
            {
                "name": "query.cdc",
                "kind": {"type": "script"},
                "imports": [{"contract": "Nodes", "mode": "auth"}],
                "calls": [{"contract": "Nodes", "member": "executed"}]
            }
        ]
    }));

    let report = check(&batch);
    assert_eq!(report.kinds(), [DiagnosticKind::MissingAuthorization]);
}
