use crate::common::{ACCEPTED, CROSS_CONTRACT, batch, batch_from_value, check, check_with};
use serde_json::json;
use warden_checker::{CallAnnotation, CheckConfig, Checker, TokenOrigin, check_batch};
use warden_core::{Address, DiagnosticKind};

#[test]
fn accepted_batch_has_no_diagnostics() {
    let report = check(&batch(ACCEPTED));

    assert!(report.is_accepted(), "{:#?}", report.kinds());
    assert_eq!(report.units.len(), 3);

    let token_unit = report.unit("Token.cdc").unwrap();
    let self_call = token_unit.calls[0].token().unwrap();
    assert_eq!(
        self_call.static_address(),
        Some(Address::from_hex("0x01").unwrap())
    );
    assert!(matches!(
        token_unit.calls[0].annotation,
        CallAnnotation::Authorized {
            origin: TokenOrigin::SameContract,
            ..
        }
    ));

    let market = report.unit("Market.cdc").unwrap();
    assert!(matches!(
        market.calls[0].annotation,
        CallAnnotation::Authorized {
            origin: TokenOrigin::AuthorizedImport,
            ..
        }
    ));
    assert_eq!(
        market.calls[0].token().unwrap().static_address(),
        Some(Address::from_hex("0x02").unwrap())
    );
    assert_eq!(market.calls[1].annotation, CallAnnotation::Unqualified);
    // An authorized import supplies the prefix only where one is needed.
    assert!(market.calls[0].site.has_auth_prefix);
    assert!(!market.calls[1].site.has_auth_prefix);
}

#[test]
fn rechecking_is_idempotent() {
    let batch = batch(ACCEPTED);
    let first = check(&batch);
    let second = check(&batch);

    assert_eq!(first, second);
    assert!(second.is_accepted());
    assert_eq!(first.digest().unwrap(), second.digest().unwrap());
    assert!(first.digest().unwrap().starts_with("0x"));
    assert_eq!(first.digest().unwrap().len(), 66);
}

#[test]
fn digest_tracks_diagnostics() {
    let accepted = check(&batch(ACCEPTED));
    let rejected = check(&batch(CROSS_CONTRACT));
    assert_ne!(accepted.digest().unwrap(), rejected.digest().unwrap());
}

#[test]
fn parallel_run_matches_sequential_run() {
    for fixture in [ACCEPTED, CROSS_CONTRACT] {
        let batch = batch(fixture);
        let parallel = check(&batch);
        let sequential = check_with(&batch, &CheckConfig {
            parallel: false,
            ..CheckConfig::default()
        });
        assert_eq!(parallel, sequential);
    }
}

#[test]
fn large_batches_run_on_bounded_workers() {
    let units: Vec<_> = (0..20_000)
        .map(|i| json!({"name": format!("script{i}.cdc"), "kind": {"type": "script"}}))
        .collect();
    let batch = batch_from_value(json!({"declarations": [], "units": units}));

    let report = check(&batch);
    assert!(report.is_accepted());
    assert_eq!(report.units.len(), 20_000);
    assert_eq!(report.units[19_999].unit, "script19999.cdc");
}

#[test]
fn non_auth_callees_keep_existing_behaviour() {
    let batch = batch_from_value(json!({
        "declarations": [
            {
                "kind": "contract",
                "name": "Ledger",
                "address": "0x01",
                "functions": [
                    {"name": "total"},
                    {"name": "entries", "qualifiers": ["account"]},
                    {"name": "compact", "qualifiers": ["self"]}
                ]
            }
        ],
        "units": [
            {
                "name": "read.cdc",
                "kind": {"type": "script"},
                "imports": [{"contract": "Ledger", "mode": "auth"}],
                "calls": [
                    {"contract": "Ledger", "member": "total"},
                    {"contract": "Ledger", "member": "entries", "prefix": "bare"},
                    {"contract": "Ledger", "member": "compact"}
                ]
            }
        ]
    }));

    let report = check(&batch);
    assert!(report.is_accepted());
    let unit = report.unit("read.cdc").unwrap();
    assert!(
        unit.calls
            .iter()
            .all(|call| call.annotation == CallAnnotation::Unqualified)
    );
}

#[test]
fn checker_snapshot_is_shared_across_units() {
    let batch = batch(ACCEPTED);
    let checker = Checker::new(&batch.declarations, CheckConfig::default());
    let snapshot = checker.snapshot();

    let reports: Vec<_> = batch.units.iter().map(|u| checker.check_unit(u)).collect();
    assert!(reports.iter().all(|r| r.is_accepted()));
    assert_eq!(&*snapshot, checker.table());

    let whole = check_batch(&batch, &CheckConfig::default()).unwrap();
    assert_eq!(whole.units, reports);
}

#[test]
fn every_error_in_a_unit_is_reported() {
    let batch = batch_from_value(json!({
        "declarations": [
            {
                "kind": "contract",
                "name": "Vault",
                "address": "0x01",
                "functions": [
                    {"name": "open", "qualifiers": ["auth"]},
                    {"name": "close", "qualifiers": ["auth"]}
                ]
            },
            {"kind": "contract", "name": "Caller", "address": "0x02"}
        ],
        "units": [
            {
                "name": "Caller.cdc",
                "kind": {"type": "contract", "contract": "Caller"},
                "imports": [{"contract": "Vault"}, {"contract": "Nowhere"}],
                "calls": [
                    {"contract": "Vault", "member": "open",
                     "span": {"file": "Caller.cdc", "line": 4}},
                    {"contract": "Vault", "member": "close",
                     "span": {"file": "Caller.cdc", "line": 5}},
                    {"contract": "Vault", "member": "missing",
                     "span": {"file": "Caller.cdc", "line": 6}},
                    {"contract": "Vault", "member": "open", "prefix": {"named": "owner"},
                     "span": {"file": "Caller.cdc", "line": 7}}
                ]
            }
        ]
    }));

    let report = check(&batch);
    assert_eq!(report.kinds(), [
        DiagnosticKind::UnresolvedDeclaration,
        DiagnosticKind::MissingAuthorization,
        DiagnosticKind::MissingAuthorization,
        DiagnosticKind::UnresolvedDeclaration,
        DiagnosticKind::UnknownAuthorizer,
    ]);
}
