//! Call-site authorizer.
//!
//! Decides, for every call expression, whether the callee needs a hidden authorization token
//! and where that token comes from. The rules apply in order:
//!
//! 1. A callee that is not `auth` needs no token; existing access rules are untouched.
//! 2. A same-contract call is self-authorized: the token is the enclosing contract.
//! 3. Otherwise a source must exist: an explicit prefix, or an `import auth` binding of the
//!    callee's contract. The explicit prefix wins when both are present.
//! 4. The source is resolved against the calling context and becomes the token.
//!
//! A member reached through a plain import of an `auth` contract is rejected before any of
//! this, whatever the member's own qualifier.

use crate::authorizers::{AuthorizerError, AuthorizerScope};
use crate::imports::ImportScope;
use crate::resolver::QualifierTable;
use crate::token::{AuthorizationToken, TokenSource};
use serde::Serialize;
use warden_core::{
    AccessQualifier, Address, AuthPrefix, CallExpr, CompilationUnit, DeclId, Diagnostic,
    DiagnosticKind, Diagnostics, Phase, Span, UnitKind,
};

/// Where a call's authorization was found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum AuthSource {
    None,
    ContractSelf,
    AuthorizerName(String),
}

impl From<&AuthorizationToken> for AuthSource {
    fn from(token: &AuthorizationToken) -> Self {
        match token.source() {
            TokenSource::Contract { .. } => AuthSource::ContractSelf,
            TokenSource::Authorizer { name, .. } => AuthSource::AuthorizerName(name.clone()),
        }
    }
}

/// The checker's view of one call expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallSite {
    pub callee: DeclId,
    /// `None` until the callee resolves.
    pub callee_qualifier: Option<AccessQualifier>,
    /// Written prefix, or one implied by an `import auth` binding.
    pub has_auth_prefix: bool,
    pub auth_source: AuthSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenOrigin {
    SameContract,
    ExplicitPrefix,
    AuthorizedImport,
}

/// What code generation is told about a call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CallAnnotation {
    /// Callee is not `auth`; no hidden argument.
    Unqualified,
    /// Pass `token` as the hidden first argument.
    Authorized {
        token: AuthorizationToken,
        origin: TokenOrigin,
    },
    Rejected { diagnostic: DiagnosticKind },
    /// Callee was rejected by an earlier pass; nothing further is reported.
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnotatedCall {
    pub site: CallSite,
    pub location: Span,
    pub annotation: CallAnnotation,
}

impl AnnotatedCall {
    pub fn token(&self) -> Option<&AuthorizationToken> {
        match &self.annotation {
            CallAnnotation::Authorized { token, .. } => Some(token),
            _ => None,
        }
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self.annotation, CallAnnotation::Rejected { .. })
    }

    /// Annotation for a call inside a unit whose own contract did not resolve.
    pub(crate) fn skipped(call: &CallExpr) -> Self {
        Self {
            site: CallSite {
                callee: call.callee(),
                callee_qualifier: None,
                has_auth_prefix: call.prefix.is_some(),
                auth_source: AuthSource::None,
            },
            location: call.span.clone(),
            annotation: CallAnnotation::Skipped,
        }
    }
}

/// Code the call appears in.
#[derive(Debug, Clone, Copy)]
enum Caller<'a> {
    Contract { name: &'a str, address: Address },
    Transaction(&'a AuthorizerScope),
    Script,
}

struct Rejection {
    kind: DiagnosticKind,
    message: String,
}

impl Rejection {
    fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Authorizes the calls of one compilation unit.
pub struct CallAuthorizer<'a> {
    table: &'a QualifierTable,
    imports: &'a ImportScope,
    caller: Caller<'a>,
}

impl<'a> CallAuthorizer<'a> {
    /// Returns `None` for a contract unit whose own contract did not resolve.
    pub fn new(
        unit: &'a CompilationUnit,
        table: &'a QualifierTable,
        imports: &'a ImportScope,
        authorizers: &'a AuthorizerScope,
    ) -> Option<Self> {
        let caller = match &unit.kind {
            UnitKind::Contract { contract } => Caller::Contract {
                name: contract,
                address: table.contract(contract)?.address,
            },
            UnitKind::Transaction { .. } => Caller::Transaction(authorizers),
            UnitKind::Script => Caller::Script,
        };
        Some(Self {
            table,
            imports,
            caller,
        })
    }

    /// Checks one call, reporting into `sink` when it is rejected.
    pub fn authorize(&self, call: &CallExpr, sink: &mut Diagnostics) -> AnnotatedCall {
        let mut site = CallSite {
            callee: call.callee(),
            callee_qualifier: None,
            has_auth_prefix: call.prefix.is_some(),
            auth_source: AuthSource::None,
        };

        let annotation = match self.decide(call, &mut site) {
            Ok(annotation) => annotation,
            Err(rejection) => {
                sink.report(
                    Diagnostic::new(rejection.kind, call.span.clone(), rejection.message)
                        .with_declaration(site.callee.clone()),
                );
                CallAnnotation::Rejected {
                    diagnostic: rejection.kind,
                }
            }
        };
        if let CallAnnotation::Authorized { token, .. } = &annotation {
            site.auth_source = AuthSource::from(token);
        }

        AnnotatedCall {
            site,
            location: call.span.clone(),
            annotation,
        }
    }

    fn decide(&self, call: &CallExpr, site: &mut CallSite) -> Result<CallAnnotation, Rejection> {
        let callee = site.callee.clone();
        if self.table.is_rejected(&callee) || self.in_rejected_function(call) {
            return Ok(CallAnnotation::Skipped);
        }
        let Some(contract) = self.table.contract(&call.contract) else {
            return Err(Rejection::new(
                DiagnosticKind::UnresolvedDeclaration,
                format!("unknown contract `{}`", call.contract),
            ));
        };

        let same_contract = matches!(
            self.caller,
            Caller::Contract { name, .. } if name == call.contract
        );
        let binding = if same_contract {
            None
        } else {
            let Some(binding) = self.imports.binding(&call.contract) else {
                return Err(Rejection::new(
                    DiagnosticKind::UnresolvedDeclaration,
                    format!("`{}` is not imported here", call.contract),
                ));
            };
            if !binding.usable {
                return Err(Rejection::new(
                    DiagnosticKind::ImportNotAuthorized,
                    format!(
                        "`{callee}` is reached through a plain import of auth contract `{}`",
                        call.contract
                    ),
                ));
            }
            Some(binding)
        };

        let Some(qualifier) = self.table.qualifier(&callee) else {
            return Err(Rejection::new(
                DiagnosticKind::UnresolvedDeclaration,
                format!("`{}` has no member `{}`", call.contract, call.member),
            ));
        };
        site.callee_qualifier = Some(qualifier);

        if !qualifier.is_authorized() {
            return Ok(CallAnnotation::Unqualified);
        }

        if same_contract {
            return Ok(CallAnnotation::Authorized {
                token: AuthorizationToken::contract(&call.contract, contract.address),
                origin: TokenOrigin::SameContract,
            });
        }

        let (prefix, origin) = match (&call.prefix, binding) {
            (Some(prefix), _) => (prefix.clone(), TokenOrigin::ExplicitPrefix),
            (None, Some(binding)) if binding.implies_authorization() => {
                site.has_auth_prefix = true;
                (AuthPrefix::Bare, TokenOrigin::AuthorizedImport)
            }
            _ => {
                return Err(Rejection::new(
                    DiagnosticKind::MissingAuthorization,
                    format!(
                        "call to auth function `{callee}` needs an authorization prefix or \
                         `import auth {}`",
                        call.contract
                    ),
                ));
            }
        };

        let token = self.resolve_prefix(&prefix, call.phase, &callee)?;
        Ok(CallAnnotation::Authorized { token, origin })
    }

    /// True when the call sits in a function of the calling contract that was rejected.
    fn in_rejected_function(&self, call: &CallExpr) -> bool {
        match (self.caller, &call.function) {
            (Caller::Contract { name, .. }, Some(function)) => {
                self.table.is_rejected(&DeclId::member(name, function))
            }
            _ => false,
        }
    }

    fn resolve_prefix(
        &self,
        prefix: &AuthPrefix,
        phase: Phase,
        callee: &DeclId,
    ) -> Result<AuthorizationToken, Rejection> {
        match (self.caller, prefix) {
            (Caller::Contract { name, address }, AuthPrefix::Bare) => {
                Ok(AuthorizationToken::contract(name, address))
            }
            (Caller::Contract { .. }, AuthPrefix::Named(authorizer)) => Err(Rejection::new(
                DiagnosticKind::UnknownAuthorizer,
                format!(
                    "`{authorizer}` is not an authorizer; contract code authorizes with the bare \
                     `auth` prefix"
                ),
            )),
            (Caller::Transaction(authorizers), prefix) if phase == Phase::Prepare => {
                let resolved = match prefix {
                    AuthPrefix::Bare => authorizers.resolve_bare(),
                    AuthPrefix::Named(name) => authorizers.resolve_named(name),
                };
                resolved.map_err(|err| authorizer_rejection(err, callee))
            }
            (Caller::Transaction(authorizers), AuthPrefix::Named(name))
                if authorizers.contains(name) =>
            {
                Err(Rejection::new(
                    DiagnosticKind::UnknownAuthorizer,
                    format!("authorizer `{name}` is only in scope in prepare, not in {phase}"),
                ))
            }
            (Caller::Transaction(_), AuthPrefix::Bare) => Err(Rejection::new(
                DiagnosticKind::MissingAuthorization,
                format!(
                    "no authorization source for `{callee}` in {phase}; authorizers are only in \
                     scope in prepare"
                ),
            )),
            (Caller::Script, AuthPrefix::Bare) => Err(Rejection::new(
                DiagnosticKind::MissingAuthorization,
                format!("scripts have no authorization source for `{callee}`"),
            )),
            (Caller::Transaction(_) | Caller::Script, AuthPrefix::Named(name)) => {
                Err(Rejection::new(
                    DiagnosticKind::UnknownAuthorizer,
                    format!("`{name}` is not an authorizer in scope"),
                ))
            }
        }
    }
}

fn authorizer_rejection(err: AuthorizerError, callee: &DeclId) -> Rejection {
    match err {
        AuthorizerError::None => Rejection::new(
            DiagnosticKind::MissingAuthorization,
            format!("transaction declares no authorizer to authorize `{callee}`"),
        ),
        AuthorizerError::Ambiguous(names) => Rejection::new(
            DiagnosticKind::AmbiguousAuthorizer,
            format!(
                "bare `auth` is ambiguous with {} authorizers ({}); name one of them to call \
                 `{callee}`",
                names.len(),
                names.join(", ")
            ),
        ),
        AuthorizerError::Unknown(name) => Rejection::new(
            DiagnosticKind::UnknownAuthorizer,
            format!("`{name}` is not a parameter of prepare"),
        ),
    }
}
