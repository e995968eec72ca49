//! Hidden authorization tokens synthesized for calls to `auth` functions.
//!
//! A token is created by the call-site authorizer, once per accepted call, and lowered into the
//! callee's hidden first argument. Tokens have no public constructor and no `Deserialize` impl:
//! the only way to obtain one is for the checker to accept a call.

use serde::Serialize;
use warden_core::{Address, Error as CoreError};

/// Where a token's account comes from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum TokenSource {
    /// Calling contract's deployment address. Same-contract and cross-contract calls produce
    /// the same shape; only the address tells them apart.
    Contract { contract: String, address: Address },
    /// The `index`-th of `of` transaction authorizers, named `name` in `prepare`.
    Authorizer {
        name: String,
        index: usize,
        of: usize,
    },
}

/// Value passed as the hidden first argument of an `auth` function.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct AuthorizationToken {
    #[serde(flatten)]
    source: TokenSource,
}

/// The hidden argument as code generation sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HiddenArgument {
    /// Address known at compile time.
    Address(Address),
    /// Load the authorizer at this position of the submitted transaction.
    AuthorizerSlot(usize),
}

impl AuthorizationToken {
    pub(crate) fn contract(contract: &str, address: Address) -> Self {
        Self {
            source: TokenSource::Contract {
                contract: contract.to_string(),
                address,
            },
        }
    }

    pub(crate) fn authorizer(name: &str, index: usize, of: usize) -> Self {
        Self {
            source: TokenSource::Authorizer {
                name: name.to_string(),
                index,
                of,
            },
        }
    }

    pub fn source(&self) -> &TokenSource {
        &self.source
    }

    /// Address when it is fixed at compile time (contract tokens).
    pub fn static_address(&self) -> Option<Address> {
        match &self.source {
            TokenSource::Contract { address, .. } => Some(*address),
            TokenSource::Authorizer { .. } => None,
        }
    }

    pub fn hidden_argument(&self) -> HiddenArgument {
        match &self.source {
            TokenSource::Contract { address, .. } => HiddenArgument::Address(*address),
            TokenSource::Authorizer { index, .. } => HiddenArgument::AuthorizerSlot(*index),
        }
    }

    /// Resolves the token's account against the authorizers a transaction was submitted with.
    ///
    /// Fails when the submission carries a different number of authorizers than `prepare`
    /// declares; contract tokens ignore the submission.
    pub fn bind(&self, submitted: &[Address]) -> Result<Address, CoreError> {
        match &self.source {
            TokenSource::Contract { address, .. } => Ok(*address),
            TokenSource::Authorizer { index, of, .. } => {
                if submitted.len() != *of {
                    return Err(CoreError::AuthorizerCountMismatch {
                        expected: *of,
                        actual: submitted.len(),
                    });
                }
                Ok(submitted[*index])
            }
        }
    }
}
