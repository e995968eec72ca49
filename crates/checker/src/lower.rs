//! Lowered signatures of `auth` functions.
//!
//! The authorization identifier is an ordinary value parameter injected in front of the
//! declared ones. Its name starts with `$`, which no source identifier can, so it never
//! collides with or is shadowed by user code.

use serde::Serialize;
use warden_core::{DeclId, FunctionDecl, Param};

/// Name of the injected parameter.
pub const AUTH_PARAM: &str = "$auth";
/// Type of the injected parameter: a read-only view of the authorizing account.
pub const AUTH_PARAM_TYPE: &str = "AuthAccount";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoweredSignature {
    pub function: DeclId,
    /// Hidden parameter first, declared parameters after it.
    pub params: Vec<Param>,
}

impl LoweredSignature {
    pub fn hidden(&self) -> &Param {
        &self.params[0]
    }

    pub fn declared(&self) -> &[Param] {
        &self.params[1..]
    }
}

pub fn lower_signature(function: DeclId, decl: &FunctionDecl) -> LoweredSignature {
    let mut params = Vec::with_capacity(decl.params.len() + 1);
    params.push(Param {
        name: AUTH_PARAM.to_string(),
        ty: AUTH_PARAM_TYPE.to_string(),
    });
    params.extend(decl.params.iter().cloned());
    LoweredSignature { function, params }
}
