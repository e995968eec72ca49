//! Host compiler input consumed by the checker.
//!
//! A [`Batch`] is the declaration table of every contract and interface being compiled together
//! plus the compilation units (contract files, transactions, scripts) whose imports and call
//! expressions are checked against it. The host front end produces this; the checker never
//! parses source text.

use crate::address::Address;
use crate::qualifier::{AccessQualifier, ImportMode};
use crate::result::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Fully-qualified declaration id: `Contract` or `Contract.member`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeclId(String);

impl DeclId {
    pub fn contract(name: &str) -> Self {
        Self(name.to_string())
    }

    pub fn member(contract: &str, member: &str) -> Self {
        Self(format!("{contract}.{member}"))
    }

    /// Parses a dotted id, rejecting empty segments.
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.is_empty() || raw.split('.').any(str::is_empty) {
            return Err(Error::InvalidDeclId(raw.to_string()));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name of the contract or interface this id belongs to.
    pub fn contract_name(&self) -> &str {
        self.0.split('.').next().unwrap_or(&self.0)
    }

    pub fn is_member(&self) -> bool {
        self.0.contains('.')
    }
}

impl fmt::Display for DeclId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Source location reported by the host front end.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Span {
    #[serde(default)]
    pub file: String,
    #[serde(default)]
    pub line: u32,
    #[serde(default)]
    pub column: u32,
}

impl Span {
    pub fn new(file: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclKind {
    Contract,
    Interface,
}

impl fmt::Display for DeclKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclKind::Contract => f.write_str("contract"),
            DeclKind::Interface => f.write_str("interface"),
        }
    }
}

/// A contract or interface declaration with its member functions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Declaration {
    pub kind: DeclKind,
    pub name: String,
    /// Deployment address.
    pub address: Address,
    /// Qualifiers as written. Empty means `access(all)`.
    #[serde(default)]
    pub qualifiers: Vec<AccessQualifier>,
    /// Interfaces a contract conforms to, or an interface extends.
    #[serde(default)]
    pub conforms: Vec<String>,
    #[serde(default)]
    pub functions: Vec<FunctionDecl>,
    #[serde(default)]
    pub span: Span,
}

impl Declaration {
    pub fn contract(name: &str, address: Address) -> Self {
        Self::new(DeclKind::Contract, name, address)
    }

    pub fn interface(name: &str, address: Address) -> Self {
        Self::new(DeclKind::Interface, name, address)
    }

    fn new(kind: DeclKind, name: &str, address: Address) -> Self {
        Self {
            kind,
            name: name.to_string(),
            address,
            qualifiers: Vec::new(),
            conforms: Vec::new(),
            functions: Vec::new(),
            span: Span::default(),
        }
    }

    pub fn with_qualifier(mut self, qualifier: AccessQualifier) -> Self {
        self.qualifiers.push(qualifier);
        self
    }

    pub fn conforming_to(mut self, interface: &str) -> Self {
        self.conforms.push(interface.to_string());
        self
    }

    pub fn with_function(mut self, function: FunctionDecl) -> Self {
        self.functions.push(function);
        self
    }

    pub fn id(&self) -> DeclId {
        DeclId::contract(&self.name)
    }
}

/// A member function signature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDecl {
    pub name: String,
    #[serde(default)]
    pub qualifiers: Vec<AccessQualifier>,
    #[serde(default)]
    pub params: Vec<Param>,
    /// The body or its `pre`/`post` conditions read the authorization identifier.
    #[serde(default)]
    pub reads_auth: bool,
    #[serde(default)]
    pub span: Span,
}

impl FunctionDecl {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            qualifiers: Vec::new(),
            params: Vec::new(),
            reads_auth: false,
            span: Span::default(),
        }
    }

    pub fn with_qualifier(mut self, qualifier: AccessQualifier) -> Self {
        self.qualifiers.push(qualifier);
        self
    }

    pub fn with_param(mut self, name: &str, ty: &str) -> Self {
        self.params.push(Param {
            name: name.to_string(),
            ty: ty.to_string(),
        });
        self
    }

    pub fn reading_auth(mut self) -> Self {
        self.reads_auth = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
}

/// One source file handed to the checker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompilationUnit {
    pub name: String,
    pub kind: UnitKind,
    #[serde(default)]
    pub imports: Vec<ImportDecl>,
    #[serde(default)]
    pub calls: Vec<CallExpr>,
}

impl CompilationUnit {
    /// Contract whose code this unit contains, if any.
    pub fn own_contract(&self) -> Option<&str> {
        match &self.kind {
            UnitKind::Contract { contract } => Some(contract),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UnitKind {
    /// Code of the named contract (or interface).
    Contract { contract: String },
    /// A transaction; `authorizers` are the `prepare` parameters in declaration order.
    Transaction {
        #[serde(default)]
        authorizers: Vec<AuthorizerParam>,
    },
    Script,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorizerParam {
    pub name: String,
    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportDecl {
    pub contract: String,
    #[serde(default)]
    pub mode: ImportMode,
    #[serde(default)]
    pub span: Span,
}

/// A call to a contract member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallExpr {
    pub contract: String,
    pub member: String,
    /// Explicit authorization prefix written at the call site.
    #[serde(default)]
    pub prefix: Option<AuthPrefix>,
    #[serde(default)]
    pub phase: Phase,
    /// Enclosing function, for calls made from contract code.
    #[serde(default)]
    pub function: Option<String>,
    #[serde(default)]
    pub span: Span,
}

impl CallExpr {
    pub fn callee(&self) -> DeclId {
        DeclId::member(&self.contract, &self.member)
    }
}

/// `auth Foo.bar()` or `a1 Foo.bar()`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthPrefix {
    Bare,
    Named(String),
}

impl fmt::Display for AuthPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthPrefix::Bare => f.write_str("auth"),
            AuthPrefix::Named(name) => f.write_str(name),
        }
    }
}

/// Lexical region a call appears in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Contract function body or script body.
    #[default]
    Body,
    /// Transaction `prepare`; the only phase where authorizer parameters are in scope.
    Prepare,
    /// Transaction `execute`.
    Execute,
    /// Transaction `pre`/`post` conditions.
    Condition,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Body => f.write_str("body"),
            Phase::Prepare => f.write_str("prepare"),
            Phase::Execute => f.write_str("execute"),
            Phase::Condition => f.write_str("pre/post condition"),
        }
    }
}

/// Everything compiled together: the declaration table and the units checked against it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Batch {
    #[serde(default)]
    pub declarations: Vec<Declaration>,
    #[serde(default)]
    pub units: Vec<CompilationUnit>,
}

impl Batch {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a batch document from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| Error::FileRead {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&raw)
    }
}
