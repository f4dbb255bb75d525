use crate::sql::algorithm::Algorithm;
use crate::sql::base::Base;
use crate::sql::duration::Duration;
use crate::sql::ident::Ident;
use crate::sql::idiom::Idiom;
use crate::sql::kind::Kind;
use crate::sql::permission::Permissions;
use crate::sql::table::Table;
use crate::sql::value::Value;
use crate::sql::view::View;
use revision::revisioned;
use serde::{Deserialize, Serialize};
use std::fmt;

#[revisioned(revision = 1)]
#[derive(Clone, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct DefineNamespaceStatement {
	pub name: Ident,
	pub if_not_exists: bool,
}

impl fmt::Display for DefineNamespaceStatement {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "DEFINE NAMESPACE {}", self.name)
	}
}

#[revisioned(revision = 1)]
#[derive(Clone, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct DefineDatabaseStatement {
	pub name: Ident,
	pub if_not_exists: bool,
}

impl fmt::Display for DefineDatabaseStatement {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "DEFINE DATABASE {}", self.name)
	}
}

/// `DEFINE TABLE name [SCHEMAFULL] [DROP] [PERMISSIONS ...] [AS SELECT
/// ...]`. A table with a `view` is a foreign (materialised) table: its rows
/// are recomputed, never written directly.
#[revisioned(revision = 1)]
#[derive(Clone, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct DefineTableStatement {
	pub name: Ident,
	/// `SCHEMAFULL`: reject/strip fields not declared by `DEFINE FIELD`.
	pub full: bool,
	/// Silently drop writes to this table instead of storing them.
	pub drop: bool,
	pub view: Option<View>,
	pub permissions: Permissions,
	pub if_not_exists: bool,
}

impl fmt::Display for DefineTableStatement {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "DEFINE TABLE {}", self.name)?;
		if self.full {
			write!(f, " SCHEMAFULL")?;
		}
		if self.drop {
			write!(f, " DROP")?;
		}
		if let Some(view) = &self.view {
			write!(f, " {view}")?;
		}
		Ok(())
	}
}

/// `DEFINE FIELD name ON what [TYPE kind] [VALUE expr] [ASSERT expr]
/// [DEFAULT expr] [PERMISSIONS ...]`
#[revisioned(revision = 1)]
#[derive(Clone, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct DefineFieldStatement {
	pub name: Idiom,
	pub what: Table,
	pub kind: Option<Kind>,
	/// Recomputed on every write, overriding whatever the caller supplied.
	pub value: Option<Value>,
	/// Must evaluate truthy (against `$value`) or the write is rejected.
	pub assert: Option<Value>,
	/// Used only when the caller didn't supply a value.
	pub default: Option<Value>,
	/// Rejects any write that changes this field once the record exists.
	pub readonly: bool,
	pub permissions: Permissions,
	pub if_not_exists: bool,
}

impl fmt::Display for DefineFieldStatement {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "DEFINE FIELD {} ON {}", self.name, self.what)?;
		if let Some(kind) = &self.kind {
			write!(f, " TYPE {kind}")?;
		}
		if let Some(v) = &self.value {
			write!(f, " VALUE {v}")?;
		}
		if let Some(v) = &self.assert {
			write!(f, " ASSERT {v}")?;
		}
		if let Some(v) = &self.default {
			write!(f, " DEFAULT {v}")?;
		}
		if self.readonly {
			write!(f, " READONLY")?;
		}
		Ok(())
	}
}

/// `DEFINE INDEX name ON what COLUMNS col, ... [UNIQUE]`
#[revisioned(revision = 1)]
#[derive(Clone, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct DefineIndexStatement {
	pub name: Ident,
	pub what: Table,
	pub cols: Vec<Idiom>,
	pub unique: bool,
	pub if_not_exists: bool,
}

impl fmt::Display for DefineIndexStatement {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "DEFINE INDEX {} ON {} COLUMNS ", self.name, self.what)?;
		for (i, c) in self.cols.iter().enumerate() {
			if i > 0 {
				write!(f, ", ")?;
			}
			write!(f, "{c}")?;
		}
		if self.unique {
			write!(f, " UNIQUE")?;
		}
		Ok(())
	}
}

/// `DEFINE EVENT name ON what WHEN cond THEN expr`
#[revisioned(revision = 1)]
#[derive(Clone, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct DefineEventStatement {
	pub name: Ident,
	pub what: Table,
	pub when: Value,
	pub then: Value,
	pub if_not_exists: bool,
}

impl fmt::Display for DefineEventStatement {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "DEFINE EVENT {} ON {} WHEN {} THEN {}", self.name, self.what, self.when, self.then)
	}
}

/// `DEFINE LOGIN name ON NAMESPACE|DATABASE PASSHASH hash` — a user account
/// authenticating directly against a namespace or database, independent of
/// any scope.
#[revisioned(revision = 1)]
#[derive(Clone, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct DefineLoginStatement {
	pub name: Ident,
	/// `Base::Ns` or `Base::Db` — where this account is checked against.
	pub base: Base,
	pub passhash: String,
	pub if_not_exists: bool,
}

impl fmt::Display for DefineLoginStatement {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "DEFINE LOGIN {} ON {} PASSHASH {:?}", self.name, self.base, self.passhash)
	}
}

/// `DEFINE TOKEN name ON NAMESPACE|DATABASE TYPE alg VALUE secret` — a
/// bearer token verifier accepted in place of a login at the named base.
#[revisioned(revision = 1)]
#[derive(Clone, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct DefineTokenStatement {
	pub name: Ident,
	pub base: Base,
	pub kind: Algorithm,
	pub code: String,
	pub if_not_exists: bool,
}

impl fmt::Display for DefineTokenStatement {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "DEFINE TOKEN {} ON {} TYPE {} VALUE {:?}", self.name, self.base, self.kind, self.code)
	}
}

/// `DEFINE SCOPE name [SESSION dur] [SIGNUP expr] [SIGNIN expr]` — a
/// record-level authentication scope: `SIGNUP`/`SIGNIN` are evaluated
/// against the caller's supplied variables and must resolve to a record id
/// to issue a session.
#[revisioned(revision = 1)]
#[derive(Clone, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct DefineScopeStatement {
	pub name: Ident,
	pub session: Option<Duration>,
	pub signup: Option<Value>,
	pub signin: Option<Value>,
	pub if_not_exists: bool,
}

impl fmt::Display for DefineScopeStatement {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "DEFINE SCOPE {}", self.name)?;
		if let Some(d) = &self.session {
			write!(f, " SESSION {d}")?;
		}
		if let Some(v) = &self.signup {
			write!(f, " SIGNUP {v}")?;
		}
		if let Some(v) = &self.signin {
			write!(f, " SIGNIN {v}")?;
		}
		Ok(())
	}
}

#[revisioned(revision = 1)]
#[derive(Clone, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
#[non_exhaustive]
pub enum DefineStatement {
	Namespace(DefineNamespaceStatement),
	Database(DefineDatabaseStatement),
	Table(DefineTableStatement),
	Field(DefineFieldStatement),
	Index(DefineIndexStatement),
	Event(DefineEventStatement),
	Login(DefineLoginStatement),
	Token(DefineTokenStatement),
	Scope(DefineScopeStatement),
}

impl fmt::Display for DefineStatement {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::Namespace(v) => write!(f, "{v}"),
			Self::Database(v) => write!(f, "{v}"),
			Self::Table(v) => write!(f, "{v}"),
			Self::Field(v) => write!(f, "{v}"),
			Self::Index(v) => write!(f, "{v}"),
			Self::Event(v) => write!(f, "{v}"),
			Self::Login(v) => write!(f, "{v}"),
			Self::Token(v) => write!(f, "{v}"),
			Self::Scope(v) => write!(f, "{v}"),
		}
	}
}
