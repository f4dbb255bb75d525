use crate::sql::value::Value;
use revision::revisioned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// `USE NS ns [DB db]` — selects (and may narrow) the context's namespace
/// and database.
#[revisioned(revision = 1)]
#[derive(Clone, Debug, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct UseStatement {
	pub ns: Option<String>,
	pub db: Option<String>,
}

impl fmt::Display for UseStatement {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "USE")?;
		if let Some(ns) = &self.ns {
			write!(f, " NS {ns}")?;
		}
		if let Some(db) = &self.db {
			write!(f, " DB {db}")?;
		}
		Ok(())
	}
}

/// `LET $name = what`
#[revisioned(revision = 1)]
#[derive(Clone, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct SetStatement {
	pub name: String,
	pub what: Value,
}

impl fmt::Display for SetStatement {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "LET ${} = {}", self.name, self.what)
	}
}

/// `RETURN what` — ends the enclosing block early with this value.
#[revisioned(revision = 1)]
#[derive(Clone, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct OutputStatement {
	pub what: Value,
}

impl fmt::Display for OutputStatement {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "RETURN {}", self.what)
	}
}

#[revisioned(revision = 1)]
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct BeginStatement;

impl fmt::Display for BeginStatement {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.write_str("BEGIN")
	}
}

#[revisioned(revision = 1)]
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct CommitStatement;

impl fmt::Display for CommitStatement {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.write_str("COMMIT")
	}
}

#[revisioned(revision = 1)]
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct CancelStatement;

impl fmt::Display for CancelStatement {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.write_str("CANCEL")
	}
}

/// `OPTION name = bool` — a per-session executor toggle (e.g. disabling
/// embedded-record-id following for a single statement).
#[revisioned(revision = 1)]
#[derive(Clone, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct OptionStatement {
	pub name: String,
	pub what: bool,
}

impl fmt::Display for OptionStatement {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "OPTION {} = {}", self.name, self.what)
	}
}

/// The target of an `INFO FOR ...` statement.
#[revisioned(revision = 1)]
#[derive(Clone, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
#[non_exhaustive]
pub enum InfoStatement {
	Namespace,
	Database,
	Scope(String),
	Table(String),
}

impl fmt::Display for InfoStatement {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::Namespace => f.write_str("INFO FOR NAMESPACE"),
			Self::Database => f.write_str("INFO FOR DATABASE"),
			Self::Scope(s) => write!(f, "INFO FOR SCOPE {s}"),
			Self::Table(t) => write!(f, "INFO FOR TABLE {t}"),
		}
	}
}
