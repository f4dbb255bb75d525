use crate::sql::base::Base;
use crate::sql::ident::Ident;
use crate::sql::idiom::Idiom;
use crate::sql::table::Table;
use revision::revisioned;
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! remove_by_name {
	($name:ident, $kw:expr) => {
		#[revisioned(revision = 1)]
		#[derive(Clone, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
		pub struct $name {
			pub name: Ident,
			pub if_exists: bool,
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
				write!(f, concat!("REMOVE ", $kw, " {}"), self.name)
			}
		}
	};
}

remove_by_name!(RemoveNamespaceStatement, "NAMESPACE");
remove_by_name!(RemoveDatabaseStatement, "DATABASE");

#[revisioned(revision = 1)]
#[derive(Clone, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct RemoveTableStatement {
	pub name: Ident,
	pub if_exists: bool,
}

impl fmt::Display for RemoveTableStatement {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "REMOVE TABLE {}", self.name)
	}
}

#[revisioned(revision = 1)]
#[derive(Clone, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct RemoveFieldStatement {
	pub name: Idiom,
	pub what: Table,
	pub if_exists: bool,
}

impl fmt::Display for RemoveFieldStatement {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "REMOVE FIELD {} ON {}", self.name, self.what)
	}
}

#[revisioned(revision = 1)]
#[derive(Clone, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct RemoveIndexStatement {
	pub name: Ident,
	pub what: Table,
	pub if_exists: bool,
}

impl fmt::Display for RemoveIndexStatement {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "REMOVE INDEX {} ON {}", self.name, self.what)
	}
}

#[revisioned(revision = 1)]
#[derive(Clone, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct RemoveEventStatement {
	pub name: Ident,
	pub what: Table,
	pub if_exists: bool,
}

impl fmt::Display for RemoveEventStatement {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "REMOVE EVENT {} ON {}", self.name, self.what)
	}
}

/// `REMOVE LOGIN name ON NAMESPACE|DATABASE`
#[revisioned(revision = 1)]
#[derive(Clone, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct RemoveLoginStatement {
	pub name: Ident,
	pub base: Base,
	pub if_exists: bool,
}

impl fmt::Display for RemoveLoginStatement {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "REMOVE LOGIN {} ON {}", self.name, self.base)
	}
}

/// `REMOVE TOKEN name ON NAMESPACE|DATABASE`
#[revisioned(revision = 1)]
#[derive(Clone, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct RemoveTokenStatement {
	pub name: Ident,
	pub base: Base,
	pub if_exists: bool,
}

impl fmt::Display for RemoveTokenStatement {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "REMOVE TOKEN {} ON {}", self.name, self.base)
	}
}

/// `REMOVE SCOPE name`
#[revisioned(revision = 1)]
#[derive(Clone, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct RemoveScopeStatement {
	pub name: Ident,
	pub if_exists: bool,
}

impl fmt::Display for RemoveScopeStatement {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "REMOVE SCOPE {}", self.name)
	}
}

#[revisioned(revision = 1)]
#[derive(Clone, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
#[non_exhaustive]
pub enum RemoveStatement {
	Namespace(RemoveNamespaceStatement),
	Database(RemoveDatabaseStatement),
	Table(RemoveTableStatement),
	Field(RemoveFieldStatement),
	Index(RemoveIndexStatement),
	Event(RemoveEventStatement),
	Login(RemoveLoginStatement),
	Token(RemoveTokenStatement),
	Scope(RemoveScopeStatement),
}

impl fmt::Display for RemoveStatement {
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
