//! Access gating: authentication level, roles, and the per-statement action
//! a `Session` is attempting, checked against `sql::Permission` clauses.
//!
//! The teacher additionally ships JWT verification, sign-in/sign-up
//! statement handlers and a `cedar-policy` fine-grained authorization layer
//! (`iam/verify.rs`, `iam/signin.rs`, `iam/jwks.rs`). That machinery decodes
//! external credentials and is out of scope here; this module keeps only the
//! `Level`/`Role`/`Action` surface the executor itself consults.

use revision::revisioned;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors raised while checking or constructing an authentication context.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Error {
	#[error("Not enough permissions to perform this action")]
	NotAllowed,
	#[error("'{0}' is not a valid role")]
	InvalidRole(String),
}

/// The scope an authenticated actor is confined to: root, a namespace, a
/// database, or a record-access scope nested under a database. Ordered
/// coarsest to finest (`Kv > Ns > Db > Sc > No` in spec terms).
#[revisioned(revision = 1)]
#[derive(Clone, Debug, Default, Eq, PartialEq, PartialOrd, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Level {
	#[default]
	No,
	Kv,
	Ns(String),
	Db(String, String),
	Sc(String, String, String),
}

impl fmt::Display for Level {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::No => write!(f, "No"),
			Self::Kv => write!(f, "Kv"),
			Self::Ns(ns) => write!(f, "Ns({ns})"),
			Self::Db(ns, db) => write!(f, "Db({ns}, {db})"),
			Self::Sc(ns, db, sc) => write!(f, "Sc({ns}, {db}, {sc})"),
		}
	}
}

impl From<(&str,)> for Level {
	fn from((ns,): (&str,)) -> Self {
		Self::Ns(ns.to_owned())
	}
}

impl From<(&str, &str)> for Level {
	fn from((ns, db): (&str, &str)) -> Self {
		Self::Db(ns.to_owned(), db.to_owned())
	}
}

impl From<(&str, &str, &str)> for Level {
	fn from((ns, db, sc): (&str, &str, &str)) -> Self {
		Self::Sc(ns.to_owned(), db.to_owned(), sc.to_owned())
	}
}

impl Level {
	pub fn ns(&self) -> Option<&str> {
		match self {
			Self::Ns(ns) | Self::Db(ns, _) | Self::Sc(ns, _, _) => Some(ns),
			_ => None,
		}
	}

	pub fn db(&self) -> Option<&str> {
		match self {
			Self::Db(_, db) | Self::Sc(_, db, _) => Some(db),
			_ => None,
		}
	}
}

/// A predefined role. Custom roles are not supported.
#[revisioned(revision = 1)]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, PartialOrd, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Role {
	#[default]
	Viewer,
	Editor,
	Owner,
}

impl Role {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Viewer => "Viewer",
			Self::Editor => "Editor",
			Self::Owner => "Owner",
		}
	}
}

impl fmt::Display for Role {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl std::str::FromStr for Role {
	type Err = Error;
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"viewer" => Ok(Self::Viewer),
			"editor" => Ok(Self::Editor),
			"owner" => Ok(Self::Owner),
			_ => Err(Error::InvalidRole(s.to_owned())),
		}
	}
}

/// What a statement is attempting to do to a resource, for permission
/// clause selection (`Permissions::select`/`create`/`update`/`delete`
/// collapse to `View`/`Edit` here).
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd)]
#[non_exhaustive]
pub enum Action {
	View,
	Edit,
}

impl fmt::Display for Action {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::View => write!(f, "View"),
			Self::Edit => write!(f, "Edit"),
		}
	}
}

/// An authenticated identity: an id, the roles it holds, and the level it
/// was granted at.
#[revisioned(revision = 1)]
#[derive(Clone, Debug, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[non_exhaustive]
pub struct Actor {
	id: String,
	roles: Vec<Role>,
	level: Level,
}

impl Actor {
	pub fn new(id: String, roles: Vec<Role>, level: Level) -> Self {
		Self {
			id,
			roles,
			level,
		}
	}

	pub fn id(&self) -> &str {
		&self.id
	}

	pub fn level(&self) -> &Level {
		&self.level
	}

	pub fn has_role(&self, role: &Role) -> bool {
		self.roles.contains(role)
	}
}

/// The authentication context of the current session: who is acting, and
/// at what level.
#[revisioned(revision = 1)]
#[derive(Clone, Debug, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[non_exhaustive]
pub struct Auth {
	actor: Actor,
}

impl Auth {
	pub fn new(actor: Actor) -> Self {
		Self {
			actor,
		}
	}

	pub fn id(&self) -> &str {
		self.actor.id()
	}

	pub fn level(&self) -> &Level {
		self.actor.level()
	}

	pub fn is_anon(&self) -> bool {
		matches!(self.level(), Level::No)
	}

	pub fn is_kv(&self) -> bool {
		matches!(self.level(), Level::Kv)
	}

	pub fn is_ns(&self) -> bool {
		matches!(self.level(), Level::Ns(_))
	}

	pub fn is_db(&self) -> bool {
		matches!(self.level(), Level::Db(_, _))
	}

	pub fn is_scope(&self) -> bool {
		matches!(self.level(), Level::Sc(_, _, _))
	}

	pub fn has_role(&self, role: &Role) -> bool {
		self.actor.has_role(role)
	}

	/// System auth: not stored in the database, used for internal
	/// operations (schema bootstrap, foreign-table recompute) that must run
	/// regardless of the calling session's own permissions.
	pub fn for_root(role: Role) -> Self {
		Self::new(Actor::new("system_auth".into(), vec![role], Level::Kv))
	}

	pub fn for_ns(role: Role, ns: &str) -> Self {
		Self::new(Actor::new("system_auth".into(), vec![role], (ns,).into()))
	}

	pub fn for_db(role: Role, ns: &str, db: &str) -> Self {
		Self::new(Actor::new("system_auth".into(), vec![role], (ns, db).into()))
	}

	pub fn for_sc(rid: String, ns: &str, db: &str, sc: &str) -> Self {
		Self::new(Actor::new(rid, vec![], (ns, db, sc).into()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn level_ordering_is_coarsest_first() {
		assert!(Level::Kv < Level::Ns("a".into()));
		assert!(Level::Ns("a".into()) < Level::Db("a".into(), "b".into()));
	}

	#[test]
	fn for_root_grants_kv_level() {
		let auth = Auth::for_root(Role::Owner);
		assert!(auth.is_kv());
		assert!(auth.has_role(&Role::Owner));
	}
}
