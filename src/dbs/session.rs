use crate::ctx::MutableContext;
use crate::iam::{Auth, Level, Role};
use crate::sql::value::Value;
use crate::sql::Uuid;
use chrono::Utc;
use std::sync::Arc;

/// The connection-scoped information carried alongside a query batch:
/// who is authenticated, which namespace/database is selected, and
/// whether the connection may register live queries.
#[derive(Clone, Debug, Default, PartialEq)]
#[non_exhaustive]
pub struct Session {
	pub sess_id: Uuid,
	pub au: Arc<Auth>,
	/// Whether this connection may register live queries.
	pub rt: bool,
	pub ip: Option<String>,
	pub or: Option<String>,
	pub id: Option<String>,
	pub ns: Option<String>,
	pub db: Option<String>,
	pub tk: Option<Value>,
	pub exp: Option<i64>,
}

impl Session {
	pub fn with_ns(mut self, ns: &str) -> Session {
		self.ns = Some(ns.to_owned());
		self
	}

	pub fn with_db(mut self, db: &str) -> Session {
		self.db = Some(db.to_owned());
		self
	}

	pub fn with_rt(mut self, rt: bool) -> Session {
		self.rt = rt;
		self
	}

	pub(crate) fn ns(&self) -> Option<Arc<str>> {
		self.ns.as_deref().map(Into::into)
	}

	pub(crate) fn db(&self) -> Option<Arc<str>> {
		self.db.as_deref().map(Into::into)
	}

	pub(crate) fn live(&self) -> bool {
		self.rt
	}

	pub(crate) fn expired(&self) -> bool {
		match self.exp {
			Some(exp) => Utc::now().timestamp() > exp,
			None => false,
		}
	}

	/// Build a child context carrying this session's identity as bound
	/// parameters (`$session`, `$token`), the way an authenticated
	/// connection's values become visible to every statement it runs.
	pub(crate) fn context(&self, parent: &crate::ctx::Context) -> crate::ctx::Context {
		let mut ctx = MutableContext::new(parent);
		ctx.add_value("token", Arc::new(self.tk.clone().unwrap_or_default()));
		let session = Value::Object(
			[
				("db".to_string(), self.db.clone().map(Value::from).unwrap_or_default()),
				("id".to_string(), self.id.clone().map(Value::from).unwrap_or_default()),
				("ip".to_string(), self.ip.clone().map(Value::from).unwrap_or_default()),
				("ns".to_string(), self.ns.clone().map(Value::from).unwrap_or_default()),
				("or".to_string(), self.or.clone().map(Value::from).unwrap_or_default()),
			]
			.into_iter()
			.collect(),
		);
		ctx.add_value("session", Arc::new(session));
		ctx.freeze()
	}

	/// A system session for internal operations (schema bootstrap,
	/// foreign-table recompute) not stored as a real connection.
	pub fn for_level(level: Level, role: Role) -> Session {
		let mut sess = Session::default();
		match level {
			Level::Kv => {
				sess.au = Arc::new(Auth::for_root(role));
			}
			Level::Ns(ns) => {
				sess.au = Arc::new(Auth::for_ns(role, &ns));
				sess.ns = Some(ns);
			}
			Level::Db(ns, db) => {
				sess.au = Arc::new(Auth::for_db(role, &ns, &db));
				sess.ns = Some(ns);
				sess.db = Some(db);
			}
			_ => {}
		}
		sess
	}

	pub fn owner() -> Session {
		Session::for_level(Level::Kv, Role::Owner)
	}

	pub fn editor() -> Session {
		Session::for_level(Level::Kv, Role::Editor)
	}

	pub fn viewer() -> Session {
		Session::for_level(Level::Kv, Role::Viewer)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn owner_session_is_kv_level() {
		let sess = Session::owner();
		assert!(sess.au.is_kv());
	}

	#[test]
	fn for_db_sets_ns_and_db() {
		let sess = Session::for_level(Level::Db("a".into(), "b".into()), Role::Editor);
		assert_eq!(sess.ns.as_deref(), Some("a"));
		assert_eq!(sess.db.as_deref(), Some("b"));
	}
}
