use crate::cnf::MAX_COMPUTATION_DEPTH;
use crate::dbs::Notification;
use crate::err::Error;
use crate::iam::{Action, Auth, Role};
use crate::sql::statements::define::{DefineIndexStatement, DefineTableStatement};
use crate::sql::Base;
use channel::Sender;
use std::sync::Arc;
use uuid::Uuid;

/// Carried through every `compute` call in a statement's evaluation: which
/// record version to read, whether futures/permissions/live-queries are
/// enabled, and how deep the remaining subquery/function recursion budget
/// is. Cloned and narrowed (`new_with_*`) when entering a subquery or
/// foreign-table recompute so the narrowing doesn't leak back to the caller.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct Options {
	id: Option<Uuid>,
	/// The client connection this request was issued on, distinct from
	/// `id` (the node). Stamped onto registered live queries so a write
	/// made by the same connection can skip notifying its own subscription.
	connection: Option<Uuid>,
	ns: Option<Arc<str>>,
	db: Option<Arc<str>>,
	/// Remaining recursion budget; decremented by `dive`.
	dive: u32,
	pub auth: Arc<Auth>,
	pub auth_enabled: bool,
	pub live: bool,
	/// Should table/event recomputation be forced even if nothing changed.
	pub force: Force,
	pub perms: bool,
	pub strict: bool,
	pub import: bool,
	pub futures: Futures,
	pub sender: Option<Sender<Notification>>,
	pub version: Option<u64>,
}

#[derive(Clone, Debug)]
#[non_exhaustive]
pub enum Force {
	All,
	None,
	Table(Arc<[DefineTableStatement]>),
	Index(Arc<[DefineIndexStatement]>),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Futures {
	Disabled,
	Enabled,
	Never,
}

impl Default for Options {
	fn default() -> Self {
		Options::new()
	}
}

impl Options {
	pub fn new() -> Options {
		Options {
			id: None,
			connection: None,
			ns: None,
			db: None,
			dive: *MAX_COMPUTATION_DEPTH,
			live: false,
			perms: true,
			force: Force::None,
			strict: false,
			import: false,
			futures: Futures::Disabled,
			auth_enabled: true,
			sender: None,
			auth: Arc::new(Auth::default()),
			version: None,
		}
	}

	pub fn set_ns(&mut self, ns: Option<Arc<str>>) {
		self.ns = ns;
	}

	pub fn set_db(&mut self, db: Option<Arc<str>>) {
		self.db = db;
	}

	pub fn with_required(
		mut self,
		node_id: Uuid,
		ns: Option<Arc<str>>,
		db: Option<Arc<str>>,
		auth: Arc<Auth>,
	) -> Self {
		self.id = Some(node_id);
		self.ns = ns;
		self.db = db;
		self.auth = auth;
		self
	}

	pub fn with_id(mut self, id: Uuid) -> Self {
		self.id = Some(id);
		self
	}

	pub fn with_connection(mut self, connection: Uuid) -> Self {
		self.connection = Some(connection);
		self
	}

	pub fn connection(&self) -> Option<Uuid> {
		self.connection
	}

	pub fn with_ns(mut self, ns: Option<Arc<str>>) -> Self {
		self.ns = ns;
		self
	}

	pub fn with_db(mut self, db: Option<Arc<str>>) -> Self {
		self.db = db;
		self
	}

	pub fn with_auth(mut self, auth: Arc<Auth>) -> Self {
		self.auth = auth;
		self
	}

	pub fn with_live(mut self, live: bool) -> Self {
		self.live = live;
		self
	}

	pub fn with_perms(mut self, perms: bool) -> Self {
		self.perms = perms;
		self
	}

	pub fn with_force(mut self, force: Force) -> Self {
		self.force = force;
		self
	}

	pub fn with_strict(mut self, strict: bool) -> Self {
		self.strict = strict;
		self
	}

	pub fn with_import(mut self, import: bool) -> Self {
		self.import = import;
		self
	}

	pub fn with_futures(mut self, futures: bool) -> Self {
		if matches!(self.futures, Futures::Never) {
			return self;
		}
		self.futures = if futures {
			Futures::Enabled
		} else {
			Futures::Disabled
		};
		self
	}

	pub fn with_futures_never(mut self) -> Self {
		self.futures = Futures::Never;
		self
	}

	pub fn with_auth_enabled(mut self, auth_enabled: bool) -> Self {
		self.auth_enabled = auth_enabled;
		self
	}

	pub fn with_version(mut self, version: Option<u64>) -> Self {
		self.version = version;
		self
	}

	fn fork(&self) -> Self {
		Self {
			id: self.id,
			connection: self.connection,
			ns: self.ns.clone(),
			db: self.db.clone(),
			dive: self.dive,
			auth: self.auth.clone(),
			auth_enabled: self.auth_enabled,
			live: self.live,
			force: self.force.clone(),
			perms: self.perms,
			strict: self.strict,
			import: self.import,
			futures: self.futures,
			sender: self.sender.clone(),
			version: self.version,
		}
	}

	pub fn new_with_perms(&self, perms: bool) -> Self {
		Self {
			perms,
			..self.fork()
		}
	}

	pub fn new_with_force(&self, force: Force) -> Self {
		Self {
			force,
			..self.fork()
		}
	}

	pub fn new_with_strict(&self, strict: bool) -> Self {
		Self {
			strict,
			..self.fork()
		}
	}

	pub fn new_with_import(&self, import: bool) -> Self {
		Self {
			import,
			..self.fork()
		}
	}

	pub fn new_with_futures(&self, futures: bool) -> Self {
		let futures = match self.futures {
			Futures::Never => Futures::Never,
			_ if futures => Futures::Enabled,
			_ => Futures::Disabled,
		};
		Self {
			futures,
			..self.fork()
		}
	}

	pub fn new_with_sender(&self, sender: Sender<Notification>) -> Self {
		Self {
			sender: Some(sender),
			..self.fork()
		}
	}

	pub fn selected_base(&self) -> Result<Base, Error> {
		match (self.ns.as_ref(), self.db.as_ref()) {
			(None, None) => Ok(Base::Root),
			(Some(_), None) => Ok(Base::Ns),
			(Some(_), Some(_)) => Ok(Base::Db),
			(None, Some(_)) => Err(Error::NsEmpty),
		}
	}

	/// Enter a deeper evaluation frame, charging `cost` against the
	/// remaining recursion budget.
	pub fn dive(&self, cost: u8) -> Result<Self, Error> {
		if self.dive < cost as u32 {
			return Err(Error::ComputationDepthExceeded);
		}
		Ok(Self {
			dive: self.dive - cost as u32,
			..self.fork()
		})
	}

	#[inline(always)]
	pub fn id(&self) -> Result<Uuid, Error> {
		self.id.ok_or_else(|| crate::fail!("No Node ID is specified"))
	}

	#[inline(always)]
	pub fn ns(&self) -> Result<&str, Error> {
		self.ns.as_deref().ok_or(Error::NsEmpty)
	}

	#[inline(always)]
	pub fn db(&self) -> Result<&str, Error> {
		self.db.as_deref().ok_or(Error::DbEmpty)
	}

	#[inline(always)]
	pub fn realtime(&self) -> Result<(), Error> {
		if !self.live {
			return Err(Error::RealtimeDisabled);
		}
		Ok(())
	}

	#[inline(always)]
	pub fn valid_for_ns(&self) -> Result<(), Error> {
		if self.ns.is_none() {
			return Err(Error::NsEmpty);
		}
		Ok(())
	}

	#[inline(always)]
	pub fn valid_for_db(&self) -> Result<(), Error> {
		self.valid_for_ns()?;
		if self.db.is_none() {
			return Err(Error::DbEmpty);
		}
		Ok(())
	}

	/// Whether the current auth's level encloses the selected ns/db.
	fn level_in_scope(&self) -> Result<bool, Error> {
		Ok(self.auth.is_kv()
			|| (self.auth.is_ns() && self.auth.level().ns() == Some(self.ns()?))
			|| (self.auth.is_db()
				&& self.auth.level().ns() == Some(self.ns()?)
				&& self.auth.level().db() == Some(self.db()?)))
	}

	/// Coarse level/role gate for a statement targeting `base`. Used ahead
	/// of the fine-grained `WHERE`-style table `Permission` clause (see
	/// `check_perms`), e.g. to reject `DEFINE TABLE` outright for a Viewer.
	pub fn is_allowed(&self, action: Action, base: &Base) -> Result<(), Error> {
		if !self.auth_enabled && self.auth.is_anon() {
			return Ok(());
		}
		match base {
			Base::Root => {
				if !self.auth.is_kv() {
					return Err(Error::IamError(crate::iam::Error::NotAllowed));
				}
			}
			Base::Ns => self.valid_for_ns()?,
			Base::Db => self.valid_for_db()?,
			Base::Sc(_) => return Err(Error::InvalidAuth),
		}
		if self.check_perms(action)? {
			return Err(Error::IamError(crate::iam::Error::NotAllowed));
		}
		Ok(())
	}

	/// Whether the table-level `Permission` clause for `action` should
	/// still be evaluated against the document (`true`), or whether the
	/// caller's role already grants blanket access (`false`).
	pub fn check_perms(&self, action: Action) -> Result<bool, Error> {
		if !self.perms {
			return Ok(false);
		}
		if !self.auth_enabled && self.auth.is_anon() {
			return Ok(false);
		}
		let can_view = [Role::Viewer, Role::Editor, Role::Owner].iter().any(|r| self.auth.has_role(r));
		let can_edit = [Role::Editor, Role::Owner].iter().any(|r| self.auth.has_role(r));
		let in_scope = self.level_in_scope()?;
		let is_allowed = match action {
			Action::View => can_view && in_scope,
			Action::Edit => can_edit && in_scope,
		};
		Ok(!is_allowed)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn is_allowed_root_requires_kv() {
		let opts = Options::default().with_auth_enabled(true);
		opts.is_allowed(Action::View, &Base::Root).unwrap_err();
		let opts = opts.with_auth(Auth::for_root(Role::Owner).into());
		opts.is_allowed(Action::View, &Base::Root).unwrap();
	}

	#[test]
	fn is_allowed_requires_matching_ns() {
		let opts =
			Options::default().with_auth_enabled(true).with_auth(Auth::for_ns(Role::Owner, "a").into());
		opts.clone().with_ns(Some("a".into())).is_allowed(Action::View, &Base::Ns).unwrap();
		opts.with_ns(Some("b".into())).is_allowed(Action::View, &Base::Ns).unwrap_err();
	}

	#[test]
	fn futures_never_cannot_be_re_enabled() {
		let opts = Options::default().with_futures_never();
		let opts = opts.with_futures(true);
		assert!(matches!(opts.futures, Futures::Never));
	}
}
