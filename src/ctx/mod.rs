//! The execution context threaded through every statement, expression and
//! document operation: cancellation, deadlines, parameter scopes and the
//! active transaction.
use crate::cnf::PROTECTED_PARAM_NAMES;
use crate::dbs::live::LiveQueryRegistry;
use crate::dbs::lock::LockMap;
use crate::dbs::Notification;
use crate::err::Error;
use crate::kvs::Transaction;
use crate::sql::value::Value;
use channel::Sender;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt::{self, Debug};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use trice::Instant;

/// Why a context stopped accepting further work.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Reason {
	Timedout,
	Canceled,
}

/// A frozen, shareable context. Contexts form a parent chain: children see
/// their own values first, then fall back to the parent's.
pub type Context = Arc<MutableContext>;

#[non_exhaustive]
pub struct MutableContext {
	parent: Option<Context>,
	deadline: Option<Instant>,
	cancelled: Arc<AtomicBool>,
	values: HashMap<Cow<'static, str>, Arc<Value>>,
	notifications: Option<Sender<Notification>>,
	transaction: Option<Arc<Mutex<Transaction>>>,
	live_queries: Option<Arc<LiveQueryRegistry>>,
	/// The current transaction's per-record lock map (see
	/// [`crate::dbs::lock::LockMap`]). `None` outside of a transaction
	/// context, e.g. a bare background context used in tests.
	lock_map: Option<Arc<LockMap>>,
	/// Live-query notifications raised while this transaction is open,
	/// held back until commit and discarded on cancel so a subscriber
	/// never observes a change that was rolled back. `None` outside of a
	/// transaction context.
	notify_buffer: Option<Arc<Mutex<Vec<Notification>>>>,
	/// When set, parameter lookups do not fall back to the parent, except
	/// for names in [`PROTECTED_PARAM_NAMES`].
	isolated: bool,
}

impl Default for MutableContext {
	fn default() -> Self {
		MutableContext::background()
	}
}

impl From<Transaction> for MutableContext {
	fn from(txn: Transaction) -> Self {
		let mut ctx = MutableContext::background();
		ctx.set_transaction(Arc::new(Mutex::new(txn)));
		ctx
	}
}

impl Debug for MutableContext {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.debug_struct("Context")
			.field("parent", &self.parent.is_some())
			.field("deadline", &self.deadline)
			.field("values", &self.values)
			.finish()
	}
}

/// A handle that cancels the context (and all of its children) when invoked.
pub struct Canceller(Arc<AtomicBool>);

impl Canceller {
	pub fn cancel(&self) {
		self.0.store(true, Ordering::Relaxed);
	}
}

impl MutableContext {
	/// An empty, non-cancellable background context.
	pub fn background() -> Self {
		Self {
			parent: None,
			deadline: None,
			cancelled: Arc::new(AtomicBool::new(false)),
			values: HashMap::new(),
			notifications: None,
			transaction: None,
			live_queries: None,
			lock_map: None,
			notify_buffer: None,
			isolated: false,
		}
	}

	/// A child context inheriting the parent's deadline, notification
	/// channel and transaction.
	pub fn new(parent: &Context) -> Self {
		Self {
			parent: Some(parent.clone()),
			deadline: parent.deadline,
			cancelled: Arc::new(AtomicBool::new(false)),
			values: HashMap::new(),
			notifications: parent.notifications.clone(),
			transaction: parent.transaction.clone(),
			live_queries: parent.live_queries.clone(),
			lock_map: parent.lock_map.clone(),
			notify_buffer: parent.notify_buffer.clone(),
			isolated: false,
		}
	}

	/// Like [`Self::new`], but parameter lookups stop at this context
	/// instead of continuing to the parent (used to sandbox a subquery's
	/// `LET`-bound names from the outer statement).
	pub fn new_isolated(parent: &Context) -> Self {
		let mut ctx = Self::new(parent);
		ctx.isolated = true;
		ctx
	}

	/// A child context detached from the parent's deadline, used by worker
	/// tasks that must run to completion once dispatched.
	pub fn new_concurrent(from: &Context) -> Self {
		Self {
			parent: None,
			deadline: None,
			cancelled: Arc::new(AtomicBool::new(false)),
			values: HashMap::new(),
			notifications: from.notifications.clone(),
			transaction: from.transaction.clone(),
			live_queries: from.live_queries.clone(),
			lock_map: from.lock_map.clone(),
			notify_buffer: from.notify_buffer.clone(),
			isolated: false,
		}
	}

	pub(crate) fn freeze(self) -> Context {
		Arc::new(self)
	}

	pub fn add_value<K>(&mut self, key: K, value: Arc<Value>)
	where
		K: Into<Cow<'static, str>>,
	{
		self.values.insert(key.into(), value);
	}

	pub fn add_cancel(&mut self) -> Canceller {
		Canceller(self.cancelled.clone())
	}

	pub fn add_deadline(&mut self, deadline: Instant) {
		match self.deadline {
			Some(current) if current < deadline => (),
			_ => self.deadline = Some(deadline),
		}
	}

	pub fn add_timeout(&mut self, timeout: Duration) -> Result<(), Error> {
		match Instant::now().checked_add(timeout) {
			Some(deadline) => {
				self.add_deadline(deadline);
				Ok(())
			}
			None => Err(crate::fail!("timeout of {timeout:?} overflowed the context deadline")),
		}
	}

	pub fn add_notifications(&mut self, chn: Option<&Sender<Notification>>) {
		self.notifications = chn.cloned();
	}

	pub(crate) fn set_transaction(&mut self, txn: Arc<Mutex<Transaction>>) {
		self.transaction = Some(txn);
	}

	/// The active transaction, shared with every other context in this
	/// request. Callers `.lock().await` it for the span of one read or
	/// write, matching the teacher's `tx_lock()` convention.
	pub(crate) fn tx(&self) -> Arc<Mutex<Transaction>> {
		self.transaction.clone().expect("context has no active transaction")
	}

	pub fn has_transaction(&self) -> bool {
		self.transaction.is_some()
	}

	pub(crate) fn set_live_queries(&mut self, reg: Arc<LiveQueryRegistry>) {
		self.live_queries = Some(reg);
	}

	/// The node's live-query registry, if this request was dispatched by a
	/// [`crate::dbs::Datastore`] that has one (tests and one-off statement
	/// evaluation may have none).
	pub(crate) fn live_queries(&self) -> Option<Arc<LiveQueryRegistry>> {
		self.live_queries.clone()
	}

	pub(crate) fn set_lock_map(&mut self, lock_map: Arc<LockMap>) {
		self.lock_map = Some(lock_map);
	}

	/// The current transaction's per-record lock map, if one was installed
	/// when this transaction's root context was built.
	pub(crate) fn lock_map(&self) -> Option<Arc<LockMap>> {
		self.lock_map.clone()
	}

	pub(crate) fn set_notify_buffer(&mut self, buf: Arc<Mutex<Vec<Notification>>>) {
		self.notify_buffer = Some(buf);
	}

	/// The current transaction's pending live-query notifications, if one
	/// was installed when this transaction's root context was built.
	pub(crate) fn notify_buffer(&self) -> Option<Arc<Mutex<Vec<Notification>>>> {
		self.notify_buffer.clone()
	}

	pub fn timeout(&self) -> Option<Duration> {
		self.deadline.map(|v| v.saturating_duration_since(Instant::now()))
	}

	pub fn notifications(&self) -> Option<Sender<Notification>> {
		self.notifications.clone()
	}

	/// The reason the context stopped accepting work, if any. Walks up the
	/// parent chain so a cancelled parent cancels every child.
	pub fn done(&self) -> Option<Reason> {
		match self.deadline {
			Some(deadline) if deadline <= Instant::now() => Some(Reason::Timedout),
			_ if self.cancelled.load(Ordering::Relaxed) => Some(Reason::Canceled),
			_ => match &self.parent {
				Some(ctx) => ctx.done(),
				None => None,
			},
		}
	}

	pub fn is_ok(&self) -> bool {
		self.done().is_none()
	}

	pub fn is_done(&self) -> bool {
		self.done().is_some()
	}

	pub fn is_timedout(&self) -> bool {
		matches!(self.done(), Some(Reason::Timedout))
	}

	/// Look up a bound parameter by name, walking the parent chain unless
	/// this context is isolated.
	pub fn value(&self, key: &str) -> Option<&Value> {
		match self.values.get(key) {
			Some(v) => Some(v.as_ref()),
			None if !self.isolated || PROTECTED_PARAM_NAMES.contains(&key) => {
				self.parent.as_ref().and_then(|p| p.value(key))
			}
			None => None,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn child_sees_parent_values() {
		let mut root = MutableContext::background();
		root.add_value("a", Arc::new(Value::Bool(true)));
		let root = root.freeze();
		let child = MutableContext::new(&root).freeze();
		assert_eq!(child.value("a"), Some(&Value::Bool(true)));
	}

	#[test]
	fn isolated_child_hides_parent_values() {
		let mut root = MutableContext::background();
		root.add_value("a", Arc::new(Value::Bool(true)));
		let root = root.freeze();
		let child = MutableContext::new_isolated(&root).freeze();
		assert_eq!(child.value("a"), None);
	}

	#[test]
	fn cancellation_propagates_to_children() {
		let mut root = MutableContext::background();
		let canceller = root.add_cancel();
		let root = root.freeze();
		let child = MutableContext::new(&root).freeze();
		assert!(child.is_ok());
		canceller.cancel();
		assert!(child.is_done());
	}
}
