//! The node-level entry point: owns the key-value store, the live-query
//! registry, and this node's identity, and turns a parsed [`Query`] plus a
//! [`Session`] into a batch of [`Response`]s.
use crate::ctx::MutableContext;
use crate::dbs::executor;
use crate::dbs::live::LiveQueryRegistry;
use crate::dbs::options::Options;
use crate::dbs::response::Response;
use crate::dbs::session::Session;
use crate::dbs::Notification;
use crate::err::Error;
use crate::kvs::Datastore as Kvs;
use crate::sql::query::Query;
use channel::Sender;
use std::sync::Arc;
use uuid::Uuid;

/// One node's database. Cheap to share across connections: the key-value
/// store and the live-query registry are each internally `Arc`-backed.
pub struct Datastore {
	kvs: Kvs,
	id: Uuid,
	live_queries: Arc<LiveQueryRegistry>,
}

impl Default for Datastore {
	fn default() -> Self {
		Self::new()
	}
}

impl Datastore {
	pub fn new() -> Self {
		Self {
			kvs: Kvs::new(),
			id: Uuid::new_v4(),
			live_queries: Arc::new(LiveQueryRegistry::new()),
		}
	}

	/// Fix this node's id, rather than generating a random one — useful for
	/// tests that assert on `$session` output or live-query ownership.
	pub fn with_node_id(mut self, id: Uuid) -> Self {
		self.id = id;
		self
	}

	pub(crate) fn kvs(&self) -> &Kvs {
		&self.kvs
	}

	pub(crate) fn live_queries(&self) -> Arc<LiveQueryRegistry> {
		self.live_queries.clone()
	}

	/// Run a batch of statements under `sess`'s identity and permissions.
	pub async fn process(&self, qry: impl Into<Query>, sess: &Session) -> Result<Vec<Response>, Error> {
		self.process_with(qry, sess, None).await
	}

	/// Like [`Self::process`], additionally delivering any live-query
	/// notifications this batch triggers to `notifications`.
	pub async fn process_with(
		&self,
		qry: impl Into<Query>,
		sess: &Session,
		notifications: Option<Sender<Notification>>,
	) -> Result<Vec<Response>, Error> {
		if sess.expired() {
			return Err(Error::ExpiredSession);
		}
		let mut root = MutableContext::background();
		root.set_live_queries(self.live_queries.clone());
		root.add_notifications(notifications.as_ref());
		let root = root.freeze();
		let ctx = sess.context(&root);
		let mut opt = Options::new()
			.with_required(self.id, sess.ns(), sess.db(), sess.au.clone())
			.with_live(sess.live())
			.with_connection(sess.sess_id);
		opt.sender = notifications;
		executor::execute_batch(&ctx, opt, self, qry.into()).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::sql::statements::crud::SelectStatement;
	use crate::sql::statements::misc::{InfoStatement, UseStatement};
	use crate::sql::statement::Statement;

	#[tokio::test]
	async fn use_then_info_for_namespace_sees_no_databases() {
		let ds = Datastore::new();
		let sess = Session::owner();
		let qry = Query::from(vec![
			Statement::Use(UseStatement {
				ns: Some("test".into()),
				db: None,
			}),
			Statement::Info(InfoStatement::Namespace),
		]);
		let res = ds.process(qry, &sess).await.unwrap();
		assert_eq!(res.len(), 2);
		let last = res.last().unwrap().result.as_ref().unwrap();
		assert_eq!(*last, crate::sql::value::Value::Array(Default::default()));
	}

	#[tokio::test]
	async fn select_without_a_selected_database_errors() {
		let ds = Datastore::new();
		let sess = Session::owner();
		let qry = Query::from(Statement::Select(SelectStatement {
			expr: crate::sql::field::Fields::all(),
			only: false,
			what: vec![crate::sql::value::Value::Table("person".into())],
			cond: None,
			group: None,
			order: None,
			limit: None,
			start: None,
			fetch: None,
			version: None,
			timeout: None,
		}));
		let res = ds.process(qry, &sess).await.unwrap();
		assert_eq!(res.len(), 1);
		assert!(res[0].result.is_err());
	}
}
