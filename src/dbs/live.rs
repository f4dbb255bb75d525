//! In-memory registry of active `LIVE SELECT` subscriptions, keyed by the
//! table they watch. Unlike `DEFINE TABLE`/`DEFINE FIELD`, a live query is
//! tied to one client connection rather than the schema, so it is never
//! persisted to the key-value store — it lives only as long as the node
//! process and is dropped on `KILL` or disconnect.
use crate::sql::statements::LiveStatement;
use crate::sql::uuid::Uuid;
use std::collections::HashMap;
use tokio::sync::RwLock;

type TableKey = (String, String, String);

#[derive(Default)]
pub(crate) struct LiveQueryRegistry {
	by_table: RwLock<HashMap<TableKey, Vec<LiveStatement>>>,
}

impl LiveQueryRegistry {
	pub(crate) fn new() -> Self {
		Self::default()
	}

	pub(crate) async fn register(&self, ns: &str, db: &str, tb: &str, lv: LiveStatement) {
		let key = (ns.to_owned(), db.to_owned(), tb.to_owned());
		self.by_table.write().await.entry(key).or_default().push(lv);
	}

	pub(crate) async fn unregister(&self, ns: &str, db: &str, tb: &str, id: &Uuid) {
		let key = (ns.to_owned(), db.to_owned(), tb.to_owned());
		let mut guard = self.by_table.write().await;
		if let Some(lvs) = guard.get_mut(&key) {
			lvs.retain(|lv| &lv.id != id);
		}
	}

	/// Every live query currently watching `tb`, cloned out so the caller
	/// can evaluate them without holding the registry lock.
	pub(crate) async fn get(&self, ns: &str, db: &str, tb: &str) -> Vec<LiveStatement> {
		let key = (ns.to_owned(), db.to_owned(), tb.to_owned());
		self.by_table.read().await.get(&key).cloned().unwrap_or_default()
	}

	/// Remove a live query by id alone, regardless of which table it is
	/// registered under — `KILL` only carries the id, not the table.
	pub(crate) async fn remove(&self, ns: &str, db: &str, id: &Uuid) {
		let mut guard = self.by_table.write().await;
		for ((kns, kdb, _), lvs) in guard.iter_mut() {
			if kns == ns && kdb == db {
				lvs.retain(|lv| &lv.id != id);
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::sql::field::Fields;
	use crate::sql::table::Table;

	fn lv(id: &str) -> LiveStatement {
		LiveStatement {
			id: Uuid::from(uuid::Uuid::parse_str(id).unwrap()),
			node: Uuid::from(uuid::Uuid::nil()),
			expr: Fields::all(),
			what: Table::from("person"),
			cond: None,
			fetch: None,
			diff: false,
			auth: None,
		}
	}

	#[tokio::test]
	async fn register_then_get_returns_it() {
		let reg = LiveQueryRegistry::new();
		let id = "8f0524d3-2d4e-4307-8e83-9b2f2c3a9b0f";
		reg.register("test", "test", "person", lv(id)).await;
		let found = reg.get("test", "test", "person").await;
		assert_eq!(found.len(), 1);
	}

	#[tokio::test]
	async fn unregister_removes_it() {
		let reg = LiveQueryRegistry::new();
		let id = "8f0524d3-2d4e-4307-8e83-9b2f2c3a9b0f";
		reg.register("test", "test", "person", lv(id)).await;
		reg.unregister("test", "test", "person", &Uuid::from(uuid::Uuid::parse_str(id).unwrap()))
			.await;
		assert!(reg.get("test", "test", "person").await.is_empty());
	}
}
