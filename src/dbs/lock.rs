//! Per-record lock map: serialises concurrent document-pipeline passes
//! over the same key within one transaction, so two worker-pool tasks
//! writing the same record don't interleave their load/mutate/store spans.
//! Distinct from the transaction-wide `kvs::Transaction` mutex, which only
//! ever guards one KV call at a time, not a whole pipeline run. Scoped to a
//! single transaction: two concurrent transactions each get their own map
//! and instead coordinate through the KV layer's conditional puts.
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Default)]
pub(crate) struct LockMap {
	locks: DashMap<Vec<u8>, Arc<Mutex<()>>>,
}

impl LockMap {
	pub(crate) fn new() -> Self {
		Self::default()
	}

	/// Acquire the lock for `key`, creating it on first use. Entries are
	/// never evicted; a transaction that touches many distinct keys grows
	/// the map accordingly, traded here for simplicity since the map is
	/// dropped with the transaction anyway.
	pub(crate) async fn lock(&self, key: Vec<u8>) -> OwnedMutexGuard<()> {
		let entry = self.locks.entry(key).or_insert_with(|| Arc::new(Mutex::new(()))).clone();
		entry.lock_owned().await
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn same_key_serialises() {
		let lm = LockMap::new();
		let g1 = lm.lock(b"a".to_vec()).await;
		let lm = Arc::new(lm);
		let lm2 = lm.clone();
		let handle = tokio::spawn(async move {
			let _g2 = lm2.lock(b"a".to_vec()).await;
		});
		tokio::time::sleep(std::time::Duration::from_millis(20)).await;
		assert!(!handle.is_finished());
		drop(g1);
		handle.await.unwrap();
	}

	#[tokio::test]
	async fn different_keys_do_not_block() {
		let lm = LockMap::new();
		let _g1 = lm.lock(b"a".to_vec()).await;
		let g2 = tokio::time::timeout(std::time::Duration::from_millis(50), lm.lock(b"b".to_vec())).await;
		assert!(g2.is_ok());
	}
}
