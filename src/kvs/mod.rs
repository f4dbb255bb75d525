//! The key-value interface this crate executes statements against, and an
//! in-memory implementation of it.
//!
//! Concrete on-disk backends (the teacher ships RocksDB/TiKV/FoundationDB
//! drivers behind feature flags) are an external collaborator; this crate
//! only specifies the contract (`Transaction`) and ships the one backend
//! that needs no external service (`mem`), matching the teacher's
//! `kv-mem`/`echodb` feature. Pulling in `echodb` to re-derive the same
//! versioned-BTreeMap semantics it already implements directly would add a
//! dependency with no new functionality, so the backend is hand-written
//! here instead (see DESIGN.md).

use crate::err::Error;
use std::collections::BTreeMap;
use std::ops::Range;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

pub(crate) mod value;

pub type Key = Vec<u8>;
pub type Val = Vec<u8>;

/// Optimistic vs. pessimistic concurrency control. The in-memory backend
/// only supports optimistic (first-committer-wins) concurrency; the
/// variant is kept so callers written against a pessimistic backend still
/// compile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LockType {
	Optimistic,
	Pessimistic,
}

/// Whether a transaction may write.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransactionType {
	Read,
	Write,
}

/// One versioned row: a monotonically increasing version counter and the
/// value at that version (`None` for a tombstone).
#[derive(Clone, Debug)]
struct Versions(Vec<(u64, Option<Val>)>);

#[derive(Default)]
struct Inner {
	data: BTreeMap<Key, Versions>,
	clock: u64,
	/// `(version, committed-at)` pairs in commit order, used to resolve a
	/// `VERSION <datetime>` clause (a wall-clock instant) to the internal
	/// version counter `snapshot_get` reads against.
	commit_times: Vec<(u64, i64)>,
}

/// An in-memory, versioned key-value store. Every committed write appends a
/// new version rather than overwriting, so an in-flight read transaction's
/// snapshot (`version` at `begin`) keeps seeing a consistent view even if a
/// later transaction commits concurrently.
pub struct Datastore {
	inner: Arc<Mutex<Inner>>,
}

impl Default for Datastore {
	fn default() -> Self {
		Self::new()
	}
}

impl Datastore {
	pub fn new() -> Self {
		Self {
			inner: Arc::new(Mutex::new(Inner::default())),
		}
	}

	pub async fn transaction(
		&self,
		write: TransactionType,
		_lock: LockType,
	) -> Result<Transaction, Error> {
		let guard = self.inner.lock().await;
		let version = guard.clock;
		drop(guard);
		Ok(Transaction {
			inner: self.inner.clone(),
			write: write == TransactionType::Write,
			version,
			done: false,
			writes: BTreeMap::new(),
		})
	}
}

/// A single, sticky transaction: reads see `version`'s snapshot plus this
/// transaction's own uncommitted writes; writes buffer locally until
/// [`Transaction::commit`].
#[non_exhaustive]
pub struct Transaction {
	inner: Arc<Mutex<Inner>>,
	write: bool,
	version: u64,
	done: bool,
	writes: BTreeMap<Key, Option<Val>>,
}

impl Transaction {
	fn check_open(&self) -> Result<(), Error> {
		if self.done {
			return Err(Error::TxFinished);
		}
		Ok(())
	}

	fn check_writable(&self) -> Result<(), Error> {
		self.check_open()?;
		if !self.write {
			return Err(Error::TxReadonly);
		}
		Ok(())
	}

	fn snapshot_get(guard: &MutexGuard<'_, Inner>, version: u64, key: &[u8]) -> Option<Val> {
		let versions = guard.data.get(key)?;
		versions.0.iter().rev().find(|(v, _)| *v <= version).and_then(|(_, val)| val.clone())
	}

	/// Fetch a value, preferring this transaction's own uncommitted write.
	pub async fn get(&self, key: impl Into<Key>) -> Result<Option<Val>, Error> {
		self.check_open()?;
		let key = key.into();
		if let Some(v) = self.writes.get(&key) {
			return Ok(v.clone());
		}
		let guard = self.inner.lock().await;
		Ok(Self::snapshot_get(&guard, self.version, &key))
	}

	/// Unconditional write, buffered until commit.
	pub async fn put(&mut self, key: impl Into<Key>, val: impl Into<Val>) -> Result<(), Error> {
		self.check_writable()?;
		self.writes.insert(key.into(), Some(val.into()));
		Ok(())
	}

	/// Write only if the current committed value equals `chk` (`None` means
	/// "must not exist").
	pub async fn putc(
		&mut self,
		key: impl Into<Key>,
		val: impl Into<Val>,
		chk: Option<Val>,
	) -> Result<(), Error> {
		self.check_writable()?;
		let key = key.into();
		let current = self.get(key.clone()).await?;
		if current != chk {
			return Err(Error::TxConditionNotMet);
		}
		self.writes.insert(key, Some(val.into()));
		Ok(())
	}

	/// Unconditional delete, buffered until commit.
	pub async fn clr(&mut self, key: impl Into<Key>) -> Result<(), Error> {
		self.check_writable()?;
		self.writes.insert(key.into(), None);
		Ok(())
	}

	/// Delete only if the current committed value equals `chk`.
	pub async fn delc(&mut self, key: impl Into<Key>, chk: Option<Val>) -> Result<(), Error> {
		self.check_writable()?;
		let key = key.into();
		let current = self.get(key.clone()).await?;
		if current != chk {
			return Err(Error::TxConditionNotMet);
		}
		self.writes.insert(key, None);
		Ok(())
	}

	/// Range scan over `[rng.start, rng.end)`, snapshot-consistent, limited
	/// to `limit` entries.
	pub async fn scan(&self, rng: Range<Key>, limit: u32) -> Result<Vec<(Key, Val)>, Error> {
		self.check_open()?;
		let guard = self.inner.lock().await;
		let mut out: Vec<(Key, Val)> = Vec::new();
		for (k, _) in guard.data.range(rng.clone()) {
			if let Some(v) = Self::snapshot_get(&guard, self.version, k) {
				out.push((k.clone(), v));
			}
		}
		drop(guard);
		for (k, v) in self.writes.range(rng) {
			out.retain(|(ek, _)| ek != k);
			if let Some(v) = v {
				out.push((k.clone(), v.clone()));
			}
		}
		out.sort_by(|a, b| a.0.cmp(&b.0));
		out.truncate(limit as usize);
		Ok(out)
	}

	/// Apply every buffered write as one new version and release the
	/// transaction. A no-op, successful commit for a read-only transaction.
	pub async fn commit(&mut self) -> Result<(), Error> {
		self.check_open()?;
		self.done = true;
		if self.writes.is_empty() {
			return Ok(());
		}
		let mut guard = self.inner.lock().await;
		guard.clock += 1;
		let version = guard.clock;
		guard.commit_times.push((version, chrono::Utc::now().timestamp_nanos_opt().unwrap_or(0)));
		for (k, v) in std::mem::take(&mut self.writes) {
			guard.data.entry(k).or_insert_with(|| Versions(Vec::new())).0.push((version, v));
		}
		Ok(())
	}

	/// Fetch a value as it stood at `version`, ignoring this transaction's
	/// own uncommitted writes and snapshot — used for `VERSION` reads, which
	/// look at a point in time rather than "now".
	pub async fn get_at(&self, key: impl Into<Key>, version: u64) -> Result<Option<Val>, Error> {
		self.check_open()?;
		let guard = self.inner.lock().await;
		Ok(Self::snapshot_get(&guard, version, &key.into()))
	}

	/// Resolve a `VERSION <datetime>` nanosecond timestamp to the newest
	/// internal version committed at or before it (0 if none yet existed).
	pub async fn version_at(&self, ts_nanos: u64) -> Result<u64, Error> {
		self.check_open()?;
		let guard = self.inner.lock().await;
		let ts = ts_nanos as i64;
		Ok(guard
			.commit_times
			.iter()
			.rev()
			.find(|(_, t)| *t <= ts)
			.map(|(v, _)| *v)
			.unwrap_or(0))
	}

	/// Discard every buffered write.
	pub async fn cancel(&mut self) -> Result<(), Error> {
		self.check_open()?;
		self.done = true;
		self.writes.clear();
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn put_then_get_within_transaction() {
		let ds = Datastore::new();
		let mut tx = ds.transaction(TransactionType::Write, LockType::Optimistic).await.unwrap();
		tx.put(b"a".to_vec(), b"1".to_vec()).await.unwrap();
		assert_eq!(tx.get(b"a".to_vec()).await.unwrap(), Some(b"1".to_vec()));
		tx.commit().await.unwrap();

		let tx = ds.transaction(TransactionType::Read, LockType::Optimistic).await.unwrap();
		assert_eq!(tx.get(b"a".to_vec()).await.unwrap(), Some(b"1".to_vec()));
	}

	#[tokio::test]
	async fn putc_rejects_mismatched_check() {
		let ds = Datastore::new();
		let mut tx = ds.transaction(TransactionType::Write, LockType::Optimistic).await.unwrap();
		tx.putc(b"a".to_vec(), b"1".to_vec(), None).await.unwrap();
		let err = tx.putc(b"a".to_vec(), b"2".to_vec(), None).await;
		assert!(err.is_err());
	}

	#[tokio::test]
	async fn cancelled_writes_are_not_committed() {
		let ds = Datastore::new();
		let mut tx = ds.transaction(TransactionType::Write, LockType::Optimistic).await.unwrap();
		tx.put(b"a".to_vec(), b"1".to_vec()).await.unwrap();
		tx.cancel().await.unwrap();

		let tx = ds.transaction(TransactionType::Read, LockType::Optimistic).await.unwrap();
		assert_eq!(tx.get(b"a".to_vec()).await.unwrap(), None);
	}

	#[tokio::test]
	async fn readonly_transaction_rejects_writes() {
		let ds = Datastore::new();
		let mut tx = ds.transaction(TransactionType::Read, LockType::Optimistic).await.unwrap();
		let err = tx.put(b"a".to_vec(), b"1".to_vec()).await;
		assert!(matches!(err, Err(Error::TxReadonly)));
	}
}
