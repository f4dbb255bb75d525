//! The document lifecycle: load, lock, merge, validate, index, store,
//! propagate. A `Document` pairs the `initial` snapshot (before the
//! statement ran) with the `current` one (after), and the pipeline modules
//! below each handle one step of turning the former into the latter.
use crate::ctx::Context;
use crate::dbs::Options;
use crate::err::Error;
use crate::key;
use crate::kvs::value as kv;
use crate::sql::statements::{
	DefineEventStatement, DefineFieldStatement, DefineIndexStatement, DefineTableStatement,
};
use crate::sql::thing::Thing;
use crate::sql::value::Value;
use std::fmt::Debug;
use std::ops::Deref;
use std::sync::Arc;

pub(crate) mod allow;
pub(crate) mod event;
pub(crate) mod field;
pub(crate) mod index;
pub(crate) mod lives;
pub(crate) mod pipeline;
pub(crate) mod table;

/// A value bound to a point in the document pipeline (`initial` or
/// `current`), cheaply cloneable via copy-on-write.
#[non_exhaustive]
#[derive(Clone, Debug)]
pub struct CursorValue {
	mutable: Value,
	read_only: Option<Arc<Value>>,
}

impl From<Value> for CursorValue {
	fn from(v: Value) -> Self {
		Self {
			mutable: v,
			read_only: None,
		}
	}
}

impl From<Arc<Value>> for CursorValue {
	fn from(v: Arc<Value>) -> Self {
		Self {
			mutable: Value::None,
			read_only: Some(v),
		}
	}
}

impl Deref for CursorValue {
	type Target = Value;
	fn deref(&self) -> &Self::Target {
		match &self.read_only {
			Some(v) => v,
			None => &self.mutable,
		}
	}
}

impl CursorValue {
	/// Get a mutable reference, cloning the shared value on first write.
	pub(crate) fn to_mut(&mut self) -> &mut Value {
		if let Some(ro) = self.read_only.take() {
			self.mutable = ro.as_ref().clone();
		}
		&mut self.mutable
	}

	pub(crate) fn into_owned(self) -> Value {
		match self.read_only {
			Some(v) => Arc::try_unwrap(v).unwrap_or_else(|v| v.as_ref().clone()),
			None => self.mutable,
		}
	}
}

/// A document snapshot: the record id it was read from (if any) plus the
/// value itself.
#[non_exhaustive]
#[derive(Clone, Debug)]
pub struct CursorDoc {
	pub rid: Option<Arc<Thing>>,
	pub doc: CursorValue,
}

impl CursorDoc {
	pub fn new(rid: Option<Arc<Thing>>, doc: impl Into<CursorValue>) -> Self {
		Self {
			rid,
			doc: doc.into(),
		}
	}
}

impl Deref for CursorDoc {
	type Target = Value;
	fn deref(&self) -> &Self::Target {
		&self.doc
	}
}

/// No single table carries more than this many field/index/event/foreign-
/// table definitions; a schema scan asking for more than this back is a
/// bug, not a table that legitimately needs paging.
const SCHEMA_SCAN_LIMIT: u32 = 1000;

/// One record moving through the pipeline for a single statement: the
/// `initial` snapshot read before the statement ran (`None` for a brand new
/// record) and the `current` value the pipeline steps mutate in place.
#[non_exhaustive]
pub struct Document {
	pub id: Option<Arc<Thing>>,
	pub initial: CursorDoc,
	pub current: CursorDoc,
	/// The record didn't exist before this statement.
	pub is_new: bool,
	/// This statement is deleting the record.
	pub is_delete: bool,
}

impl Document {
	pub fn new(id: Option<Arc<Thing>>, val: Value, is_new: bool) -> Self {
		let initial = CursorDoc::new(id.clone(), val.clone());
		let current = CursorDoc::new(id.clone(), val);
		Self {
			id,
			initial,
			current,
			is_new,
			is_delete: false,
		}
	}

	/// Whether `current` differs from `initial` — used to skip index and
	/// foreign-table maintenance when a write was a no-op.
	pub fn changed(&self) -> bool {
		*self.initial.doc != *self.current.doc
	}

	/// This document's record id, or an internal error if it has none (a
	/// bug in the calling pipeline step — every step past `init` requires
	/// one).
	pub(crate) fn rid(&self) -> Result<Arc<Thing>, Error> {
		self.id.clone().ok_or_else(|| Error::Internal("document has no record id".into()))
	}

	fn thing_key(&self, opt: &Options) -> Result<Vec<u8>, Error> {
		let rid = self.rid()?;
		key::thing(opt.ns()?, opt.db()?, &rid.tb, &rid.id)
	}

	/// Pipeline step 2: acquire this record's slot in the transaction's
	/// per-key lock map, serialising it against any other worker-pool task
	/// processing the same key concurrently. A document with no id yet
	/// (e.g. an `INSERT` that hasn't generated one) has nothing to key a
	/// lock on and skips locking.
	pub(crate) async fn lock(&self, ctx: &Context, opt: &Options) -> Result<Option<tokio::sync::OwnedMutexGuard<()>>, Error> {
		let Some(lock_map) = ctx.lock_map() else {
			return Ok(None);
		};
		if self.id.is_none() {
			return Ok(None);
		}
		let key = self.thing_key(opt)?;
		Ok(Some(lock_map.lock(key).await))
	}

	/// Release a lock acquired by [`Self::lock`].
	pub(crate) fn ulock(&self, guard: Option<tokio::sync::OwnedMutexGuard<()>>) {
		drop(guard);
	}

	/// Persist `current` at this document's key, or delete it if
	/// `is_delete`.
	pub(crate) async fn store(&self, ctx: &Context, opt: &Options) -> Result<(), Error> {
		let key = self.thing_key(opt)?;
		let tx = ctx.tx();
		let mut tx = tx.lock().await;
		if self.is_delete {
			tx.clr(key).await
		} else {
			let bytes = kv::encode(&self.current.doc)?;
			tx.put(key, bytes).await
		}
	}

	async fn scan_defs<T, F>(
		&self,
		ctx: &Context,
		range: std::ops::Range<Vec<u8>>,
		decode: F,
	) -> Result<Vec<T>, Error>
	where
		F: Fn(&[u8]) -> Result<T, Error>,
	{
		let tx = ctx.tx();
		let tx = tx.lock().await;
		let rows = tx.scan(range, SCHEMA_SCAN_LIMIT).await?;
		rows.iter().map(|(_, v)| decode(v)).collect()
	}

	/// Every `DEFINE FIELD` on this document's table.
	pub(crate) async fn fd(&self, ctx: &Context, opt: &Options) -> Result<Vec<DefineFieldStatement>, Error> {
		let rid = self.rid()?;
		let range = key::field_range(opt.ns()?, opt.db()?, &rid.tb);
		self.scan_defs(ctx, range, kv::decode_revisioned).await
	}

	/// Every `DEFINE INDEX` on this document's table.
	pub(crate) async fn ix(&self, ctx: &Context, opt: &Options) -> Result<Vec<DefineIndexStatement>, Error> {
		let rid = self.rid()?;
		let range = key::index_def_range(opt.ns()?, opt.db()?, &rid.tb);
		self.scan_defs(ctx, range, kv::decode_revisioned).await
	}

	/// Every `DEFINE EVENT` on this document's table.
	pub(crate) async fn ev(&self, ctx: &Context, opt: &Options) -> Result<Vec<DefineEventStatement>, Error> {
		let rid = self.rid()?;
		let range = key::event_range(opt.ns()?, opt.db()?, &rid.tb);
		self.scan_defs(ctx, range, kv::decode_revisioned).await
	}

	/// Every foreign (materialised-view) table fed by this document's table.
	pub(crate) async fn ft(&self, ctx: &Context, opt: &Options) -> Result<Vec<DefineTableStatement>, Error> {
		let rid = self.rid()?;
		let range = key::foreign_table_range(opt.ns()?, opt.db()?, &rid.tb);
		let prefix_len = range.start.len();
		let tx = ctx.tx();
		let tx = tx.lock().await;
		let rows = tx.scan(range, SCHEMA_SCAN_LIMIT).await?;
		let mut out = Vec::with_capacity(rows.len());
		for (k, _) in rows {
			let ft_name =
				std::str::from_utf8(&k[prefix_len..]).map_err(|e| Error::Serialization(e.to_string()))?;
			let key = key::table(opt.ns()?, opt.db()?, ft_name);
			if let Some(bytes) = tx.get(key).await? {
				out.push(kv::decode_revisioned(&bytes)?);
			}
		}
		Ok(out)
	}

	/// The table definition governing this document, if one has been
	/// registered with `DEFINE TABLE`.
	pub(crate) async fn tb(&self, ctx: &Context, opt: &Options) -> Result<Option<DefineTableStatement>, Error> {
		let rid = self.rid()?;
		let key = key::table(opt.ns()?, opt.db()?, &rid.tb);
		let tx = ctx.tx();
		let tx = tx.lock().await;
		match tx.get(key).await? {
			Some(bytes) => Ok(Some(kv::decode_revisioned(&bytes)?)),
			None => Ok(None),
		}
	}
}
