//! The single entry point every statement handler (`CREATE`/`UPDATE`/
//! `UPSERT`/`DELETE`/`INSERT`/`RELATE`) funnels a record through once it has
//! computed the record's new value. Composes the per-concern steps the
//! sibling modules implement, in a fixed order: field clauses, schema
//! enforcement, table permissions, index maintenance, storage, foreign-table
//! maintenance, live-query notification, events.
use crate::ctx::Context;
use crate::dbs::Options;
use crate::doc::Document;
use crate::err::Error;
use crate::key;
use crate::kvs::value as kv;
use crate::sql::thing::Thing;
use crate::sql::value::Value;
use reblessive::tree::Stk;
use std::sync::Arc;

impl Document {
	/// Run a new or updated record through the full pipeline and return the
	/// stored value, or `Error::Ignore` if a permission/condition step
	/// filtered the record out (the caller should drop it from the result
	/// set rather than fail the statement).
	pub(crate) async fn pipeline(
		stk: &mut Stk,
		ctx: &Context,
		opt: &Options,
		id: Option<Arc<Thing>>,
		current: Value,
		is_new: bool,
	) -> Result<Value, Error> {
		let mut doc = match id.clone() {
			Some(rid) => Self::load(ctx, opt, rid, is_new).await?,
			None => Document::new(None, Value::None, true),
		};
		doc.current.doc = current.into();
		if let Some(rid) = &id {
			if let Value::Object(_) = &*doc.current.doc {
				doc.current.doc.to_mut().set(
					&[crate::sql::part::Part::Field(crate::sql::ident::Ident::from("id"))],
					Value::Thing(rid.as_ref().clone()),
				)?;
			}
		}
		doc.run(stk, ctx, opt).await?;
		Ok(doc.current.doc.into_owned())
	}

	/// Run a deletion through the pipeline: index and foreign-table entries
	/// are retired, events fire with the pre-delete snapshot, and the row is
	/// removed from storage.
	pub(crate) async fn pipeline_delete(
		stk: &mut Stk,
		ctx: &Context,
		opt: &Options,
		id: Arc<Thing>,
	) -> Result<Value, Error> {
		let mut doc = Self::load(ctx, opt, id, false).await?;
		doc.is_delete = true;
		doc.run(stk, ctx, opt).await?;
		Ok(doc.initial.doc.clone().into_owned())
	}

	async fn load(ctx: &Context, opt: &Options, id: Arc<Thing>, is_new: bool) -> Result<Self, Error> {
		if is_new {
			return Ok(Document::new(Some(id), Value::None, true));
		}
		let thing_key = key::thing(opt.ns()?, opt.db()?, &id.tb, &id.id)?;
		let tx = ctx.tx();
		let tx = tx.lock().await;
		let val = match tx.get(thing_key).await? {
			Some(bytes) => kv::decode(&bytes)?,
			None => Value::None,
		};
		drop(tx);
		Ok(Document::new(Some(id), val, false))
	}

	async fn run(&mut self, stk: &mut Stk, ctx: &Context, opt: &Options) -> Result<(), Error> {
		let guard = self.lock(ctx, opt).await?;
		let result = self.run_locked(stk, ctx, opt).await;
		self.ulock(guard);
		result
	}

	/// Steps 3-13: everything after the per-key lock is acquired and before
	/// it is released, so no other worker-pool task can interleave a write
	/// to the same record while this pipeline run is in flight.
	async fn run_locked(&mut self, stk: &mut Stk, ctx: &Context, opt: &Options) -> Result<(), Error> {
		self.def_fld(stk, ctx, opt).await?;
		if !self.is_delete {
			self.mrg_fld(stk, ctx, opt).await?;
		}
		self.allow(stk, ctx, opt).await?;
		self.index(stk, ctx, opt).await?;
		self.store(ctx, opt).await?;
		self.table(stk, ctx, opt).await?;
		self.lives(stk, ctx, opt).await?;
		self.event(stk, ctx, opt).await?;
		Ok(())
	}
}
