//! Step 11 of the pipeline: recompute every foreign (materialised) table
//! fed by this document's table. Without `GROUP BY` a foreign row mirrors
//! its source row one-to-one and is simply replaced; with `GROUP BY` the
//! row is shared by every source record in the group, so it is instead
//! folded incrementally — the old group's contribution subtracted, the new
//! group's contribution added — rather than recomputed from a full scan.
use crate::ctx::Context;
use crate::dbs::Options;
use crate::doc::{CursorDoc, Document};
use crate::err::Error;
use crate::key;
use crate::kvs::value as kv;
use crate::sql::array::Array;
use crate::sql::id::Id;
use crate::sql::object::Object;
use crate::sql::statements::DefineTableStatement;
use crate::sql::value::Value;
use crate::sql::view::{fold_aggregate, AggregateMethod, Fold, View};
use reblessive::tree::Stk;

impl Document {
	pub(crate) async fn table(
		&self,
		stk: &mut Stk,
		ctx: &Context,
		opt: &Options,
	) -> Result<(), Error> {
		if opt.import {
			return Ok(());
		}
		if !self.changed() && !self.is_delete {
			return Ok(());
		}
		let fts = self.ft(ctx, opt).await?;
		if fts.is_empty() {
			return Ok(());
		}
		let opt = &opt.new_with_perms(false);
		for ft in &fts {
			let Some(view) = ft.view.clone() else {
				continue;
			};
			self.fold_into(stk, ctx, opt, ft, &view).await?;
		}
		Ok(())
	}

	async fn fold_into(
		&self,
		stk: &mut Stk,
		ctx: &Context,
		opt: &Options,
		ft: &DefineTableStatement,
		view: &View,
	) -> Result<(), Error> {
		match &view.group {
			Some(group) => {
				let mut cols = Vec::with_capacity(group.len());
				for g in group.iter() {
					cols.push(g.0.clone());
				}
				if !self.is_new {
					if member(stk, ctx, opt, view, &self.initial).await? {
						let id = group_key(stk, ctx, opt, &cols, &self.initial).await?;
						self.fold_row(stk, ctx, opt, ft, view, &id, &self.initial, Fold::Remove)
							.await?;
					}
				}
				if !self.is_delete {
					if member(stk, ctx, opt, view, &self.current).await? {
						let id = group_key(stk, ctx, opt, &cols, &self.current).await?;
						self.fold_row(stk, ctx, opt, ft, view, &id, &self.current, Fold::Add)
							.await?;
					}
				}
			}
			None => {
				let id = self.rid()?.id.clone();
				if self.is_delete {
					self.delete_row(ctx, opt, ft, &id).await?;
				} else if member(stk, ctx, opt, view, &self.current).await? {
					self.replace_row(stk, ctx, opt, ft, view, &id, &self.current).await?;
				} else {
					self.delete_row(ctx, opt, ft, &id).await?;
				}
			}
		}
		Ok(())
	}

	/// No `GROUP BY`: the foreign row is just this record's projection.
	async fn replace_row(
		&self,
		stk: &mut Stk,
		ctx: &Context,
		opt: &Options,
		ft: &DefineTableStatement,
		view: &View,
		id: &Id,
		doc: &CursorDoc,
	) -> Result<(), Error> {
		let mut out = match view.expr.compute(stk, ctx, opt, Some(doc)).await? {
			Value::Object(o) => o,
			_ => Object::default(),
		};
		out.0.shift_remove("id");
		for agg in &view.aggregates {
			let v = doc.doc.get(stk, ctx, opt, None, &agg.of.0).await?;
			let scalar = match agg.method {
				AggregateMethod::Count => Value::from(1),
				_ => v,
			};
			out.0.insert(agg.into.to_dotted(), scalar);
		}
		let key = key::thing(opt.ns()?, opt.db()?, &ft.name, id)?;
		let tx = ctx.tx();
		let mut tx = tx.lock().await;
		tx.put(key, kv::encode(&Value::Object(out))?).await
	}

	async fn delete_row(
		&self,
		ctx: &Context,
		opt: &Options,
		ft: &DefineTableStatement,
		id: &Id,
	) -> Result<(), Error> {
		let key = key::thing(opt.ns()?, opt.db()?, &ft.name, id)?;
		let tx = ctx.tx();
		let mut tx = tx.lock().await;
		tx.clr(key).await
	}

	/// `GROUP BY`: add or remove this record's contribution to the shared
	/// group row, creating it on first contribution.
	#[allow(clippy::too_many_arguments)]
	async fn fold_row(
		&self,
		stk: &mut Stk,
		ctx: &Context,
		opt: &Options,
		ft: &DefineTableStatement,
		view: &View,
		id: &Id,
		doc: &CursorDoc,
		dir: Fold,
	) -> Result<(), Error> {
		let key = key::thing(opt.ns()?, opt.db()?, &ft.name, id)?;
		let tx = ctx.tx();
		let mut tx = tx.lock().await;
		let mut out = match tx.get(key.clone()).await? {
			Some(bytes) => match kv::decode(&bytes)? {
				Value::Object(o) => o,
				_ => Object::default(),
			},
			None => Object::default(),
		};
		if dir == Fold::Add {
			let passthrough = view.expr.compute(stk, ctx, opt, Some(doc)).await?;
			if let Value::Object(p) = passthrough {
				for (k, v) in p.0 {
					if k != "id" {
						out.0.insert(k, v);
					}
				}
			}
		}
		for agg in &view.aggregates {
			let val = doc.doc.get(stk, ctx, opt, None, &agg.of.0).await?;
			fold_aggregate(&mut out, agg, &val, dir);
		}
		tx.put(key, kv::encode(&Value::Object(out))?).await
	}
}

async fn member(
	stk: &mut Stk,
	ctx: &Context,
	opt: &Options,
	view: &View,
	doc: &CursorDoc,
) -> Result<bool, Error> {
	match &view.cond {
		Some(cond) => Ok(cond.0.compute(stk, ctx, opt, Some(doc)).await?.is_truthy()),
		None => Ok(true),
	}
}

async fn group_key(
	stk: &mut Stk,
	ctx: &Context,
	opt: &Options,
	cols: &[crate::sql::idiom::Idiom],
	doc: &CursorDoc,
) -> Result<Id, Error> {
	let mut vals = Vec::with_capacity(cols.len());
	for c in cols {
		vals.push(doc.doc.get(stk, ctx, opt, None, &c.0).await?);
	}
	Ok(Id::from(Array::from(vals)))
}
