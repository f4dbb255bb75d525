//! Step 9 of the pipeline: maintain `DEFINE INDEX` entries after a write.
//! Each index's declared columns are computed against `initial` and
//! `current`; if the resulting tuple changed, the old row is removed and
//! the new one inserted, rejecting the write first for a `UNIQUE` index
//! whose new tuple is already claimed by a different record.
use crate::ctx::Context;
use crate::dbs::Options;
use crate::doc::{CursorDoc, Document};
use crate::err::Error;
use crate::key;
use crate::sql::array::Array;
use crate::sql::statements::DefineIndexStatement;
use crate::sql::thing::Thing;
use crate::sql::value::Value;
use reblessive::tree::Stk;

impl Document {
	pub(crate) async fn index(
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
		let Some(tb) = self.tb(ctx, opt).await? else {
			return Ok(());
		};
		if tb.drop {
			return Ok(());
		}
		let rid = self.rid()?;
		let ixs = self.ix(ctx, opt).await?;
		for ix in &ixs {
			let o = index_tuple(stk, ctx, opt, ix, &self.initial).await?;
			let n = if self.is_delete {
				None
			} else {
				index_tuple(stk, ctx, opt, ix, &self.current).await?
			};
			if o == n {
				continue;
			}
			if ix.unique {
				self.apply_unique(ctx, opt, ix, o, n, &rid).await?;
			} else {
				self.apply_non_unique(ctx, opt, ix, o, n, &rid).await?;
			}
		}
		Ok(())
	}

	/// A unique index has exactly one row per column-tuple, keyed by the
	/// tuple alone (no record-id suffix) so a conflicting claim is a single
	/// `PutC`/`DelC` rather than a scan-then-put race between two writers.
	/// The row's value is the owning record's encoded id.
	async fn apply_unique(
		&self,
		ctx: &Context,
		opt: &Options,
		ix: &DefineIndexStatement,
		o: Option<String>,
		n: Option<String>,
		rid: &Thing,
	) -> Result<(), Error> {
		let owner = key::encode_id(&rid.id)?;
		let tx = ctx.tx();
		let mut tx = tx.lock().await;
		if let Some(o) = &o {
			let key = key::index_row_prefix(opt.ns()?, opt.db()?, &ix.what, &ix.name, o);
			tx.delc(key, Some(owner.clone())).await.or_else(|e| match e {
				Error::TxConditionNotMet => Ok(()),
				e => Err(e),
			})?;
		}
		if let Some(n) = &n {
			let key = key::index_row_prefix(opt.ns()?, opt.db()?, &ix.what, &ix.name, n);
			if let Err(Error::TxConditionNotMet) = tx.putc(key, owner.clone(), None).await {
				return Err(Error::IndexExists {
					thing: rid.clone(),
					index: ix.name.to_string(),
					value: n.clone(),
				});
			}
		}
		Ok(())
	}

	async fn apply_non_unique(
		&self,
		ctx: &Context,
		opt: &Options,
		ix: &DefineIndexStatement,
		o: Option<String>,
		n: Option<String>,
		rid: &Thing,
	) -> Result<(), Error> {
		let tx = ctx.tx();
		let mut tx = tx.lock().await;
		if let Some(o) = &o {
			let key = key::index_row(opt.ns()?, opt.db()?, &ix.what, &ix.name, o, &rid.id)?;
			tx.clr(key).await?;
		}
		if let Some(n) = &n {
			let key = key::index_row(opt.ns()?, opt.db()?, &ix.what, &ix.name, n, &rid.id)?;
			tx.put(key, Vec::new()).await?;
		}
		Ok(())
	}
}

/// Compute an index's declared columns against a document snapshot and
/// serialise them into the one string an index row is keyed by. `None` if
/// the snapshot has no document (a brand new or just-deleted record).
async fn index_tuple(
	stk: &mut Stk,
	ctx: &Context,
	opt: &Options,
	ix: &DefineIndexStatement,
	doc: &CursorDoc,
) -> Result<Option<String>, Error> {
	if matches!(*doc.doc, Value::None) {
		return Ok(None);
	}
	let mut vals = Vec::with_capacity(ix.cols.len());
	for col in &ix.cols {
		vals.push(doc.doc.get(stk, ctx, opt, None, &col.0).await?);
	}
	Ok(Some(Array::from(vals).to_string()))
}
