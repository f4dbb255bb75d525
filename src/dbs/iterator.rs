//! Per-statement execution: resolves a statement's target(s) into record
//! ids, runs each through the document pipeline, and projects the result
//! the `RETURN` clause asks for. One function per statement variant, tied
//! together by [`execute_statement`].
//!
//! `USE`/`SET`/`BEGIN`/`COMMIT`/`CANCEL` are not handled here — they mutate
//! the running batch state (selected ns/db, bound parameters, the sticky
//! transaction) rather than producing a value from a single document, so
//! the batch executor intercepts them before a statement ever reaches this
//! module.

use crate::ctx::Context;
use crate::dbs::Options;
use crate::doc::{CursorDoc, Document};
use crate::err::Error;
use crate::key;
use crate::kvs::value as kv;
use crate::sql::array::Array;
use crate::sql::base::Base;
use crate::sql::cond::Cond;
use crate::sql::data::Data;
use crate::sql::id::Id;
use crate::sql::idiom::Idiom;
use crate::sql::object::Object;
use crate::sql::operator::Operator;
use crate::sql::output::Output;
use crate::sql::part::Part;
use crate::sql::statement::Statement;
use crate::sql::statements::crud::{
	CreateStatement, DeleteStatement, InsertStatement, RelateStatement, SelectStatement,
	UpdateStatement, UpsertStatement,
};
use crate::sql::statements::{DefineStatement, InfoStatement, KillStatement, LiveStatement, RemoveStatement};
use crate::sql::thing::Thing;
use crate::sql::value::Value;
use crate::sql::view::{fold_aggregate, Fold};
use futures::StreamExt;
use reblessive::tree::Stk;
use std::cmp::Ordering;
use std::sync::Arc;

/// Resolve one `what` expression (a raw, not-yet-computed AST `Value`)
/// into the record(s) it names.
async fn resolve_one(
	stk: &mut Stk,
	ctx: &Context,
	opt: &Options,
	what: &Value,
) -> Result<Vec<Arc<Thing>>, Error> {
	let computed = stk.run(|stk| what.compute(stk, ctx, opt, None)).await?;
	resolve_computed(ctx, opt, computed).await
}

fn resolve_computed<'a>(
	ctx: &'a Context,
	opt: &'a Options,
	computed: Value,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Vec<Arc<Thing>>, Error>> + 'a>> {
	Box::pin(async move {
		match computed {
			Value::Thing(t) => Ok(vec![Arc::new(t)]),
			Value::Table(t) => scan_table(ctx, opt, &t.0).await,
			Value::Array(a) => {
				let mut out = Vec::new();
				for v in a.0 {
					out.extend(resolve_computed(ctx, opt, v).await?);
				}
				Ok(out)
			}
			Value::Mock(m) => Ok(m.things().into_iter().map(Arc::new).collect()),
			v => Err(Error::Internal(format!("cannot resolve `{v}` as a record target"))),
		}
	})
}

/// Every record currently stored on `tb`, identified by its own stored
/// `"id"` field. A row saved without one is skipped — it cannot have come
/// from this pipeline.
async fn scan_table(ctx: &Context, opt: &Options, tb: &str) -> Result<Vec<Arc<Thing>>, Error> {
	let range = key::table_range(opt.ns()?, opt.db()?, tb);
	let tx = ctx.tx();
	let tx = tx.lock().await;
	let rows = tx.scan(range, u32::MAX).await?;
	drop(tx);
	let mut out = Vec::with_capacity(rows.len());
	for (_, bytes) in rows {
		let val: Value = kv::decode(&bytes)?;
		if let Value::Object(o) = &val {
			if let Some(Value::Thing(t)) = o.get("id") {
				out.push(Arc::new(t.clone()));
			}
		}
	}
	Ok(out)
}

async fn resolve_targets(
	stk: &mut Stk,
	ctx: &Context,
	opt: &Options,
	what: &[Value],
) -> Result<Vec<Arc<Thing>>, Error> {
	let mut out = Vec::new();
	for w in what {
		out.extend(resolve_one(stk, ctx, opt, w).await?);
	}
	Ok(out)
}

/// Like [`resolve_targets`], but a bare table name generates a fresh
/// record rather than scanning existing ones — the CREATE/UPSERT shape of
/// "what to write to".
async fn resolve_create_targets(
	stk: &mut Stk,
	ctx: &Context,
	opt: &Options,
	what: &[Value],
) -> Result<Vec<Arc<Thing>>, Error> {
	let mut out = Vec::new();
	for w in what {
		let computed = stk.run(|stk| w.compute(stk, ctx, opt, None)).await?;
		out.extend(create_target(computed)?);
	}
	Ok(out)
}

fn create_target(computed: Value) -> Result<Vec<Arc<Thing>>, Error> {
	match computed {
		Value::Thing(t) => Ok(vec![Arc::new(t)]),
		Value::Table(t) => Ok(vec![Arc::new(Thing::from((t.0.as_str(), Id::rand())))]),
		Value::Array(a) => {
			let mut out = Vec::new();
			for v in a.0 {
				out.extend(create_target(v)?);
			}
			Ok(out)
		}
		v => Err(Error::Internal(format!("cannot resolve `{v}` as a write target"))),
	}
}

/// Read a record's currently-stored value, or `Value::None` if it doesn't
/// exist. A small duplicate of `Document::load`'s read, which is private
/// to the `doc` module.
async fn read_current(ctx: &Context, opt: &Options, id: &Thing) -> Result<Value, Error> {
	let key = key::thing(opt.ns()?, opt.db()?, &id.tb, &id.id)?;
	let tx = ctx.tx();
	let tx = tx.lock().await;
	match tx.get(key).await? {
		Some(bytes) => kv::decode(&bytes),
		None => Ok(Value::None),
	}
}

/// Read a record as it stood at `version` (a resolved internal version
/// counter, not the raw nanosecond timestamp `VERSION` was given in).
async fn read_at_version(
	ctx: &Context,
	opt: &Options,
	id: &Thing,
	version: u64,
) -> Result<Value, Error> {
	let key = key::thing(opt.ns()?, opt.db()?, &id.tb, &id.id)?;
	let tx = ctx.tx();
	let tx = tx.lock().await;
	match tx.get_at(key, version).await? {
		Some(bytes) => kv::decode(&bytes),
		None => Ok(Value::None),
	}
}

/// Fetch every record named in `fetch`'s paths and splice the referenced
/// record's full value in, replacing the embedded record id — applied to
/// the final page so a query's `LIMIT` bounds the work done, not the
/// number of rows scanned first.
async fn apply_fetches(
	stk: &mut Stk,
	ctx: &Context,
	opt: &Options,
	rows: &mut [Value],
	fetch: &crate::sql::fetch::Fetchs,
) -> Result<(), Error> {
	for f in fetch.iter() {
		for row in rows.iter_mut() {
			let cur = row.get(stk, ctx, opt, None, &f.0 .0).await?;
			let resolved = match cur {
				Value::Thing(t) => read_current(ctx, opt, &t).await?,
				Value::Array(a) => {
					let mut out = Vec::with_capacity(a.len());
					for v in a.0 {
						out.push(match v {
							Value::Thing(t) => read_current(ctx, opt, &t).await?,
							other => other,
						});
					}
					Value::Array(out.into())
				}
				other => other,
			};
			row.set(&f.0 .0, resolved)?;
		}
	}
	Ok(())
}

/// Apply a `Data` clause on top of `initial`, producing the record's new
/// value. `Patch` is treated as a structural merge, like `Merge` — this
/// crate has no JSON-patch interpreter.
async fn apply_data(
	stk: &mut Stk,
	ctx: &Context,
	opt: &Options,
	data: Option<&Data>,
	initial: &Value,
	doc: &CursorDoc,
) -> Result<Value, Error> {
	match data {
		None => Ok(initial.clone()),
		Some(Data::Content(v)) => stk.run(|stk| v.compute(stk, ctx, opt, Some(doc))).await,
		Some(Data::Merge(v)) | Some(Data::Patch(v)) => {
			let computed = stk.run(|stk| v.compute(stk, ctx, opt, Some(doc))).await?;
			match (initial, &computed) {
				(Value::Object(base), Value::Object(patch)) => {
					let mut merged = base.clone();
					for (k, v) in patch.iter() {
						merged.insert(k.clone(), v.clone());
					}
					Ok(Value::Object(merged))
				}
				_ => Ok(computed),
			}
		}
		Some(Data::Set(assigns)) => {
			let mut out = initial.clone();
			for (idiom, op, expr) in assigns {
				let val = stk.run(|stk| expr.compute(stk, ctx, opt, Some(doc))).await?;
				match op {
					Operator::Inc => out.inc(idiom, val)?,
					Operator::Dec => out.dec(idiom, val)?,
					_ => out.set(idiom, val)?,
				}
			}
			Ok(out)
		}
		Some(Data::Unset(idioms)) => {
			let mut out = initial.clone();
			for idiom in idioms {
				out.del(idiom)?;
			}
			Ok(out)
		}
	}
}

/// Project the `RETURN` clause. No clause at all behaves like `RETURN
/// AFTER`; `RETURN DIFF` is simplified to a `{before, after}` object
/// rather than an RFC 6902 patch.
fn project_output(output: Option<&Output>, before: &Value, after: &Value) -> Value {
	match output {
		None => after.clone(),
		Some(Output::None) => Value::None,
		Some(Output::Null) => Value::Null,
		Some(Output::After) => after.clone(),
		Some(Output::Before) => before.clone(),
		Some(Output::Diff) => {
			let mut o = Object::default();
			o.insert("before".to_owned(), before.clone());
			o.insert("after".to_owned(), after.clone());
			Value::Object(o)
		}
	}
}

fn finish(out: Vec<Value>, only: bool) -> Result<Value, Error> {
	if only {
		match out.len() {
			0 => Ok(Value::None),
			1 => Ok(out.into_iter().next().unwrap()),
			_ => Err(Error::Internal("ONLY clause matched more than one record".into())),
		}
	} else {
		Ok(Value::Array(out.into()))
	}
}

async fn cond_holds(
	stk: &mut Stk,
	ctx: &Context,
	opt: &Options,
	cond: Option<&Cond>,
	doc: &CursorDoc,
) -> Result<bool, Error> {
	match cond {
		None => Ok(true),
		Some(c) => Ok(stk.run(|stk| c.0.compute(stk, ctx, opt, Some(doc))).await?.is_truthy()),
	}
}

pub(crate) async fn execute_create(
	stk: &mut Stk,
	ctx: &Context,
	opt: &Options,
	stmt: &CreateStatement,
) -> Result<Value, Error> {
	let targets = resolve_create_targets(stk, ctx, opt, &stmt.what).await?;
	let mut out = Vec::with_capacity(targets.len());
	for id in targets {
		if !matches!(read_current(ctx, opt, &id).await?, Value::None) {
			return Err(Error::RecordExists(id.as_ref().clone()));
		}
		let initial = Value::Object(Default::default());
		let doc = CursorDoc::new(Some(id.clone()), initial.clone());
		let next = apply_data(stk, ctx, opt, stmt.data.as_ref(), &initial, &doc).await?;
		match Document::pipeline(stk, ctx, opt, Some(id), next, true).await {
			Ok(after) => out.push(project_output(stmt.output.as_ref(), &Value::None, &after)),
			Err(Error::Ignore) => continue,
			Err(e) => return Err(e),
		}
	}
	finish(out, stmt.only)
}

pub(crate) async fn execute_update(
	stk: &mut Stk,
	ctx: &Context,
	opt: &Options,
	stmt: &UpdateStatement,
) -> Result<Value, Error> {
	let targets = resolve_targets(stk, ctx, opt, &stmt.what).await?;
	let mut out = Vec::with_capacity(targets.len());
	for id in targets {
		let before = read_current(ctx, opt, &id).await?;
		if matches!(before, Value::None) {
			return Err(Error::DocumentError(format!("record `{id}` does not exist")));
		}
		let doc = CursorDoc::new(Some(id.clone()), before.clone());
		if !cond_holds(stk, ctx, opt, stmt.cond.as_ref(), &doc).await? {
			continue;
		}
		let next = apply_data(stk, ctx, opt, stmt.data.as_ref(), &before, &doc).await?;
		match Document::pipeline(stk, ctx, opt, Some(id), next, false).await {
			Ok(after) => out.push(project_output(stmt.output.as_ref(), &before, &after)),
			Err(Error::Ignore) => continue,
			Err(e) => return Err(e),
		}
	}
	finish(out, stmt.only)
}

pub(crate) async fn execute_upsert(
	stk: &mut Stk,
	ctx: &Context,
	opt: &Options,
	stmt: &UpsertStatement,
) -> Result<Value, Error> {
	let targets = resolve_create_targets(stk, ctx, opt, &stmt.what).await?;
	let mut out = Vec::with_capacity(targets.len());
	for id in targets {
		let before = read_current(ctx, opt, &id).await?;
		let is_new = matches!(before, Value::None);
		let doc = CursorDoc::new(Some(id.clone()), before.clone());
		if !is_new && !cond_holds(stk, ctx, opt, stmt.cond.as_ref(), &doc).await? {
			continue;
		}
		let next = apply_data(stk, ctx, opt, stmt.data.as_ref(), &before, &doc).await?;
		match Document::pipeline(stk, ctx, opt, Some(id), next, is_new).await {
			Ok(after) => out.push(project_output(stmt.output.as_ref(), &before, &after)),
			Err(Error::Ignore) => continue,
			Err(e) => return Err(e),
		}
	}
	finish(out, stmt.only)
}

pub(crate) async fn execute_delete(
	stk: &mut Stk,
	ctx: &Context,
	opt: &Options,
	stmt: &DeleteStatement,
) -> Result<Value, Error> {
	let targets = resolve_targets(stk, ctx, opt, &stmt.what).await?;
	let mut out = Vec::with_capacity(targets.len());
	for id in targets {
		let before = read_current(ctx, opt, &id).await?;
		if matches!(before, Value::None) {
			continue;
		}
		let doc = CursorDoc::new(Some(id.clone()), before.clone());
		if !cond_holds(stk, ctx, opt, stmt.cond.as_ref(), &doc).await? {
			continue;
		}
		match Document::pipeline_delete(stk, ctx, opt, id).await {
			Ok(before) => out.push(project_output(stmt.output.as_ref(), &before, &Value::None)),
			Err(Error::Ignore) => continue,
			Err(e) => return Err(e),
		}
	}
	finish(out, stmt.only)
}

/// Resolve a single row's target id: an explicit `into` table/thing wins;
/// otherwise the row must carry its own `"id"` field.
fn insert_row_target(into: Option<&Value>, row: &Value) -> Result<Thing, Error> {
	if let Some(Value::Table(t)) = into {
		return Ok(Thing::from((t.0.as_str(), Id::rand())));
	}
	if let Some(Value::Thing(t)) = into {
		return Ok(t.clone());
	}
	if let Value::Object(o) = row {
		if let Some(Value::Thing(t)) = o.get("id") {
			return Ok(t.clone());
		}
	}
	Err(Error::Internal("INSERT row has no table or `id` to target".into()))
}

pub(crate) async fn execute_insert(
	stk: &mut Stk,
	ctx: &Context,
	opt: &Options,
	stmt: &InsertStatement,
) -> Result<Value, Error> {
	let into = match &stmt.into {
		Some(v) => Some(stk.run(|stk| v.compute(stk, ctx, opt, None)).await?),
		None => None,
	};
	let Data::Content(rows) = &stmt.data else {
		return Err(Error::Internal("INSERT requires a CONTENT clause".into()));
	};
	let computed = stk.run(|stk| rows.compute(stk, ctx, opt, None)).await?;
	let rows: Vec<Value> = match computed {
		Value::Array(a) => a.0,
		other => vec![other],
	};
	let mut out = Vec::with_capacity(rows.len());
	for row in rows {
		let id = Arc::new(insert_row_target(into.as_ref(), &row)?);
		let before = read_current(ctx, opt, &id).await?;
		if matches!(before, Value::None) {
			match Document::pipeline(stk, ctx, opt, Some(id), row, true).await {
				Ok(after) => out.push(project_output(stmt.output.as_ref(), &Value::None, &after)),
				Err(Error::Ignore) => continue,
				Err(e) => return Err(e),
			}
			continue;
		}
		if stmt.ignore {
			continue;
		}
		match &stmt.update {
			Some(data) => {
				let doc = CursorDoc::new(Some(id.clone()), before.clone());
				let next = apply_data(stk, ctx, opt, Some(data), &before, &doc).await?;
				match Document::pipeline(stk, ctx, opt, Some(id), next, false).await {
					Ok(after) => out.push(project_output(stmt.output.as_ref(), &before, &after)),
					Err(Error::Ignore) => continue,
					Err(e) => return Err(e),
				}
			}
			None => return Err(Error::RecordExists(id.as_ref().clone())),
		}
	}
	Ok(Value::Array(out.into()))
}

/// Lift a row to the shallow field value an `ORDER BY` key names. Only
/// `Part::Field` segments are honoured — `Value::pick`'s richer path
/// traversal (index/where/array parts) isn't exposed outside `sql::value`.
fn field_value(row: &Value, idiom: &Idiom) -> Value {
	let mut cur = row;
	for part in idiom.iter() {
		let Part::Field(name) = part else {
			return Value::None;
		};
		match cur {
			Value::Object(o) => match o.get(name.as_str()) {
				Some(v) => cur = v,
				None => return Value::None,
			},
			_ => return Value::None,
		}
	}
	cur.clone()
}

/// Fold one record into its `GROUP BY` row: the group-key columns (and any
/// other plain projected field — they must all be group keys) are taken
/// from the first record seen for that key, then every aggregate in
/// `stmt.aggregates` folds this record's contribution in.
async fn fold_group_row(
	stk: &mut Stk,
	ctx: &Context,
	opt: &Options,
	stmt: &SelectStatement,
	doc: &CursorDoc,
	groups: &mut indexmap::IndexMap<String, Object>,
) -> Result<(), Error> {
	let Some(group) = &stmt.group else {
		return Ok(());
	};
	let mut keyvals = Vec::with_capacity(group.0.len());
	for g in group.0.iter() {
		keyvals.push(doc.doc.get(stk, ctx, opt, None, &g.0 .0).await?);
	}
	let key = Array::from(keyvals).to_string();
	if !groups.contains_key(&key) {
		let projected = stk.run(|stk| stmt.expr.compute(stk, ctx, opt, Some(doc))).await?;
		let obj = match projected {
			Value::Object(o) => o,
			_ => Object::default(),
		};
		groups.insert(key.clone(), obj);
	}
	let obj = groups.get_mut(&key).expect("just inserted");
	for agg in &stmt.aggregates {
		let val = doc.doc.get(stk, ctx, opt, None, &agg.of.0).await?;
		fold_aggregate(obj, agg, &val, Fold::Add);
	}
	Ok(())
}

/// Drop the `__`-prefixed running-total sidecar fields `fold_aggregate`
/// uses for `Mean`/`StdDev`/`Variance`/`Distinct` — useful to a
/// materialised table's incremental maintenance, but not part of a
/// one-shot `SELECT ... GROUP BY`'s projected output.
fn strip_hidden(mut obj: Object) -> Object {
	obj.0.retain(|k, _| !k.starts_with("__"));
	obj
}

fn sort_rows(rows: &mut [Value], orders: &crate::sql::order::Orders) {
	rows.sort_by(|a, b| {
		for order in orders.iter() {
			let av = field_value(a, &order.order);
			let bv = field_value(b, &order.order);
			let cmp = av.partial_cmp(&bv).unwrap_or(Ordering::Equal);
			let cmp = if order.direction { cmp } else { cmp.reverse() };
			if cmp != Ordering::Equal {
				return cmp;
			}
		}
		Ordering::Equal
	});
}

pub(crate) async fn execute_select(
	stk: &mut Stk,
	ctx: &Context,
	opt: &Options,
	stmt: &SelectStatement,
) -> Result<Value, Error> {
	let targets = resolve_targets(stk, ctx, opt, &stmt.what).await?;
	// `VERSION <expr>` reads the store as it stood at a past instant rather
	// than its latest committed state; resolve the requested timestamp to
	// this store's internal version counter once, up front.
	let as_of = match &stmt.version {
		Some(v) => {
			let ts = v.compute(stk, ctx, opt, None).await?;
			let tx = ctx.tx();
			let tx = tx.lock().await;
			Some(tx.version_at(ts).await?)
		}
		None => None,
	};
	// Fetching each target is the only part of this loop that doesn't need
	// the exclusive `&mut Stk` borrow, so it's the part worth running with
	// bounded concurrency: up to `WORKER_COUNT` record reads in flight at
	// once, same knob the teacher sizes its parallel iterator with.
	let fetched: Vec<(Arc<Thing>, Value)> = futures::stream::iter(targets)
		.map(|id| async move {
			let val = match as_of {
				Some(version) => read_at_version(ctx, opt, &id, version).await?,
				None => read_current(ctx, opt, &id).await?,
			};
			Ok::<_, Error>((id, val))
		})
		.buffered(*crate::cnf::WORKER_COUNT)
		.collect::<Vec<_>>()
		.await
		.into_iter()
		.collect::<Result<Vec<_>, Error>>()?;
	let mut rows = Vec::with_capacity(fetched.len());
	let grouping = stmt.group.as_ref().is_some_and(|g| !g.0.is_empty());
	let mut groups: indexmap::IndexMap<String, Object> = indexmap::IndexMap::new();
	for (id, val) in fetched {
		if matches!(val, Value::None) {
			continue;
		}
		let doc = CursorDoc::new(Some(id), val);
		if !cond_holds(stk, ctx, opt, stmt.cond.as_ref(), &doc).await? {
			continue;
		}
		if grouping {
			fold_group_row(stk, ctx, opt, stmt, &doc, &mut groups).await?;
		} else {
			rows.push(stk.run(|stk| stmt.expr.compute(stk, ctx, opt, Some(&doc))).await?);
		}
	}
	if grouping {
		rows = groups.into_values().map(strip_hidden).map(Value::Object).collect();
	}
	if let Some(orders) = &stmt.order {
		sort_rows(&mut rows, orders);
	}
	let start = match &stmt.start {
		Some(s) => s.process(stk, ctx, opt, None).await?,
		None => 0,
	};
	let limit = match &stmt.limit {
		Some(l) => l.process(stk, ctx, opt, None).await?,
		None => None,
	};
	let page = if start >= rows.len() {
		Vec::new()
	} else {
		let end = match limit {
			Some(n) => (start + n).min(rows.len()),
			None => rows.len(),
		};
		rows[start..end].to_vec()
	};
	let mut page = page;
	if let Some(fetch) = &stmt.fetch {
		apply_fetches(stk, ctx, opt, &mut page, fetch).await?;
	}
	finish(page, stmt.only)
}

pub(crate) async fn execute_relate(
	stk: &mut Stk,
	ctx: &Context,
	opt: &Options,
	stmt: &RelateStatement,
) -> Result<Value, Error> {
	let from = stk.run(|stk| stmt.from.compute(stk, ctx, opt, None)).await?;
	let with = stk.run(|stk| stmt.with.compute(stk, ctx, opt, None)).await?;
	let kind = stk.run(|stk| stmt.kind.compute(stk, ctx, opt, None)).await?;
	let Value::Table(kind) = kind else {
		return Err(Error::Internal("RELATE requires a plain table as its edge kind".into()));
	};
	let id = Arc::new(Thing::from((kind.0.as_str(), Id::rand())));
	let mut o = Object::default();
	o.insert("in".to_owned(), from);
	o.insert("out".to_owned(), with);
	let initial = Value::Object(o);
	let doc = CursorDoc::new(Some(id.clone()), initial.clone());
	let next = apply_data(stk, ctx, opt, stmt.data.as_ref(), &initial, &doc).await?;
	let after = Document::pipeline(stk, ctx, opt, Some(id), next, true).await?;
	Ok(project_output(stmt.output.as_ref(), &Value::None, &after))
}

pub(crate) async fn execute_define(ctx: &Context, opt: &Options, stmt: &DefineStatement) -> Result<Value, Error> {
	let tx = ctx.tx();
	let mut tx = tx.lock().await;
	match stmt {
		DefineStatement::Namespace(d) => {
			let k = key::namespace(d.name.as_str());
			if d.if_not_exists && tx.get(k.clone()).await?.is_some() {
				return Ok(Value::None);
			}
			tx.put(k, kv::encode_revisioned(d)?).await?;
		}
		DefineStatement::Database(d) => {
			let k = key::database(opt.ns()?, d.name.as_str());
			if d.if_not_exists && tx.get(k.clone()).await?.is_some() {
				return Ok(Value::None);
			}
			tx.put(k, kv::encode_revisioned(d)?).await?;
		}
		DefineStatement::Table(d) => {
			let k = key::table(opt.ns()?, opt.db()?, d.name.as_str());
			if d.if_not_exists && tx.get(k.clone()).await?.is_some() {
				return Ok(Value::None);
			}
			tx.put(k, kv::encode_revisioned(d)?).await?;
			if let Some(view) = &d.view {
				for src in &view.what {
					let fk = key::foreign_table(opt.ns()?, opt.db()?, &src.0, d.name.as_str());
					tx.put(fk, Vec::new()).await?;
				}
			}
		}
		DefineStatement::Field(d) => {
			let k = key::field(opt.ns()?, opt.db()?, &d.what.0, &d.name.to_dotted());
			if d.if_not_exists && tx.get(k.clone()).await?.is_some() {
				return Ok(Value::None);
			}
			tx.put(k, kv::encode_revisioned(d)?).await?;
		}
		DefineStatement::Index(d) => {
			let k = key::index_def(opt.ns()?, opt.db()?, &d.what.0, d.name.as_str());
			if d.if_not_exists && tx.get(k.clone()).await?.is_some() {
				return Ok(Value::None);
			}
			tx.put(k, kv::encode_revisioned(d)?).await?;
		}
		DefineStatement::Event(d) => {
			let k = key::event(opt.ns()?, opt.db()?, &d.what.0, d.name.as_str());
			if d.if_not_exists && tx.get(k.clone()).await?.is_some() {
				return Ok(Value::None);
			}
			tx.put(k, kv::encode_revisioned(d)?).await?;
		}
		DefineStatement::Login(d) => {
			let k = login_key(opt, &d.base, d.name.as_str())?;
			if d.if_not_exists && tx.get(k.clone()).await?.is_some() {
				return Ok(Value::None);
			}
			tx.put(k, kv::encode_revisioned(d)?).await?;
		}
		DefineStatement::Token(d) => {
			let k = token_key(opt, &d.base, d.name.as_str())?;
			if d.if_not_exists && tx.get(k.clone()).await?.is_some() {
				return Ok(Value::None);
			}
			tx.put(k, kv::encode_revisioned(d)?).await?;
		}
		DefineStatement::Scope(d) => {
			let k = key::scope(opt.ns()?, opt.db()?, d.name.as_str());
			if d.if_not_exists && tx.get(k.clone()).await?.is_some() {
				return Ok(Value::None);
			}
			tx.put(k, kv::encode_revisioned(d)?).await?;
		}
	}
	Ok(Value::None)
}

/// `LOGIN`/`TOKEN` are defined `ON NAMESPACE` or `ON DATABASE`; no other
/// `Base` is meaningful here.
fn login_key(opt: &Options, base: &Base, name: &str) -> Result<Vec<u8>, Error> {
	match base {
		Base::Ns => Ok(key::login_ns(opt.ns()?, name)),
		Base::Db => Ok(key::login_db(opt.ns()?, opt.db()?, name)),
		_ => Err(Error::Internal("LOGIN must be defined ON NAMESPACE or ON DATABASE".into())),
	}
}

fn token_key(opt: &Options, base: &Base, name: &str) -> Result<Vec<u8>, Error> {
	match base {
		Base::Ns => Ok(key::token_ns(opt.ns()?, name)),
		Base::Db => Ok(key::token_db(opt.ns()?, opt.db()?, name)),
		_ => Err(Error::Internal("TOKEN must be defined ON NAMESPACE or ON DATABASE".into())),
	}
}

pub(crate) async fn execute_remove(ctx: &Context, opt: &Options, stmt: &RemoveStatement) -> Result<Value, Error> {
	let tx = ctx.tx();
	let mut tx = tx.lock().await;
	match stmt {
		RemoveStatement::Namespace(r) => {
			tx.clr(key::namespace(r.name.as_str())).await?;
		}
		RemoveStatement::Database(r) => {
			tx.clr(key::database(opt.ns()?, r.name.as_str())).await?;
		}
		RemoveStatement::Table(r) => {
			tx.clr(key::table(opt.ns()?, opt.db()?, r.name.as_str())).await?;
		}
		RemoveStatement::Field(r) => {
			tx.clr(key::field(opt.ns()?, opt.db()?, &r.what.0, &r.name.to_dotted())).await?;
		}
		RemoveStatement::Index(r) => {
			tx.clr(key::index_def(opt.ns()?, opt.db()?, &r.what.0, r.name.as_str())).await?;
		}
		RemoveStatement::Event(r) => {
			tx.clr(key::event(opt.ns()?, opt.db()?, &r.what.0, r.name.as_str())).await?;
		}
		RemoveStatement::Login(r) => {
			tx.clr(login_key(opt, &r.base, r.name.as_str())?).await?;
		}
		RemoveStatement::Token(r) => {
			tx.clr(token_key(opt, &r.base, r.name.as_str())?).await?;
		}
		RemoveStatement::Scope(r) => {
			tx.clr(key::scope(opt.ns()?, opt.db()?, r.name.as_str())).await?;
		}
	}
	Ok(Value::None)
}

pub(crate) async fn execute_live(ctx: &Context, opt: &Options, stmt: &LiveStatement) -> Result<Value, Error> {
	opt.realtime()?;
	let Some(registry) = ctx.live_queries() else {
		return Err(Error::RealtimeDisabled);
	};
	let mut stmt = stmt.clone();
	if let Some(connection) = opt.connection() {
		stmt.node = connection.into();
	}
	stmt.auth = Some((*opt.auth).clone());
	registry.register(opt.ns()?, opt.db()?, &stmt.what.0, stmt.clone()).await;
	Ok(Value::Uuid(stmt.id.clone()))
}

pub(crate) async fn execute_kill(
	stk: &mut Stk,
	ctx: &Context,
	opt: &Options,
	stmt: &KillStatement,
) -> Result<Value, Error> {
	let Some(registry) = ctx.live_queries() else {
		return Err(Error::RealtimeDisabled);
	};
	let id = stk.run(|stk| stmt.id.compute(stk, ctx, opt, None)).await?;
	let Value::Uuid(id) = id else {
		return Err(Error::Internal("KILL requires a live query uuid".into()));
	};
	registry.remove(opt.ns()?, opt.db()?, &id).await;
	Ok(Value::None)
}

/// Given a scanned key and its parent's key prefix, return the immediate
/// child's name — or `None` if the key belongs to something nested deeper
/// than a direct child (e.g. a table row scanned while listing tables).
fn direct_child_name(key: &[u8], parent_prefix: &[u8]) -> Option<String> {
	let rest = key.strip_prefix(parent_prefix)?;
	let rest = rest.strip_prefix(b"*")?;
	if rest.contains(&b'*') || rest.contains(&b'!') {
		return None;
	}
	std::str::from_utf8(rest).ok().map(|s| s.to_owned())
}

/// `INFO FOR NAMESPACE/DATABASE/TABLE` — a best-effort listing of direct
/// children read straight off the key layout, since no separate schema
/// catalogue is kept.
pub(crate) async fn execute_info(ctx: &Context, opt: &Options, stmt: &InfoStatement) -> Result<Value, Error> {
	match stmt {
		InfoStatement::Namespace => {
			let prefix = key::namespace(opt.ns()?);
			let range = key::namespace_range(opt.ns()?);
			let tx = ctx.tx();
			let tx = tx.lock().await;
			let rows = tx.scan(range, u32::MAX).await?;
			let names =
				rows.iter().filter_map(|(k, _)| direct_child_name(k, &prefix)).map(|n| Value::Strand(n.into()));
			Ok(Value::Array(names.collect::<Vec<_>>().into()))
		}
		InfoStatement::Database => {
			let prefix = key::database(opt.ns()?, opt.db()?);
			let range = key::database_range(opt.ns()?, opt.db()?);
			let tx = ctx.tx();
			let tx = tx.lock().await;
			let rows = tx.scan(range, u32::MAX).await?;
			let names =
				rows.iter().filter_map(|(k, _)| direct_child_name(k, &prefix)).map(|n| Value::Strand(n.into()));
			Ok(Value::Array(names.collect::<Vec<_>>().into()))
		}
		InfoStatement::Table(tb) => {
			let fields = key::field_range(opt.ns()?, opt.db()?, tb);
			let indexes = key::index_def_range(opt.ns()?, opt.db()?, tb);
			let events = key::event_range(opt.ns()?, opt.db()?, tb);
			let tx = ctx.tx();
			let tx = tx.lock().await;
			let fd_rows = tx.scan(fields, u32::MAX).await?;
			let ix_rows = tx.scan(indexes, u32::MAX).await?;
			let ev_rows = tx.scan(events, u32::MAX).await?;
			drop(tx);
			let mut fd = Object::default();
			for (_, v) in fd_rows {
				let d: crate::sql::statements::DefineFieldStatement = kv::decode_revisioned(&v)?;
				fd.insert(d.name.to_dotted(), Value::Strand(d.to_string().into()));
			}
			let mut ix = Object::default();
			for (_, v) in ix_rows {
				let d: crate::sql::statements::DefineIndexStatement = kv::decode_revisioned(&v)?;
				ix.insert(d.name.to_raw(), Value::Strand(d.to_string().into()));
			}
			let mut ev = Object::default();
			for (_, v) in ev_rows {
				let d: crate::sql::statements::DefineEventStatement = kv::decode_revisioned(&v)?;
				ev.insert(d.name.to_raw(), Value::Strand(d.to_string().into()));
			}
			let mut out = Object::default();
			out.insert("fields".to_owned(), Value::Object(fd));
			out.insert("indexes".to_owned(), Value::Object(ix));
			out.insert("events".to_owned(), Value::Object(ev));
			Ok(Value::Object(out))
		}
		InfoStatement::Scope(sc) => {
			let k = key::scope(opt.ns()?, opt.db()?, sc);
			let tx = ctx.tx();
			let tx = tx.lock().await;
			let Some(v) = tx.get(k).await? else {
				return Err(Error::Internal(format!("scope `{sc}` does not exist")));
			};
			drop(tx);
			let d: crate::sql::statements::DefineScopeStatement = kv::decode_revisioned(&v)?;
			let mut out = Object::default();
			out.insert("name".to_owned(), Value::Strand(d.name.to_raw().into()));
			out.insert("definition".to_owned(), Value::Strand(d.to_string().into()));
			Ok(Value::Object(out))
		}
	}
}

/// Dispatch a single statement to its executor. `Use`/`Set`/`Begin`/
/// `Commit`/`Cancel` are the batch executor's own responsibility and are
/// never passed in here.
pub(crate) async fn execute_statement(
	stk: &mut Stk,
	ctx: &Context,
	opt: &Options,
	stmt: &Statement,
) -> Result<Value, Error> {
	match stmt {
		Statement::Select(s) => execute_select(stk, ctx, opt, s).await,
		Statement::Create(s) => execute_create(stk, ctx, opt, s).await,
		Statement::Update(s) => execute_update(stk, ctx, opt, s).await,
		Statement::Upsert(s) => execute_upsert(stk, ctx, opt, s).await,
		Statement::Delete(s) => execute_delete(stk, ctx, opt, s).await,
		Statement::Insert(s) => execute_insert(stk, ctx, opt, s).await,
		Statement::Relate(s) => execute_relate(stk, ctx, opt, s).await,
		Statement::Define(s) => execute_define(ctx, opt, s).await,
		Statement::Remove(s) => execute_remove(ctx, opt, s).await,
		Statement::Live(s) => execute_live(ctx, opt, s).await,
		Statement::Kill(s) => execute_kill(stk, ctx, opt, s).await,
		Statement::Info(s) => execute_info(ctx, opt, s).await,
		Statement::Output(s) => stk.run(|stk| s.what.compute(stk, ctx, opt, None)).await,
		Statement::Run(s) => s.compute(stk, ctx, opt, None).await,
		Statement::Ifelse(s) => s.compute(stk, ctx, opt, None).await,
		Statement::Use(_)
		| Statement::Set(_)
		| Statement::Begin(_)
		| Statement::Commit(_)
		| Statement::Cancel(_)
		| Statement::Option(_) => Err(Error::Internal("statement must be handled by the batch executor".into())),
	}
}
