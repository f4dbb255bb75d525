//! Per-batch statement dispatch: `USE`/`LET` mutate the running context for
//! subsequent statements, `BEGIN`/`COMMIT`/`CANCEL` open and close a sticky
//! transaction spanning them, `OPTION` narrows [`Options`] for the rest of
//! the batch, and everything else runs through its own implicit transaction
//! via [`crate::dbs::execute_statement`].
use crate::ctx::{Context, MutableContext};
use crate::dbs::datastore::Datastore;
use crate::dbs::execute_statement;
use crate::dbs::lock::LockMap;
use crate::dbs::options::{Force, Options};
use crate::dbs::response::{QueryType, Response};
use crate::dbs::Notification;
use crate::err::Error;
use crate::iam::Action;
use crate::kvs::{LockType, Transaction, TransactionType};
use crate::sql::query::Query;
use crate::sql::statement::Statement;
use crate::sql::value::Value;
use crate::sql::Base;
use reblessive::TreeStack;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use trice::Instant;

/// The `Duration` a statement's `TIMEOUT` clause names, if it has one.
/// Only the CRUD statements carry a `timeout` field; everything else runs
/// without a per-statement deadline.
fn statement_timeout(stmt: &Statement) -> Option<Duration> {
	let dur = match stmt {
		Statement::Select(s) => s.timeout.as_ref(),
		Statement::Create(s) => s.timeout.as_ref(),
		Statement::Update(s) => s.timeout.as_ref(),
		Statement::Upsert(s) => s.timeout.as_ref(),
		Statement::Delete(s) => s.timeout.as_ref(),
		_ => None,
	}?;
	Some(dur.0)
}

fn query_type(stmt: &Statement) -> QueryType {
	match stmt {
		Statement::Live(_) => QueryType::Live,
		Statement::Kill(_) => QueryType::Kill,
		_ => QueryType::Other,
	}
}

/// Build a child context carrying `txn`, its per-record lock map and its
/// pending live-query notification buffer, with the statement's `TIMEOUT`
/// clause (if any) installed as a deadline.
fn child_ctx(
	parent: &Context,
	txn: Arc<Mutex<Transaction>>,
	lock_map: Arc<LockMap>,
	notify_buffer: Arc<Mutex<Vec<Notification>>>,
	stmt: &Statement,
) -> Result<Context, Error> {
	let mut ctx = MutableContext::new(parent);
	ctx.set_transaction(txn);
	ctx.set_lock_map(lock_map);
	ctx.set_notify_buffer(notify_buffer);
	if let Some(dur) = statement_timeout(stmt) {
		ctx.add_timeout(dur)?;
	}
	Ok(ctx.freeze())
}

/// Send every buffered notification now that the transaction that raised
/// them has committed.
async fn flush_notifications(opt: &Options, buf: &Arc<Mutex<Vec<Notification>>>) {
	if let Some(sender) = &opt.sender {
		for n in buf.lock().await.drain(..) {
			let _ = sender.send(n).await;
		}
	}
}

/// Run one already-computed future under `dur`'s deadline if it has one,
/// turning an elapsed timeout into [`Error::QueryTimedout`].
async fn with_timeout<F>(dur: Option<Duration>, fut: F) -> Result<Value, Error>
where
	F: std::future::Future<Output = Result<Value, Error>>,
{
	match dur {
		Some(dur) => tokio::time::timeout(dur, fut).await.unwrap_or(Err(Error::QueryTimedout)),
		None => fut.await,
	}
}

/// Run one statement under its own implicit transaction — write if the
/// statement writes, read-only otherwise — committing on success and
/// cancelling on any error (including a timeout).
async fn run_one(
	stack: &mut TreeStack,
	parent: &Context,
	opt: &Options,
	ds: &Datastore,
	stmt: &Statement,
) -> Result<Value, Error> {
	let kind = if stmt.writeable() {
		TransactionType::Write
	} else {
		TransactionType::Read
	};
	let txn = Arc::new(Mutex::new(ds.kvs().transaction(kind, LockType::Optimistic).await?));
	let lock_map = Arc::new(LockMap::new());
	let notify_buffer = Arc::new(Mutex::new(Vec::new()));
	let ctx = child_ctx(parent, txn.clone(), lock_map, notify_buffer.clone(), stmt)?;
	let dur = statement_timeout(stmt);
	let result =
		with_timeout(dur, stack.enter(|stk| execute_statement(stk, &ctx, opt, stmt)).finish()).await;
	let mut guard = txn.lock().await;
	if result.is_ok() {
		guard.commit().await?;
		drop(guard);
		flush_notifications(opt, &notify_buffer).await;
	} else {
		guard.cancel().await?;
	}
	result
}

/// Like [`run_one`], but runs against an already-open sticky transaction
/// instead of opening and closing its own.
async fn run_one_sticky(
	stack: &mut TreeStack,
	parent: &Context,
	opt: &Options,
	txn: Arc<Mutex<Transaction>>,
	lock_map: Arc<LockMap>,
	notify_buffer: Arc<Mutex<Vec<Notification>>>,
	stmt: &Statement,
) -> Result<Value, Error> {
	let ctx = child_ctx(parent, txn, lock_map, notify_buffer, stmt)?;
	let dur = statement_timeout(stmt);
	with_timeout(dur, stack.enter(|stk| execute_statement(stk, &ctx, opt, stmt)).finish()).await
}

type StickyTxn = (Arc<Mutex<Transaction>>, Arc<LockMap>, Arc<Mutex<Vec<Notification>>>);

async fn run_dispatch(
	stack: &mut TreeStack,
	parent: &Context,
	opt: &Options,
	ds: &Datastore,
	sticky: &Option<StickyTxn>,
	stmt: &Statement,
) -> Result<Value, Error> {
	match sticky {
		Some((txn, lock_map, notify_buffer)) => {
			run_one_sticky(stack, parent, opt, txn.clone(), lock_map.clone(), notify_buffer.clone(), stmt)
				.await
		}
		None => run_one(stack, parent, opt, ds, stmt).await,
	}
}

/// Evaluate a `LET`'s expression the same way any other statement runs
/// (its own implicit transaction, or the batch's sticky one), without
/// needing a record target.
async fn compute_let(
	stack: &mut TreeStack,
	parent: &Context,
	opt: &Options,
	ds: &Datastore,
	sticky: &Option<StickyTxn>,
	what: &Value,
) -> Result<Value, Error> {
	let wrapped = Statement::Output(crate::sql::statements::misc::OutputStatement {
		what: what.clone(),
	});
	run_dispatch(stack, parent, opt, ds, sticky, &wrapped).await
}

/// Apply a `USE` statement, rejecting a namespace/database switch that
/// would reach outside the session's authenticated scope.
fn apply_use(opt: &mut Options, ns: &Option<String>, db: &Option<String>) -> Result<(), Error> {
	if let Some(ns) = ns {
		opt.set_ns(Some(Arc::from(ns.as_str())));
	}
	if let Some(db) = db {
		opt.set_db(Some(Arc::from(db.as_str())));
	}
	if db.is_some() {
		opt.is_allowed(Action::View, &Base::Db)
	} else if ns.is_some() {
		opt.is_allowed(Action::View, &Base::Ns)
	} else {
		Ok(())
	}
}

/// Apply an `OPTION name = bool` toggle. Unknown option names are ignored
/// rather than rejected, matching a forward-compatible client sending an
/// option this version of the executor doesn't recognise yet.
fn apply_option(opt: &Options, name: &str, what: bool) -> Options {
	match name.to_uppercase().as_str() {
		"IMPORT" => opt.new_with_import(what),
		"FORCE" => opt.new_with_force(if what {
			Force::All
		} else {
			Force::None
		}),
		"FUTURES" => opt.new_with_futures(what),
		_ => opt.clone(),
	}
}

fn ok_response(start: Instant) -> Response {
	Response {
		time: start.elapsed(),
		result: Ok(Value::None),
		query_type: QueryType::Other,
	}
}

fn push(responses: &mut Vec<Response>, buffer: &mut Vec<Response>, sticky: bool, res: Response) {
	if sticky {
		buffer.push(res);
	} else {
		responses.push(res);
	}
}

/// Run every statement in `qry` in order, threading `USE`/`LET`/`OPTION`
/// state through the batch and honouring `BEGIN`/`COMMIT`/`CANCEL` sticky
/// transactions: once a statement fails inside a sticky transaction, every
/// later statement up to the matching `CANCEL`/`COMMIT` is skipped with
/// [`Error::QueryNotExecutedDetail`] rather than run.
pub(crate) async fn execute_batch(
	root: &Context,
	mut opt: Options,
	ds: &Datastore,
	qry: Query,
) -> Result<Vec<Response>, Error> {
	let mut stack = TreeStack::new();
	let mut ctx = root.clone();
	let mut responses = Vec::new();
	let mut sticky: Option<StickyTxn> = None;
	let mut sticky_buffer: Vec<Response> = Vec::new();
	let mut sticky_failure: Option<String> = None;

	for stmt in qry.into_iter() {
		let start = Instant::now();

		match &stmt {
			Statement::Use(u) => {
				let result = apply_use(&mut opt, &u.ns, &u.db);
				let res = Response {
					time: start.elapsed(),
					result: result.map(|_| Value::None),
					query_type: QueryType::Other,
				};
				push(&mut responses, &mut sticky_buffer, sticky.is_some(), res);
				continue;
			}
			Statement::Option(o) => {
				opt = apply_option(&opt, &o.name, o.what);
				push(&mut responses, &mut sticky_buffer, sticky.is_some(), ok_response(start));
				continue;
			}
			Statement::Begin(_) => {
				let res = if sticky.is_some() {
					Response {
						time: start.elapsed(),
						result: Err(Error::Internal("already inside a transaction".into())),
						query_type: QueryType::Other,
					}
				} else {
					match ds.kvs().transaction(TransactionType::Write, LockType::Optimistic).await {
						Ok(txn) => {
							sticky = Some((
								Arc::new(Mutex::new(txn)),
								Arc::new(LockMap::new()),
								Arc::new(Mutex::new(Vec::new())),
							));
							sticky_buffer.clear();
							sticky_failure = None;
							ok_response(start)
						}
						Err(e) => Response {
							time: start.elapsed(),
							result: Err(e),
							query_type: QueryType::Other,
						},
					}
				};
				responses.push(res);
				continue;
			}
			Statement::Cancel(_) => {
				if let Some((txn, _, _)) = sticky.take() {
					let _ = txn.lock().await.cancel().await;
					for r in sticky_buffer.drain(..) {
						responses.push(Response {
							time: r.time,
							result: Err(Error::Internal("Transaction cancelled".into())),
							query_type: r.query_type,
						});
					}
				}
				sticky_failure = None;
				responses.push(ok_response(start));
				continue;
			}
			Statement::Commit(_) => {
				if let Some((txn, _, notify_buffer)) = sticky.take() {
					match txn.lock().await.commit().await {
						Ok(()) => {
							flush_notifications(&opt, &notify_buffer).await;
							responses.append(&mut sticky_buffer);
						}
						Err(e) => {
							for r in sticky_buffer.drain(..) {
								responses.push(Response {
									time: r.time,
									result: Err(Error::TxFailure),
									query_type: r.query_type,
								});
							}
							responses.push(Response {
								time: start.elapsed(),
								result: Err(e),
								query_type: QueryType::Other,
							});
							sticky_failure = None;
							continue;
						}
					}
				}
				sticky_failure = None;
				responses.push(ok_response(start));
				continue;
			}
			Statement::Set(s) => {
				let result = match &sticky_failure {
					Some(msg) => Err(Error::QueryNotExecutedDetail {
						message: msg.clone(),
					}),
					None => compute_let(&mut stack, &ctx, &opt, ds, &sticky, &s.what).await,
				};
				match &result {
					Ok(v) => {
						let mut child = MutableContext::new(&ctx);
						child.add_value(s.name.clone(), Arc::new(v.clone()));
						ctx = child.freeze();
					}
					Err(e) if sticky.is_some() => sticky_failure = Some(e.to_string()),
					Err(_) => {}
				}
				let res = Response {
					time: start.elapsed(),
					result: result.map(|_| Value::None),
					query_type: QueryType::Other,
				};
				push(&mut responses, &mut sticky_buffer, sticky.is_some(), res);
				continue;
			}
			_ => {}
		}

		// Every other statement: SELECT/CREATE/UPDATE/UPSERT/DELETE/INSERT/
		// RELATE/DEFINE/REMOVE/LIVE/KILL/INFO/RETURN.
		let result = match &sticky_failure {
			Some(msg) => Err(Error::QueryNotExecutedDetail {
				message: msg.clone(),
			}),
			None => run_dispatch(&mut stack, &ctx, &opt, ds, &sticky, &stmt).await,
		};
		if let Err(e) = &result {
			if sticky.is_some() {
				sticky_failure = Some(e.to_string());
			}
		}
		let res = Response {
			time: start.elapsed(),
			result,
			query_type: query_type(&stmt),
		};
		push(&mut responses, &mut sticky_buffer, sticky.is_some(), res);
	}

	Ok(responses)
}
