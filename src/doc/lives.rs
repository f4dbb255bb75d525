//! Step 12 of the pipeline: match this write against every `LIVE SELECT`
//! watching the table and buffer a [`crate::dbs::Notification`] for each
//! one whose owner should see it.
//!
//! Per matching live query: (1) a write echoed back to the connection that
//! registered it is skipped outright; (2) the table's `SELECT` permission
//! clause is re-evaluated under the owning connection's own auth, not the
//! writer's, since a subscriber must not be shown rows it couldn't itself
//! `SELECT`; (3) the live query's `WHERE` is evaluated against the
//! resulting document; (4) the payload is either the full projection or,
//! for `LIVE SELECT DIFF`, a shallow diff of `initial` against `current`;
//! (5) the notification is appended to the transaction's buffer rather
//! than sent immediately, so it is only delivered if the transaction
//! actually commits (see [`crate::dbs::executor`]).
use crate::ctx::Context;
use crate::dbs::{Action, Notification, Options};
use crate::doc::{CursorDoc, Document};
use crate::err::Error;
use crate::iam::Action as PermAction;
use crate::sql::object::Object;
use crate::sql::permission::Permission;
use crate::sql::value::Value;
use reblessive::tree::Stk;

impl Document {
	pub(crate) async fn lives(&self, stk: &mut Stk, ctx: &Context, opt: &Options) -> Result<(), Error> {
		if opt.import || !opt.live {
			return Ok(());
		}
		if !self.changed() && !self.is_delete {
			return Ok(());
		}
		if opt.sender.is_none() {
			return Ok(());
		}
		let Some(registry) = ctx.live_queries() else {
			return Ok(());
		};
		let rid = self.rid()?;
		let lqs = registry.get(opt.ns()?, opt.db()?, &rid.tb).await;
		if lqs.is_empty() {
			return Ok(());
		}
		let action = if self.is_delete {
			Action::Delete
		} else if self.is_new {
			Action::Create
		} else {
			Action::Update
		};
		let doc: &CursorDoc = if self.is_delete { &self.initial } else { &self.current };
		let tb = self.tb(ctx, opt).await?;
		for lq in &lqs {
			// A write echoed back to its own connection isn't a notification.
			if let Some(connection) = opt.connection() {
				if *lq.node == connection {
					continue;
				}
			}
			let lq_opt = match &lq.auth {
				Some(auth) => opt.clone().with_auth(std::sync::Arc::new(auth.clone())),
				None => opt.clone(),
			};
			if lq_opt.check_perms(PermAction::View)? {
				if let Some(tb) = &tb {
					let allowed = match &tb.permissions.select {
						Permission::Full => true,
						Permission::None => false,
						Permission::Specific(e) => {
							let lq_opt = lq_opt.new_with_perms(false);
							e.compute(stk, ctx, &lq_opt, Some(doc)).await?.is_truthy()
						}
					};
					if !allowed {
						continue;
					}
				}
			}
			let matched = match &lq.cond {
				Some(cond) => cond.0.compute(stk, ctx, &lq_opt, Some(doc)).await?.is_truthy(),
				None => true,
			};
			if !matched {
				continue;
			}
			let payload = if lq.diff {
				diff(&self.initial.doc, &self.current.doc)
			} else {
				lq.expr.compute(stk, ctx, &lq_opt, Some(doc)).await?
			};
			let notification = Notification::new(lq.id, action.clone(), payload);
			match ctx.notify_buffer() {
				Some(buf) => buf.lock().await.push(notification),
				None => {
					if let Some(sender) = opt.sender.clone() {
						let _ = sender.send(notification).await;
					}
				}
			}
		}
		Ok(())
	}
}

/// A shallow diff of `before` against `after`: keys added or changed on
/// `after` carry their new value, keys dropped from `before` carry
/// `Value::None`. Nested objects are not recursed into — a changed nested
/// object is reported at the top-level key that contains it.
fn diff(before: &Value, after: &Value) -> Value {
	let (Value::Object(before), Value::Object(after)) = (before, after) else {
		return after.clone();
	};
	let mut out = Object::default();
	for (k, _) in before.0.iter() {
		if !after.0.contains_key(k) {
			out.0.insert(k.clone(), Value::None);
		}
	}
	for (k, v) in after.0.iter() {
		match before.0.get(k) {
			Some(old) if old == v => {}
			_ => {
				out.0.insert(k.clone(), v.clone());
			}
		}
	}
	Value::Object(out)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn diff_reports_added_changed_and_removed_keys() {
		let mut before = Object::default();
		before.0.insert("a".into(), Value::from(1));
		before.0.insert("b".into(), Value::from(2));
		let mut after = Object::default();
		after.0.insert("a".into(), Value::from(1));
		after.0.insert("b".into(), Value::from(3));
		after.0.insert("c".into(), Value::from(4));
		let d = diff(&Value::Object(before), &Value::Object(after));
		let Value::Object(d) = d else {
			panic!("expected object");
		};
		assert_eq!(d.0.get("a"), None);
		assert_eq!(d.0.get("b"), Some(&Value::from(3)));
		assert_eq!(d.0.get("c"), Some(&Value::from(4)));
	}

	#[test]
	fn diff_reports_removed_key_as_none() {
		let mut before = Object::default();
		before.0.insert("a".into(), Value::from(1));
		let after = Object::default();
		let d = diff(&Value::Object(before), &Value::Object(after));
		let Value::Object(d) = d else {
			panic!("expected object");
		};
		assert_eq!(d.0.get("a"), Some(&Value::None));
	}
}
