//! Step 6/7 of the pipeline: coerce, default, assert and gate every
//! declared field of the document's table (`mrgFld`), and reject
//! undeclared fields on a `SCHEMAFULL` table (`defFld`).
use crate::ctx::{Context, MutableContext};
use crate::dbs::Options;
use crate::doc::Document;
use crate::err::Error;
use crate::iam::Action;
use crate::sql::permission::Permission;
use crate::sql::statements::define::DefineFieldStatement;
use crate::sql::thing::Thing;
use crate::sql::value::Value;
use reblessive::tree::Stk;
use std::sync::Arc;

impl Document {
	/// Reject a write that introduces a field `SCHEMAFULL` doesn't declare.
	pub(crate) async fn def_fld(
		&self,
		_stk: &mut Stk,
		ctx: &Context,
		opt: &Options,
	) -> Result<(), Error> {
		if opt.import {
			return Ok(());
		}
		let Some(tb) = self.tb(ctx, opt).await? else {
			return Ok(());
		};
		if !tb.full {
			return Ok(());
		}
		let fds = self.fd(ctx, opt).await?;
		if let Value::Object(obj) = &*self.current.doc {
			for k in obj.keys() {
				if k == "id" {
					continue;
				}
				if !fds.iter().any(|fd| fd.name.to_string() == *k) {
					return Err(Error::UndefinedField {
						table: self.rid()?.tb.clone(),
						field: k.as_str().into(),
					});
				}
			}
		}
		Ok(())
	}

	/// Run every `DEFINE FIELD`'s `TYPE`/`VALUE`/`DEFAULT`/`ASSERT`/
	/// `PERMISSIONS` clause against the document, in that order.
	pub(crate) async fn mrg_fld(
		&mut self,
		stk: &mut Stk,
		ctx: &Context,
		opt: &Options,
	) -> Result<(), Error> {
		if opt.import {
			return Ok(());
		}
		let rid = self.rid()?;
		let fds = self.fd(ctx, opt).await?;
		for fd in &fds {
			self.apply_field(stk, ctx, opt, fd, &rid).await?;
		}
		Ok(())
	}

	async fn apply_field(
		&mut self,
		stk: &mut Stk,
		ctx: &Context,
		opt: &Options,
		fd: &DefineFieldStatement,
		rid: &Thing,
	) -> Result<(), Error> {
		let path = &fd.name.0;
		let old = self.initial.doc.get(stk, ctx, opt, None, path).await?;
		let mut val = self.current.doc.get(stk, ctx, opt, None, path).await?;

		if fd.readonly && !self.is_new && val != old {
			return Err(Error::FieldReadonly {
				thing: rid.to_string(),
				field: fd.name.clone(),
			});
		}

		if self.is_new && val.is_none() {
			if let Some(expr) = &fd.default {
				val = self.eval_field_expr(stk, ctx, opt, expr, &val, &old).await?;
			}
		}

		if let Some(expr) = &fd.value {
			if !fd.readonly || self.is_new {
				val = self.eval_field_expr(stk, ctx, opt, expr, &val, &old).await?;
			}
		}

		if let Some(kind) = &fd.kind {
			val = kind.coerce(val).map_err(|e| match e {
				Error::ConvertTo {
					from,
					into,
				} => Error::FieldValue {
					thing: rid.to_string(),
					field: fd.name.clone(),
					value: from.to_string(),
					check: into,
				},
				e => e,
			})?;
		}

		if let Some(expr) = &fd.assert {
			let checked = self.eval_field_expr(stk, ctx, opt, expr, &val, &old).await?;
			if !checked.is_truthy() {
				return Err(Error::FieldValue {
					thing: rid.to_string(),
					field: fd.name.clone(),
					value: val.to_string(),
					check: expr.to_string(),
				});
			}
		}

		if opt.check_perms(Action::Edit)? {
			let perm = if self.is_new {
				&fd.permissions.create
			} else {
				&fd.permissions.update
			};
			match perm {
				Permission::Full => (),
				Permission::None => val = old.clone(),
				Permission::Specific(e) => {
					let opt = &opt.new_with_perms(false);
					let checked = self.eval_field_expr(stk, ctx, opt, e, &val, &old).await?;
					if !checked.is_truthy() {
						val = old.clone();
					}
				}
			}
		}

		match val {
			Value::None => self.current.doc.to_mut().del(path)?,
			_ => self.current.doc.to_mut().set(path, val)?,
		}
		Ok(())
	}

	/// Evaluate a field clause expression with `$value`/`$after`/`$before`
	/// bound, against the document as it stands so far.
	async fn eval_field_expr(
		&self,
		stk: &mut Stk,
		ctx: &Context,
		opt: &Options,
		expr: &Value,
		val: &Value,
		old: &Value,
	) -> Result<Value, Error> {
		let mut child = MutableContext::new(ctx);
		child.add_value("value", Arc::new(val.clone()));
		child.add_value("after", Arc::new(val.clone()));
		child.add_value("before", Arc::new(old.clone()));
		let child = child.freeze();
		expr.compute(stk, &child, opt, Some(&self.current)).await
	}
}
