//! Step 13 of the pipeline: fire `DEFINE EVENT`s once the document has
//! settled, with `$this`/`$method`/`$before`/`$after` bound.
use crate::ctx::{Context, MutableContext};
use crate::dbs::Options;
use crate::doc::Document;
use crate::err::Error;
use crate::sql::value::Value;
use reblessive::tree::Stk;
use std::sync::Arc;

impl Document {
	pub(crate) async fn event(
		&self,
		stk: &mut Stk,
		ctx: &Context,
		opt: &Options,
	) -> Result<(), Error> {
		if opt.import {
			return Ok(());
		}
		if !self.changed() {
			return Ok(());
		}
		let opt = &opt.new_with_perms(false);
		let evs = self.ev(ctx, opt).await?;
		if evs.is_empty() {
			return Ok(());
		}
		let action = if self.is_delete {
			Value::from("DELETE")
		} else if self.is_new {
			Value::from("CREATE")
		} else {
			Value::from("UPDATE")
		};
		let doc = if self.is_delete {
			&self.initial
		} else {
			&self.current
		};
		let this = self.rid().map(|rid| Value::Thing(rid.as_ref().clone()))?;
		for ev in &evs {
			let mut child = MutableContext::new(ctx);
			child.add_value("this", Arc::new(this.clone()));
			child.add_value("method", Arc::new(action.clone()));
			child.add_value("after", Arc::new(self.current.doc.clone().into_owned()));
			child.add_value("before", Arc::new(self.initial.doc.clone().into_owned()));
			let child = child.freeze();
			let when = ev.when.compute(stk, &child, opt, Some(doc)).await?;
			if when.is_truthy() {
				ev.then.compute(stk, &child, opt, Some(doc)).await?;
			}
		}
		Ok(())
	}
}
