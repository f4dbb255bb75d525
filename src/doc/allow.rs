//! Step 8 of the pipeline: the table-level `PERMISSIONS` clause for the
//! write's method (`CREATE`/`UPDATE`/`DELETE`), evaluated after field
//! clauses have run so it sees the fully-merged document. A record the
//! permission clause rejects is skipped rather than erroring the whole
//! statement, matching a `WHERE`-style filter.
use crate::ctx::Context;
use crate::dbs::Options;
use crate::doc::Document;
use crate::err::Error;
use crate::iam::Action;
use crate::sql::permission::Permission;
use reblessive::tree::Stk;

impl Document {
	pub(crate) async fn allow(&self, stk: &mut Stk, ctx: &Context, opt: &Options) -> Result<(), Error> {
		if opt.import {
			return Ok(());
		}
		if self.id.is_none() {
			return Ok(());
		}
		if !opt.check_perms(Action::Edit)? {
			return Ok(());
		}
		let Some(tb) = self.tb(ctx, opt).await? else {
			return Ok(());
		};
		let perm = if self.is_delete {
			&tb.permissions.delete
		} else if self.is_new {
			&tb.permissions.create
		} else {
			&tb.permissions.update
		};
		match perm {
			Permission::Full => Ok(()),
			Permission::None => Err(Error::Ignore),
			Permission::Specific(e) => {
				let opt = &opt.new_with_perms(false);
				let doc = if self.is_delete { &self.initial } else { &self.current };
				let allowed = e.compute(stk, ctx, opt, Some(doc)).await?.is_truthy();
				if allowed {
					Ok(())
				} else {
					Err(Error::Ignore)
				}
			}
		}
	}
}
