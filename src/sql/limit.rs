use crate::ctx::Context;
use crate::dbs::Options;
use crate::doc::CursorDoc;
use crate::err::Error;
use crate::sql::value::Value;
use reblessive::tree::Stk;
use revision::revisioned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// `LIMIT expr` — a negative coerced value means "no limit".
#[revisioned(revision = 1)]
#[derive(Clone, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Limit(pub Value);

impl Limit {
	pub async fn process(
		&self,
		stk: &mut Stk,
		ctx: &Context,
		opt: &Options,
		doc: Option<&CursorDoc>,
	) -> Result<Option<usize>, Error> {
		match self.0.compute(stk, ctx, opt, doc).await? {
			Value::Number(n) => {
				let n = n.as_int();
				if n < 0 {
					Ok(None)
				} else {
					Ok(Some(n as usize))
				}
			}
			v => Err(Error::InvalidLimit {
				kind: "LIMIT",
				value: v.to_string(),
			}),
		}
	}
}

impl fmt::Display for Limit {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "LIMIT {}", self.0)
	}
}
