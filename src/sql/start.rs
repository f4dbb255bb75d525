use crate::ctx::Context;
use crate::dbs::Options;
use crate::doc::CursorDoc;
use crate::err::Error;
use crate::sql::value::Value;
use reblessive::tree::Stk;
use revision::revisioned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// `START expr` — a negative coerced value means "no skip".
#[revisioned(revision = 1)]
#[derive(Clone, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Start(pub Value);

impl Start {
	pub async fn process(
		&self,
		stk: &mut Stk,
		ctx: &Context,
		opt: &Options,
		doc: Option<&CursorDoc>,
	) -> Result<usize, Error> {
		match self.0.compute(stk, ctx, opt, doc).await? {
			Value::Number(n) => {
				let n = n.as_int();
				Ok(n.max(0) as usize)
			}
			v => Err(Error::InvalidLimit {
				kind: "START",
				value: v.to_string(),
			}),
		}
	}
}

impl fmt::Display for Start {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "START {}", self.0)
	}
}
