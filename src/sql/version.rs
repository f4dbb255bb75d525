use crate::ctx::Context;
use crate::dbs::Options;
use crate::doc::CursorDoc;
use crate::err::Error;
use crate::sql::value::Value;
use reblessive::tree::Stk;
use revision::revisioned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// `VERSION expr` — read-version, as a nanosecond unix timestamp.
#[revisioned(revision = 1)]
#[derive(Clone, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Version(pub Value);

impl Version {
	pub async fn compute(
		&self,
		stk: &mut Stk,
		ctx: &Context,
		opt: &Options,
		doc: Option<&CursorDoc>,
	) -> Result<u64, Error> {
		match self.0.compute(stk, ctx, opt, doc).await? {
			Value::Datetime(d) => Ok(d.0.timestamp_nanos_opt().unwrap_or_default() as u64),
			Value::Number(n) => Ok(n.as_int().max(0) as u64),
			v => Err(Error::InvalidLimit {
				kind: "VERSION",
				value: v.to_string(),
			}),
		}
	}
}

impl fmt::Display for Version {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "VERSION {}", self.0)
	}
}
