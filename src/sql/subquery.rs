use crate::ctx::Context;
use crate::dbs::Options;
use crate::doc::CursorDoc;
use crate::err::Error;
use crate::sql::statement::Statement;
use crate::sql::value::Value;
use reblessive::tree::Stk;
use revision::revisioned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A nested statement evaluated in its own evaluator frame and unwrapped to
/// a single value.
#[revisioned(revision = 1)]
#[derive(Clone, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Subquery(pub Box<Statement>);

impl Subquery {
	pub fn writeable(&self) -> bool {
		self.0.writeable()
	}

	pub async fn compute(
		&self,
		stk: &mut Stk,
		ctx: &Context,
		opt: &Options,
		doc: Option<&CursorDoc>,
	) -> Result<Value, Error> {
		let _ = doc;
		let opt = &opt.new_with_futures(true);
		crate::dbs::execute_statement(stk, ctx, opt, &self.0).await
	}
}

impl fmt::Display for Subquery {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "({})", self.0)
	}
}
