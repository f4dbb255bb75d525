use crate::ctx::Context;
use crate::dbs::Options;
use crate::doc::CursorDoc;
use crate::err::Error;
use crate::sql::value::Value;
use reblessive::tree::Stk;
use revision::revisioned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// `IF cond THEN then [ELSE IF cond THEN then ...] [ELSE close] END` —
/// branches are plain values, each typically a parenthesised subquery when a
/// branch needs to run a statement rather than evaluate an expression.
/// Grounded on the teacher's `sql/statements/ifelse.rs`, trimmed of its
/// `Value::Block` branch shape and `Fmt`/`Pretty` display machinery (neither
/// exists in this crate) down to the plain `(cond, Value)` pairs the
/// teacher's own struct already carries.
#[revisioned(revision = 1)]
#[derive(Clone, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct IfelseStatement {
	/// The first `IF` condition and its branch, followed by any `ELSE IF`s.
	pub exprs: Vec<(Value, Value)>,
	/// The final `ELSE` branch, if there is one.
	pub close: Option<Value>,
}

impl IfelseStatement {
	pub(crate) fn writeable(&self) -> bool {
		self.exprs.iter().any(|(cond, then)| cond.writeable() || then.writeable())
			|| self.close.as_ref().is_some_and(|v| v.writeable())
	}

	pub(crate) async fn compute(
		&self,
		stk: &mut Stk,
		ctx: &Context,
		opt: &Options,
		doc: Option<&CursorDoc>,
	) -> Result<Value, Error> {
		for (cond, then) in &self.exprs {
			let v = stk.run(|stk| cond.compute(stk, ctx, opt, doc)).await?;
			if v.is_truthy() {
				return stk.run(|stk| then.compute(stk, ctx, opt, doc)).await;
			}
		}
		match &self.close {
			Some(v) => stk.run(|stk| v.compute(stk, ctx, opt, doc)).await,
			None => Ok(Value::None),
		}
	}
}

impl fmt::Display for IfelseStatement {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		for (i, (cond, then)) in self.exprs.iter().enumerate() {
			if i == 0 {
				write!(f, "IF {cond} THEN {then}")?;
			} else {
				write!(f, " ELSE IF {cond} THEN {then}")?;
			}
		}
		if let Some(v) = &self.close {
			write!(f, " ELSE {v}")?;
		}
		write!(f, " END")
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::sql::statement::Statement;
	use crate::sql::statements::misc::OutputStatement;
	use crate::sql::subquery::Subquery;

	fn output(v: Value) -> Value {
		Value::from(Subquery(Box::new(Statement::Output(OutputStatement {
			what: v,
		}))))
	}

	#[tokio::test]
	async fn first_true_branch_wins() {
		let stmt = IfelseStatement {
			exprs: vec![
				(Value::from(false), output(Value::from(1))),
				(Value::from(true), output(Value::from(2))),
			],
			close: Some(output(Value::from(3))),
		};
		let ctx = Context::background();
		let opt = Options::default();
		let mut stack = reblessive::TreeStack::new();
		let result =
			stack.enter(|stk| stmt.compute(stk, &ctx, &opt, None)).finish().await.unwrap();
		assert_eq!(result, Value::from(2));
	}

	#[tokio::test]
	async fn falls_through_to_close() {
		let stmt = IfelseStatement {
			exprs: vec![(Value::from(false), output(Value::from(1)))],
			close: Some(output(Value::from(9))),
		};
		let ctx = Context::background();
		let opt = Options::default();
		let mut stack = reblessive::TreeStack::new();
		let result =
			stack.enter(|stk| stmt.compute(stk, &ctx, &opt, None)).finish().await.unwrap();
		assert_eq!(result, Value::from(9));
	}

	#[tokio::test]
	async fn no_branch_no_close_is_none() {
		let stmt = IfelseStatement {
			exprs: vec![(Value::from(false), output(Value::from(1)))],
			close: None,
		};
		let ctx = Context::background();
		let opt = Options::default();
		let mut stack = reblessive::TreeStack::new();
		let result =
			stack.enter(|stk| stmt.compute(stk, &ctx, &opt, None)).finish().await.unwrap();
		assert_eq!(result, Value::None);
	}
}
