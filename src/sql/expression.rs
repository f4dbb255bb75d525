use crate::ctx::Context;
use crate::dbs::Options;
use crate::doc::CursorDoc;
use crate::err::Error;
use crate::sql::operator::Operator;
use crate::sql::value::Value;
use reblessive::tree::Stk;
use revision::revisioned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A unary or binary expression node.
#[revisioned(revision = 1)]
#[derive(Clone, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Expression {
	Unary {
		o: Operator,
		v: Value,
	},
	Binary {
		l: Value,
		o: Operator,
		r: Value,
	},
}

impl Expression {
	pub fn writeable(&self) -> bool {
		match self {
			Self::Unary {
				v,
				..
			} => v.writeable(),
			Self::Binary {
				l,
				r,
				..
			} => l.writeable() || r.writeable(),
		}
	}

	pub async fn compute(
		&self,
		stk: &mut Stk,
		ctx: &Context,
		opt: &Options,
		doc: Option<&CursorDoc>,
	) -> Result<Value, Error> {
		match self {
			Self::Unary {
				o,
				v,
			} => {
				let v = stk.run(|stk| v.compute(stk, ctx, opt, doc)).await?;
				match o {
					Operator::Neg => v.negate(),
					Operator::Not => Ok(Value::Bool(!v.is_truthy())),
					_ => Err(crate::fail!("unsupported unary operator {o}")),
				}
			}
			Self::Binary {
				l,
				o,
				r,
			} => {
				// AND/OR short-circuit
				if matches!(o, Operator::And) {
					let l = stk.run(|stk| l.compute(stk, ctx, opt, doc)).await?;
					if !l.is_truthy() {
						return Ok(Value::Bool(false));
					}
					let r = stk.run(|stk| r.compute(stk, ctx, opt, doc)).await?;
					return Ok(Value::Bool(r.is_truthy()));
				}
				if matches!(o, Operator::Or) {
					let l = stk.run(|stk| l.compute(stk, ctx, opt, doc)).await?;
					if l.is_truthy() {
						return Ok(Value::Bool(true));
					}
					let r = stk.run(|stk| r.compute(stk, ctx, opt, doc)).await?;
					return Ok(Value::Bool(r.is_truthy()));
				}
				let l = stk.run(|stk| l.compute(stk, ctx, opt, doc)).await?;
				let r = stk.run(|stk| r.compute(stk, ctx, opt, doc)).await?;
				l.arithmetic_or_compare(o, &r)
			}
		}
	}
}

impl fmt::Display for Expression {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::Unary {
				o,
				v,
			} => write!(f, "{o}{v}"),
			Self::Binary {
				l,
				o,
				r,
			} => write!(f, "{l} {o} {r}"),
		}
	}
}
