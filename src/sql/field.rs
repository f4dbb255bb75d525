use crate::ctx::Context;
use crate::dbs::Options;
use crate::doc::CursorDoc;
use crate::err::Error;
use crate::sql::idiom::Idiom;
use crate::sql::value::Value;
use reblessive::tree::Stk;
use revision::revisioned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One projected expression in a `SELECT` (or `LIVE SELECT`) field list.
#[revisioned(revision = 1)]
#[derive(Clone, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Field {
	/// `SELECT *`
	All,
	/// `SELECT expr [AS alias]`
	Single {
		expr: Value,
		alias: Option<Idiom>,
	},
}

impl fmt::Display for Field {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::All => f.write_str("*"),
			Self::Single {
				expr,
				alias,
			} => {
				write!(f, "{expr}")?;
				if let Some(alias) = alias {
					write!(f, " AS {alias}")?;
				}
				Ok(())
			}
		}
	}
}

/// A `SELECT` field list. The trailing flag marks a `VALUE` projection —
/// the statement unwraps each row to that single field rather than
/// returning an object.
#[revisioned(revision = 1)]
#[derive(Clone, Debug, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Fields(pub Vec<Field>, pub bool);

impl Fields {
	pub fn all() -> Self {
		Self(vec![Field::All], false)
	}

	pub fn is_value(&self) -> bool {
		self.1
	}

	/// Project a computed document into the shape this field list produces.
	pub async fn compute(
		&self,
		stk: &mut Stk,
		ctx: &Context,
		opt: &Options,
		doc: Option<&CursorDoc>,
	) -> Result<Value, Error> {
		if self.is_value() {
			if let Some(Field::Single {
				expr,
				..
			}) = self.0.first()
			{
				return stk.run(|stk| expr.compute(stk, ctx, opt, doc)).await;
			}
		}
		let mut out = indexmap::IndexMap::new();
		for field in &self.0 {
			match field {
				Field::All => {
					if let Some(doc) = doc {
						if let Value::Object(o) = &*doc.doc {
							for (k, v) in o.iter() {
								out.insert(k.clone(), v.clone());
							}
						}
					}
				}
				Field::Single {
					expr,
					alias,
				} => {
					let name = match alias {
						Some(a) => a.to_dotted(),
						None => expr.to_string(),
					};
					let val = stk.run(|stk| expr.compute(stk, ctx, opt, doc)).await?;
					out.insert(name, val);
				}
			}
		}
		Ok(Value::Object(out.into()))
	}
}

impl fmt::Display for Fields {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		if self.1 {
			write!(f, "VALUE ")?;
		}
		for (i, field) in self.0.iter().enumerate() {
			if i > 0 {
				write!(f, ", ")?;
			}
			write!(f, "{field}")?;
		}
		Ok(())
	}
}
