use crate::sql::idiom::Idiom;
use crate::sql::operator::Operator;
use crate::sql::value::Value;
use revision::revisioned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The data-modifying clause of a CREATE/UPDATE/UPSERT statement.
#[revisioned(revision = 1)]
#[derive(Clone, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Data {
	/// `SET a = 1, b += 2, c -= 3`
	Set(Vec<(Idiom, Operator, Value)>),
	/// `CONTENT { ... }`
	Content(Value),
	/// `MERGE { ... }`
	Merge(Value),
	/// `PATCH [ ... ]` — JSON-patch-style diff applied to `initial`
	Patch(Value),
	/// `UNSET a, b`
	Unset(Vec<Idiom>),
}

impl fmt::Display for Data {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::Set(v) => {
				write!(f, "SET ")?;
				for (i, (l, o, r)) in v.iter().enumerate() {
					if i > 0 {
						write!(f, ", ")?;
					}
					write!(f, "{l} {o} {r}")?;
				}
				Ok(())
			}
			Self::Content(v) => write!(f, "CONTENT {v}"),
			Self::Merge(v) => write!(f, "MERGE {v}"),
			Self::Patch(v) => write!(f, "PATCH {v}"),
			Self::Unset(v) => {
				write!(f, "UNSET ")?;
				for (i, idiom) in v.iter().enumerate() {
					if i > 0 {
						write!(f, ", ")?;
					}
					write!(f, "{idiom}")?;
				}
				Ok(())
			}
		}
	}
}
