use crate::sql::{ident::Ident, number::Number, value::Value};
use revision::revisioned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One segment of a dotted path through a document.
#[revisioned(revision = 1)]
#[derive(Clone, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Part {
	/// `.*` — every element/field
	All,
	/// A plain field name
	Field(Ident),
	/// `[n]` — array index
	Index(Number),
	/// `[$]` — last array element
	Last,
	/// `[0]` — first array element
	First,
	/// `[WHERE cond]` — filters array elements
	Where(Value),
}

impl From<&str> for Part {
	fn from(v: &str) -> Self {
		match v.parse::<i64>() {
			Ok(v) => Self::Index(Number::Int(v)),
			_ => Self::Field(v.into()),
		}
	}
}

impl From<String> for Part {
	fn from(v: String) -> Self {
		Self::from(v.as_str())
	}
}

impl From<Ident> for Part {
	fn from(v: Ident) -> Self {
		Self::Field(v)
	}
}

impl From<i64> for Part {
	fn from(v: i64) -> Self {
		Self::Index(Number::Int(v))
	}
}

impl fmt::Display for Part {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::All => f.write_str("[*]"),
			Self::Field(v) => write!(f, ".{v}"),
			Self::Index(v) => write!(f, "[{v}]"),
			Self::Last => f.write_str("[$]"),
			Self::First => f.write_str("[0]"),
			Self::Where(v) => write!(f, "[WHERE {v}]"),
		}
	}
}

/// A slice-of-parts helper yielding the remaining path after the head.
pub trait Next<'a> {
	fn next(&'a self) -> &'a [Part];
}

impl<'a> Next<'a> for &'a [Part] {
	fn next(&'a self) -> &'a [Part] {
		match self.len() {
			0 => &[],
			_ => &self[1..],
		}
	}
}
