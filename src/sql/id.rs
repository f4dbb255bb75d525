use crate::cnf::ID_CHARS;
use crate::sql::array::Array;
use crate::sql::number::Number;
use crate::sql::object::Object;
use crate::sql::strand::Strand;
use rand::Rng;
use revision::revisioned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The identifying part of a record id, excluding the table name.
#[revisioned(revision = 1)]
#[derive(Clone, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Id {
	Number(i64),
	String(String),
	Array(Array),
	Object(Object),
}

impl From<i64> for Id {
	fn from(v: i64) -> Self {
		Self::Number(v)
	}
}

impl From<String> for Id {
	fn from(v: String) -> Self {
		Self::String(v)
	}
}

impl From<&str> for Id {
	fn from(v: &str) -> Self {
		Self::String(v.to_owned())
	}
}

impl From<Strand> for Id {
	fn from(v: Strand) -> Self {
		Self::String(v.into_string())
	}
}

impl From<Number> for Id {
	fn from(v: Number) -> Self {
		match v {
			Number::Int(v) => Self::Number(v),
			v => Self::String(v.to_string()),
		}
	}
}

impl From<Array> for Id {
	fn from(v: Array) -> Self {
		Self::Array(v)
	}
}

impl From<Object> for Id {
	fn from(v: Object) -> Self {
		Self::Object(v)
	}
}

impl Id {
	/// Generate a pseudo-random record id segment (used by `person:rand()`
	/// and the iterator's synthesised-id ranges).
	pub fn rand() -> Self {
		let mut rng = rand::thread_rng();
		let id: String = (0..20).map(|_| ID_CHARS[rng.gen_range(0..ID_CHARS.len())]).collect();
		Self::String(id)
	}

	pub fn ulid() -> Self {
		Self::String(crate::sql::uuid::Uuid::new().to_string())
	}
}

impl fmt::Display for Id {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::Number(v) => write!(f, "{v}"),
			Self::String(v) => write!(f, "{v}"),
			Self::Array(v) => write!(f, "{v}"),
			Self::Object(v) => write!(f, "{v}"),
		}
	}
}
