use crate::err::Error;
use crate::sql::array::Array;
use crate::sql::bytes::Bytes;
use crate::sql::datetime::Datetime;
use crate::sql::duration::Duration;
use crate::sql::number::Number;
use crate::sql::object::Object;
use crate::sql::strand::Strand;
use crate::sql::table::Table;
use crate::sql::thing::Thing;
use crate::sql::uuid::Uuid;
use crate::sql::value::Value;
use revision::revisioned;
use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The declared type of a `DEFINE FIELD`, used to coerce incoming values
/// and to decide what "conforms to the declared type" means for `ASSERT`.
#[revisioned(revision = 1)]
#[derive(Clone, Debug, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Kind {
	#[default]
	Any,
	Bool,
	Int,
	Float,
	Decimal,
	Number,
	String,
	Datetime,
	Duration,
	Uuid,
	Bytes,
	Object,
	Array(Box<Kind>),
	Record(Vec<Table>),
	Either(Vec<Kind>),
}

impl Kind {
	/// Coerce `v` to this declared type, the way a `DEFINE FIELD TYPE`
	/// clause narrows an incoming value before it is stored.
	///
	/// Unlike an explicit cast, this only bridges values that already carry
	/// the right kind of data (a string that looks like a number, a record
	/// id for the right table) rather than reformatting between unrelated
	/// representations.
	pub fn coerce(&self, v: Value) -> Result<Value, Error> {
		// Either tries each branch in turn, so it recurses before the
		// outer error-wrapping below would otherwise discard the value.
		if let Kind::Either(ks) = self {
			let mut val = v;
			for k in ks {
				match k.coerce(val) {
					Ok(v) => return Ok(v),
					Err(Error::ConvertTo {
						from,
						..
					}) => val = from,
					Err(e) => return Err(e),
				}
			}
			return Err(Error::ConvertTo {
				from: val,
				into: self.to_string(),
			});
		}
		let into = self.to_string();
		match self {
			Kind::Any => Ok(v),
			Kind::Bool => v.coerce_to_bool().map(Value::from),
			Kind::Int => v.coerce_to_int().map(Value::from),
			Kind::Float => v.coerce_to_float().map(Value::from),
			Kind::Decimal => v.coerce_to_decimal().map(Value::from),
			Kind::Number => v.coerce_to_number().map(Value::from),
			Kind::String => v.coerce_to_strand().map(Value::from),
			Kind::Datetime => v.coerce_to_datetime().map(Value::from),
			Kind::Duration => v.coerce_to_duration().map(Value::from),
			Kind::Uuid => v.coerce_to_uuid().map(Value::from),
			Kind::Bytes => v.coerce_to_bytes().map(Value::from),
			Kind::Object => v.coerce_to_object().map(Value::from),
			Kind::Array(k) => v.coerce_to_array_of(k).map(Value::from),
			Kind::Record(tables) => v.coerce_to_record(tables).map(Value::from),
			Kind::Either(_) => unreachable!("handled above"),
		}
		.map_err(|from| Error::ConvertTo {
			from,
			into,
		})
	}
}

impl fmt::Display for Kind {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::Any => f.write_str("any"),
			Self::Bool => f.write_str("bool"),
			Self::Int => f.write_str("int"),
			Self::Float => f.write_str("float"),
			Self::Decimal => f.write_str("decimal"),
			Self::Number => f.write_str("number"),
			Self::String => f.write_str("string"),
			Self::Datetime => f.write_str("datetime"),
			Self::Duration => f.write_str("duration"),
			Self::Uuid => f.write_str("uuid"),
			Self::Bytes => f.write_str("bytes"),
			Self::Object => f.write_str("object"),
			Self::Array(k) => write!(f, "array<{k}>"),
			Self::Record(tables) => {
				write!(f, "record")?;
				if !tables.is_empty() {
					write!(f, "<")?;
					for (i, t) in tables.iter().enumerate() {
						if i > 0 {
							write!(f, " | ")?;
						}
						write!(f, "{t}")?;
					}
					write!(f, ">")?;
				}
				Ok(())
			}
			Self::Either(ks) => {
				for (i, k) in ks.iter().enumerate() {
					if i > 0 {
						write!(f, " | ")?;
					}
					write!(f, "{k}")?;
				}
				Ok(())
			}
		}
	}
}
