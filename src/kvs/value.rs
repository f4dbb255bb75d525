//! Wire encoding for a [`Value`] as it is stored in the key-value layer.
//!
//! `Value` (and everything it contains) already carries `#[revisioned(...)]`
//! so it can evolve across versions without a migration; this just drives
//! that machinery for the one place a whole record gets turned into bytes.

use crate::err::Error;
use crate::kvs::Val;
use crate::sql::value::Value;
use revision::Revisioned;

/// Encode anything carrying `#[revisioned(...)]` — a [`Value`] or one of the
/// `Define*Statement` schema entries stored alongside it.
pub(crate) fn encode_revisioned<T: Revisioned>(v: &T) -> Result<Val, Error> {
	let mut buf = Vec::new();
	v.serialize_revisioned(&mut buf).map_err(|e| Error::Serialization(e.to_string()))?;
	Ok(buf)
}

pub(crate) fn decode_revisioned<T: Revisioned>(v: &[u8]) -> Result<T, Error> {
	let mut reader = v;
	T::deserialize_revisioned(&mut reader).map_err(|e| Error::Serialization(e.to_string()))
}

pub(crate) fn encode(v: &Value) -> Result<Val, Error> {
	encode_revisioned(v)
}

pub(crate) fn decode(v: &[u8]) -> Result<Value, Error> {
	decode_revisioned(v)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::sql::object::Object;

	#[test]
	fn round_trips_a_value() {
		let mut o = indexmap::IndexMap::new();
		o.insert("a".to_string(), Value::from(1));
		let v = Value::Object(Object(o));
		let bytes = encode(&v).unwrap();
		assert_eq!(decode(&bytes).unwrap(), v);
	}
}
