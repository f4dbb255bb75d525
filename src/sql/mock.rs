use crate::sql::id::Id;
use crate::sql::number::Number;
use crate::sql::thing::Thing;
use revision::revisioned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A set of record ids under one table named directly in a query rather
/// than found by a scan: `|tb:N|`, `|tb:lo..hi|`, `|tb:lo,step..hi|`, or
/// `batch(tb, [ids])`. Grounded on the teacher's `sql/mock.rs` two-variant
/// shape (`Count`/`Range`), generalised to signed/fractional/stepped
/// ranges and given a third variant for `batch`'s explicit id list, which
/// the teacher's grammar has no equivalent for.
#[revisioned(revision = 1)]
#[derive(Clone, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Mock {
	/// `|tb:N|` — ids `1..=N`. The teacher generates a fresh random id per
	/// count instead; this crate generates them sequentially, since a
	/// deterministic id sequence is what makes `|tb:N|` useful as a query
	/// fixture rather than a second `CREATE ... 123` random-id path.
	Count(String, i64),
	/// `|tb:lo..hi|` / `|tb:lo,step..hi|` — ids from `from` to `to`
	/// inclusive, stepping by `step` (default `1`; its sign is ignored —
	/// direction follows whether `from <= to`). Negative and fractional
	/// bounds are accepted; since a record id has no fractional numeric
	/// variant, each step's value is rounded to the nearest integer before
	/// becoming an id.
	Range {
		tb: String,
		from: Number,
		step: Number,
		to: Number,
	},
	/// `batch(tb, [ids])` — explicit ids under one table.
	Batch(String, Vec<Id>),
}

impl Mock {
	/// Enumerate this mock's record ids in order.
	pub(crate) fn things(&self) -> Vec<Thing> {
		match self {
			Self::Count(tb, n) => {
				(1..=(*n).max(0)).map(|i| Thing::from((tb.as_str(), Id::from(i)))).collect()
			}
			Self::Range {
				tb,
				from,
				step,
				to,
			} => {
				let (from, to) = (from.as_float(), to.as_float());
				let step = step.as_float().abs().max(f64::EPSILON);
				let mut out = Vec::new();
				let mut v = from;
				if from <= to {
					while v <= to + f64::EPSILON {
						out.push(Thing::from((tb.as_str(), Id::from(v.round() as i64))));
						v += step;
					}
				} else {
					while v >= to - f64::EPSILON {
						out.push(Thing::from((tb.as_str(), Id::from(v.round() as i64))));
						v -= step;
					}
				}
				out
			}
			Self::Batch(tb, ids) => {
				ids.iter().map(|id| Thing::from((tb.as_str(), id.clone()))).collect()
			}
		}
	}
}

impl fmt::Display for Mock {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::Count(tb, n) => write!(f, "|{tb}:{n}|"),
			Self::Range {
				tb,
				from,
				step,
				to,
			} => match step {
				Number::Int(1) => write!(f, "|{tb}:{from}..{to}|"),
				_ => write!(f, "|{tb}:{from},{step}..{to}|"),
			},
			Self::Batch(tb, ids) => {
				write!(f, "batch({tb}, [")?;
				for (i, id) in ids.iter().enumerate() {
					if i > 0 {
						write!(f, ", ")?;
					}
					write!(f, "{id}")?;
				}
				write!(f, "])")
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn count_enumerates_one_based_sequential_ids() {
		let m = Mock::Count("person".into(), 3);
		let things = m.things();
		assert_eq!(things.len(), 3);
		assert_eq!(things[0].id, Id::from(1));
		assert_eq!(things[2].id, Id::from(3));
	}

	#[test]
	fn range_descends_when_from_greater_than_to() {
		let m = Mock::Range {
			tb: "person".into(),
			from: Number::Int(5),
			step: Number::Int(1),
			to: Number::Int(3),
		};
		let things = m.things();
		let ids: Vec<i64> = things
			.iter()
			.map(|t| match &t.id {
				Id::Number(n) => *n,
				_ => panic!("expected numeric id"),
			})
			.collect();
		assert_eq!(ids, vec![5, 4, 3]);
	}

	#[test]
	fn batch_preserves_explicit_id_order() {
		let m = Mock::Batch("person".into(), vec![Id::from("a"), Id::from("b")]);
		let things = m.things();
		assert_eq!(things[0].id, Id::from("a"));
		assert_eq!(things[1].id, Id::from("b"));
	}
}
