use crate::sql::cond::Cond;
use crate::sql::field::Fields;
use crate::sql::group::Groups;
use crate::sql::idiom::Idiom;
use crate::sql::number::Number;
use crate::sql::object::Object;
use crate::sql::table::Table;
use crate::sql::value::Value;
use revision::revisioned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One incrementally-maintained aggregate projected by a foreign table's
/// `GROUP BY`. There is no function-call expression in this crate's value
/// grammar, so an aggregate can't be written as an ordinary projected field
/// the way `count()`/`math::sum(x)` are in the teacher — it is instead
/// declared directly as structured data naming the source field it reads
/// and the method used to fold it in.
#[revisioned(revision = 1)]
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
#[non_exhaustive]
pub enum AggregateMethod {
	Count,
	/// `count(cond)` — counts only rows where `of` evaluates truthy.
	CountIf,
	/// `count(!cond)` — counts only rows where `of` evaluates falsy.
	CountNot,
	Sum,
	Mean,
	Min,
	Max,
	StdDev,
	Variance,
	/// Number of distinct values seen for `of` across the group.
	Distinct,
}

impl fmt::Display for AggregateMethod {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.write_str(match self {
			Self::Count => "count",
			Self::CountIf => "count.if",
			Self::CountNot => "count.not",
			Self::Sum => "math::sum",
			Self::Mean => "math::mean",
			Self::Min => "math::min",
			Self::Max => "math::max",
			Self::StdDev => "math::stddev",
			Self::Variance => "math::variance",
			Self::Distinct => "array::distinct",
		})
	}
}

#[revisioned(revision = 1)]
#[derive(Clone, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Aggregate {
	pub method: AggregateMethod,
	/// The field read off the source record (ignored by `Count`).
	pub of: Idiom,
	/// The field written on the foreign (view) record.
	pub into: Idiom,
}

impl fmt::Display for Aggregate {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "{}({}) AS {}", self.method, self.of, self.into)
	}
}

/// The `AS SELECT ...` clause turning a `DEFINE TABLE` into a foreign
/// (materialised) table: its rows are recomputed from `what` whenever a
/// source record changes.
#[revisioned(revision = 1)]
#[derive(Clone, Debug, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct View {
	/// Plain pass-through projections: group-by key echoes and any other
	/// field copied verbatim from the source record. Aggregates are listed
	/// separately in `aggregates`, not mixed into this field list.
	pub expr: Fields,
	pub what: Vec<Table>,
	pub cond: Option<Cond>,
	pub group: Option<Groups>,
	pub aggregates: Vec<Aggregate>,
}

impl fmt::Display for View {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "AS SELECT {}", self.expr)?;
		for agg in &self.aggregates {
			write!(f, ", {agg}")?;
		}
		write!(f, " FROM ")?;
		for (i, t) in self.what.iter().enumerate() {
			if i > 0 {
				write!(f, ", ")?;
			}
			write!(f, "{t}")?;
		}
		if let Some(cond) = &self.cond {
			write!(f, " {cond}")?;
		}
		if let Some(group) = &self.group {
			write!(f, " GROUP BY ")?;
			for (i, g) in group.0.iter().enumerate() {
				if i > 0 {
					write!(f, ", ")?;
				}
				write!(f, "{g}")?;
			}
		}
		Ok(())
	}
}

/// Whether an aggregate's contribution is being folded in (a row joining
/// the group) or out (a row leaving it, or never applicable to a
/// fresh-scan `SELECT ... GROUP BY` which only ever folds in).
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Fold {
	Add,
	Remove,
}

/// A hidden running-total field backing `Mean`/`StdDev`/`Variance`, which
/// can't be derived from the visible aggregate value alone.
fn hidden(into: &Idiom, suffix: &str) -> String {
	format!("__{}_{suffix}", into.to_dotted())
}

fn num(obj: &Object, key: &str) -> Number {
	match obj.0.get(key) {
		Some(Value::Number(n)) => *n,
		_ => Number::Int(0),
	}
}

/// Fold one record's contribution to `agg` into the shared group row
/// `obj`, in the direction `dir`. Shared by incremental materialised-view
/// maintenance (`doc/table.rs`) and a one-shot `SELECT ... GROUP BY` scan
/// (`dbs/iterator.rs`), which only ever folds `Add`.
pub fn fold_aggregate(obj: &mut Object, agg: &Aggregate, val: &Value, dir: Fold) {
	let key = agg.into.to_dotted();
	let sign = match dir {
		Fold::Add => 1,
		Fold::Remove => -1,
	};
	match agg.method {
		AggregateMethod::Count => {
			let n = num(obj, &key).as_int() + sign;
			obj.0.insert(key, Value::from(n.max(0)));
		}
		AggregateMethod::CountIf => {
			if val.is_truthy() {
				let n = num(obj, &key).as_int() + sign;
				obj.0.insert(key, Value::from(n.max(0)));
			}
		}
		AggregateMethod::CountNot => {
			if !val.is_truthy() {
				let n = num(obj, &key).as_int() + sign;
				obj.0.insert(key, Value::from(n.max(0)));
			}
		}
		AggregateMethod::Distinct => {
			let items_key = hidden(&agg.into, "items");
			let mut items: Vec<Value> = match obj.0.get(&items_key) {
				Some(Value::Array(a)) => a.0.clone(),
				_ => Vec::new(),
			};
			if sign > 0 {
				items.push(val.clone());
			} else if let Some(pos) = items.iter().position(|v| v == val) {
				items.remove(pos);
			}
			let mut uniq: Vec<&Value> = Vec::new();
			for it in &items {
				if !uniq.contains(&it) {
					uniq.push(it);
				}
			}
			let count = uniq.len() as i64;
			obj.0.insert(items_key, Value::Array(crate::sql::array::Array(items)));
			obj.0.insert(key, Value::from(count));
		}
		AggregateMethod::Sum => {
			let Value::Number(v) = val else { return };
			let n = num(obj, &key) + if sign > 0 { *v } else { Number::Int(0) - *v };
			obj.0.insert(key, Value::from(n));
		}
		AggregateMethod::Min => {
			if sign < 0 {
				return;
			}
			let Value::Number(v) = val else { return };
			let cur = obj.0.get(&key);
			let lower = match cur {
				Some(Value::Number(c)) => *v < *c,
				_ => true,
			};
			if lower {
				obj.0.insert(key, Value::from(*v));
			}
		}
		AggregateMethod::Max => {
			if sign < 0 {
				return;
			}
			let Value::Number(v) = val else { return };
			let cur = obj.0.get(&key);
			let higher = match cur {
				Some(Value::Number(c)) => *v > *c,
				_ => true,
			};
			if higher {
				obj.0.insert(key, Value::from(*v));
			}
		}
		AggregateMethod::Mean => {
			let Value::Number(v) = val else { return };
			let n_key = hidden(&agg.into, "n");
			let s_key = hidden(&agg.into, "s");
			let n = num(obj, &n_key).as_float() + sign as f64;
			let s = num(obj, &s_key).as_float() + sign as f64 * v.as_float();
			obj.0.insert(n_key, Value::from(n));
			obj.0.insert(s_key, Value::from(s));
			let mean = if n > 0.0 { s / n } else { 0.0 };
			obj.0.insert(key, Value::from(mean));
		}
		AggregateMethod::StdDev | AggregateMethod::Variance => {
			// c = count, t = sum, m = sum-of-squares, named `n`/`s`/`q`
			// below to match the sidecar field names already on disk.
			let Value::Number(v) = val else { return };
			let n_key = hidden(&agg.into, "n");
			let s_key = hidden(&agg.into, "s");
			let q_key = hidden(&agg.into, "q");
			let n = num(obj, &n_key).as_float() + sign as f64;
			let s = num(obj, &s_key).as_float() + sign as f64 * v.as_float();
			let q = num(obj, &q_key).as_float() + sign as f64 * v.as_float() * v.as_float();
			obj.0.insert(n_key, Value::from(n));
			obj.0.insert(s_key, Value::from(s));
			obj.0.insert(q_key, Value::from(q));
			let variance = if n > 0.0 { ((n * q) - (s * s)) / n } else { 0.0 };
			let variance = variance.max(0.0);
			let out = if matches!(agg.method, AggregateMethod::StdDev) {
				if n > 1.0 {
					(((n * q) - (s * s)) / (n * (n - 1.0))).max(0.0).sqrt()
				} else {
					0.0
				}
			} else {
				variance
			};
			obj.0.insert(key, Value::from(out));
		}
	}
}
