use crate::ctx::Context;
use crate::dbs::Options;
use crate::doc::CursorDoc;
use crate::err::Error;
use crate::sql::array::Array;
use crate::sql::bytes::Bytes;
use crate::sql::datetime::Datetime;
use crate::sql::duration::Duration;
use crate::sql::expression::Expression;
use crate::sql::idiom::Idiom;
use crate::sql::kind::Kind;
use crate::sql::mock::Mock;
use crate::sql::number::Number;
use crate::sql::object::Object;
use crate::sql::operator::Operator;
use crate::sql::param::Param;
use crate::sql::part::{Next, Part};
use crate::sql::regex::Regex;
use crate::sql::strand::Strand;
use crate::sql::subquery::Subquery;
use crate::sql::table::Table;
use crate::sql::thing::Thing;
use crate::sql::uuid::Uuid;
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use reblessive::tree::Stk;
use revision::revisioned;
use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// The universal value type: every expression evaluates to one of these.
///
/// `None`/`Null`/`Empty` are the void/null/empty sentinel triad: `None`
/// means "field not present", `Null` means "present and null", `Empty`
/// matches either in a comparison.
#[revisioned(revision = 1)]
#[derive(Clone, Debug, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Value {
	#[default]
	None,
	Null,
	Empty,
	Bool(bool),
	Number(Number),
	Strand(Strand),
	Duration(Duration),
	Datetime(Datetime),
	Uuid(Uuid),
	Bytes(Bytes),
	Array(Array),
	Object(Object),
	Thing(Thing),
	Table(Table),
	Param(Param),
	Idiom(Idiom),
	Regex(Regex),
	Expression(Box<Expression>),
	Subquery(Box<Subquery>),
	/// `|tb:N|`, `|tb:lo..hi|`, or `batch(tb, [ids])` — a synthesised or
	/// explicit set of record ids, consumed only as an iterator input.
	Mock(Mock),
}

macro_rules! from_value {
	($variant:ident, $t:ty) => {
		impl From<$t> for Value {
			fn from(v: $t) -> Self {
				Self::$variant(v.into())
			}
		}
	};
}

from_value!(Bool, bool);
from_value!(Strand, String);
from_value!(Strand, &str);
from_value!(Duration, std::time::Duration);
from_value!(Array, Vec<Value>);
from_value!(Object, indexmap::IndexMap<String, Value>);
from_value!(Thing, Thing);
from_value!(Table, Table);
from_value!(Table, &str);
from_value!(Param, Param);
from_value!(Idiom, Idiom);

impl From<Number> for Value {
	fn from(v: Number) -> Self {
		Self::Number(v)
	}
}

impl From<i64> for Value {
	fn from(v: i64) -> Self {
		Self::Number(Number::Int(v))
	}
}

impl From<f64> for Value {
	fn from(v: f64) -> Self {
		Self::Number(Number::Float(v))
	}
}

impl From<Expression> for Value {
	fn from(v: Expression) -> Self {
		Self::Expression(Box::new(v))
	}
}

impl From<Strand> for Value {
	fn from(v: Strand) -> Self {
		Self::Strand(v)
	}
}

impl From<Array> for Value {
	fn from(v: Array) -> Self {
		Self::Array(v)
	}
}

impl From<Object> for Value {
	fn from(v: Object) -> Self {
		Self::Object(v)
	}
}

impl From<Duration> for Value {
	fn from(v: Duration) -> Self {
		Self::Duration(v)
	}
}

impl From<Datetime> for Value {
	fn from(v: Datetime) -> Self {
		Self::Datetime(v)
	}
}

impl From<Uuid> for Value {
	fn from(v: Uuid) -> Self {
		Self::Uuid(v)
	}
}

impl From<Bytes> for Value {
	fn from(v: Bytes) -> Self {
		Self::Bytes(v)
	}
}

impl From<Subquery> for Value {
	fn from(v: Subquery) -> Self {
		Self::Subquery(Box::new(v))
	}
}

impl Value {
	/// `true` for anything but the void/null/empty sentinels and falsy
	/// scalars (`false`, `0`, `""`, empty array/object/bytes).
	pub fn is_truthy(&self) -> bool {
		match self {
			Self::None | Self::Null | Self::Empty => false,
			Self::Bool(v) => *v,
			Self::Number(v) => v.is_truthy(),
			Self::Strand(v) => !v.is_empty(),
			Self::Duration(v) => !v.is_zero(),
			Self::Datetime(v) => !v.is_zero(),
			Self::Array(v) => !v.is_empty(),
			Self::Object(v) => !v.is_empty(),
			Self::Bytes(v) => !v.is_empty(),
			_ => true,
		}
	}

	pub fn is_none(&self) -> bool {
		matches!(self, Self::None)
	}

	pub fn is_null(&self) -> bool {
		matches!(self, Self::Null)
	}

	/// Matches either void or null, per the triad's `empty` sentinel.
	pub fn is_none_or_null(&self) -> bool {
		matches!(self, Self::None | Self::Null | Self::Empty)
	}

	pub fn is_array(&self) -> bool {
		matches!(self, Self::Array(_))
	}

	pub fn is_object(&self) -> bool {
		matches!(self, Self::Object(_))
	}

	pub fn is_number(&self) -> bool {
		matches!(self, Self::Number(_))
	}

	pub fn as_string(&self) -> String {
		match self {
			Self::Strand(v) => v.as_str().to_owned(),
			v => v.to_string(),
		}
	}

	/// Whether computing this value requires write access — an `Expression`
	/// or `Subquery` might mutate data, so the executor must upgrade a
	/// read-only transaction before evaluating it.
	pub fn writeable(&self) -> bool {
		match self {
			Self::Array(v) => v.iter().any(Value::writeable),
			Self::Object(v) => v.values().any(Value::writeable),
			Self::Expression(v) => v.writeable(),
			Self::Subquery(v) => v.writeable(),
			_ => false,
		}
	}

	/// Unary minus / logical not target for arithmetic negation.
	pub fn negate(self) -> Result<Value, Error> {
		match self {
			Self::Number(n) => Ok(Value::Number(-n)),
			Self::Bool(b) => Ok(Value::Bool(!b)),
			v => Err(crate::fail!("cannot negate {v}")),
		}
	}

	/// The following `coerce_to_*` methods back [`crate::sql::kind::Kind::coerce`]:
	/// each bridges one declared field type, returning the original value
	/// unchanged as the error so the caller can report what it found.

	pub(crate) fn coerce_to_bool(self) -> Result<bool, Value> {
		match self {
			Self::Bool(v) => Ok(v),
			Self::Strand(ref s) => s.parse::<bool>().map_err(|_| self.clone()),
			v => Err(v),
		}
	}

	pub(crate) fn coerce_to_int(self) -> Result<Number, Value> {
		match self {
			Self::Number(n @ Number::Int(_)) => Ok(n),
			Self::Number(Number::Float(f)) if f.fract() == 0.0 => Ok(Number::Int(f as i64)),
			Self::Number(Number::Decimal(d)) if d.fract().is_zero() => {
				d.to_i64().map(Number::Int).ok_or_else(|| self.clone())
			}
			Self::Strand(ref s) => s.parse::<i64>().map(Number::Int).map_err(|_| self.clone()),
			v => Err(v),
		}
	}

	pub(crate) fn coerce_to_float(self) -> Result<Number, Value> {
		match self {
			Self::Number(Number::Float(f)) => Ok(Number::Float(f)),
			Self::Number(n) => Ok(Number::Float(n.as_float())),
			Self::Strand(ref s) => s.parse::<f64>().map(Number::Float).map_err(|_| self.clone()),
			v => Err(v),
		}
	}

	pub(crate) fn coerce_to_decimal(self) -> Result<Number, Value> {
		match self {
			Self::Number(n @ Number::Decimal(_)) => Ok(n),
			Self::Number(Number::Int(i)) => Ok(Number::Decimal(Decimal::from(i))),
			Self::Number(Number::Float(f)) => {
				Decimal::from_f64(f).map(Number::Decimal).ok_or_else(|| self.clone())
			}
			Self::Strand(ref s) => {
				Decimal::from_str(s).map(Number::Decimal).map_err(|_| self.clone())
			}
			v => Err(v),
		}
	}

	pub(crate) fn coerce_to_number(self) -> Result<Number, Value> {
		match self {
			Self::Number(n) => Ok(n),
			Self::Strand(ref s) => Number::from_str(s).map_err(|_| self.clone()),
			v => Err(v),
		}
	}

	pub(crate) fn coerce_to_strand(self) -> Result<Strand, Value> {
		match self {
			Self::Strand(s) => Ok(s),
			Self::Bool(_) | Self::Number(_) | Self::Uuid(_) | Self::Duration(_) | Self::Datetime(_) => {
				Ok(Strand(self.as_string()))
			}
			v => Err(v),
		}
	}

	pub(crate) fn coerce_to_datetime(self) -> Result<Datetime, Value> {
		match self {
			Self::Datetime(d) => Ok(d),
			v => Err(v),
		}
	}

	pub(crate) fn coerce_to_duration(self) -> Result<Duration, Value> {
		match self {
			Self::Duration(d) => Ok(d),
			v => Err(v),
		}
	}

	pub(crate) fn coerce_to_uuid(self) -> Result<Uuid, Value> {
		match self {
			Self::Uuid(u) => Ok(u),
			Self::Strand(ref s) => s.parse::<Uuid>().map_err(|_| self.clone()),
			v => Err(v),
		}
	}

	pub(crate) fn coerce_to_bytes(self) -> Result<Bytes, Value> {
		match self {
			Self::Bytes(b) => Ok(b),
			v => Err(v),
		}
	}

	pub(crate) fn coerce_to_object(self) -> Result<Object, Value> {
		match self {
			Self::Object(o) => Ok(o),
			v => Err(v),
		}
	}

	pub(crate) fn coerce_to_array_of(self, kind: &Kind) -> Result<Array, Value> {
		match self {
			Self::Array(a) => {
				let mut out = Vec::with_capacity(a.len());
				for v in a.into_iter() {
					out.push(kind.coerce(v).map_err(|e| match e {
						Error::ConvertTo {
							from,
							..
						} => from,
						_ => Value::None,
					})?);
				}
				Ok(Array(out))
			}
			v => Err(v),
		}
	}

	pub(crate) fn coerce_to_record(self, tables: &[Table]) -> Result<Thing, Value> {
		match self {
			Self::Thing(t) if tables.is_empty() || tables.iter().any(|tb| tb.0 == t.tb) => Ok(t),
			v => Err(v),
		}
	}

	/// Evaluate this value in the given context: resolve parameters, follow
	/// idiom paths (including embedded record ids), and recurse into
	/// expressions/subqueries. Scalars evaluate to themselves.
	pub async fn compute(
		&self,
		stk: &mut Stk,
		ctx: &Context,
		opt: &Options,
		doc: Option<&CursorDoc>,
	) -> Result<Value, Error> {
		if ctx.is_done() {
			return Err(Error::QueryCancelled);
		}
		match self {
			Self::Param(p) => match p.as_str() {
				"this" | "self" => {
					Ok(doc.map(|d| d.doc.clone().into_owned()).unwrap_or(Value::None))
				}
				name => match ctx.value(name) {
					Some(v) => Ok(v.clone()),
					None => Ok(Value::None),
				},
			},
			Self::Idiom(p) => self.get(stk, ctx, opt, doc, p).await,
			Self::Expression(e) => stk.run(|stk| e.compute(stk, ctx, opt, doc)).await,
			Self::Subquery(s) => stk.run(|stk| s.compute(stk, ctx, opt, doc)).await,
			Self::Array(a) => {
				let mut out = Vec::with_capacity(a.len());
				for v in a.iter() {
					out.push(stk.run(|stk| v.compute(stk, ctx, opt, doc)).await?);
				}
				Ok(Value::Array(out.into()))
			}
			Self::Object(o) => {
				let mut out = indexmap::IndexMap::with_capacity(o.len());
				for (k, v) in o.iter() {
					out.insert(k.clone(), stk.run(|stk| v.compute(stk, ctx, opt, doc)).await?);
				}
				Ok(Value::Object(out.into()))
			}
			v => Ok(v.clone()),
		}
	}

	/// Resolve a dotted path (the `Get` path operation), starting from
	/// `self`. An embedded `Thing` encountered mid-path would normally be
	/// dereferenced against the KV layer by the document pipeline; this
	/// base value/expression layer addresses in-memory structures only.
	pub async fn get(
		&self,
		stk: &mut Stk,
		ctx: &Context,
		opt: &Options,
		doc: Option<&CursorDoc>,
		path: &[Part],
	) -> Result<Value, Error> {
		match path.first() {
			None => self.compute(stk, ctx, opt, doc).await,
			Some(p) => match self {
				Self::Object(o) => match p {
					Part::Field(f) => match o.get(f.as_str()) {
						Some(v) => stk.run(|stk| v.get(stk, ctx, opt, doc, path.next())).await,
						None => Ok(Value::None),
					},
					Part::All => stk.run(|stk| self.get(stk, ctx, opt, doc, path.next())).await,
					_ => Ok(Value::None),
				},
				Self::Array(a) => match p {
					Part::All => {
						let mut out = Vec::with_capacity(a.len());
						for v in a.iter() {
							out.push(stk.run(|stk| v.get(stk, ctx, opt, doc, path.next())).await?);
						}
						Ok(Value::Array(out.into()))
					}
					// A bare field name against an array distributes over
					// every element (`person:*.name` style auto-mapping).
					Part::Field(_) => {
						let mut out = Vec::with_capacity(a.len());
						for v in a.iter() {
							out.push(stk.run(|stk| v.get(stk, ctx, opt, doc, path)).await?);
						}
						Ok(Value::Array(out.into()))
					}
					Part::First => match a.first() {
						Some(v) => stk.run(|stk| v.get(stk, ctx, opt, doc, path.next())).await,
						None => Ok(Value::None),
					},
					Part::Last => match a.last() {
						Some(v) => stk.run(|stk| v.get(stk, ctx, opt, doc, path.next())).await,
						None => Ok(Value::None),
					},
					Part::Index(n) => match a.get(n.as_int().max(0) as usize) {
						Some(v) => stk.run(|stk| v.get(stk, ctx, opt, doc, path.next())).await,
						None => Ok(Value::None),
					},
					Part::Where(cond) => {
						let mut out = Vec::new();
						for v in a.iter() {
							let pseudo = CursorDoc::new(None, v.clone());
							let c =
								stk.run(|stk| cond.compute(stk, ctx, opt, Some(&pseudo))).await?;
							if c.is_truthy() {
								out.push(
									stk.run(|stk| v.get(stk, ctx, opt, doc, path.next())).await?,
								);
							}
						}
						Ok(Value::Array(out.into()))
					}
				},
				Self::Thing(t) => match p {
					Part::Field(f) if f.as_str() == "id" => Ok(Value::Thing(t.clone())),
					_ => Ok(Value::None),
				},
				_ => Ok(Value::None),
			},
		}
	}

	/// Set a value at the given path, creating intermediate objects/arrays
	/// as needed.
	pub fn set(&mut self, path: &[Part], val: Value) -> Result<(), Error> {
		match path.first() {
			None => {
				*self = val;
				Ok(())
			}
			Some(Part::Field(f)) => {
				if !matches!(self, Self::Object(_)) {
					*self = Self::Object(Default::default());
				}
				if let Self::Object(o) = self {
					o.entry(f.to_raw()).or_insert(Value::None).set(path.next(), val)?;
				}
				Ok(())
			}
			Some(Part::Index(n)) => {
				if !matches!(self, Self::Array(_)) {
					*self = Self::Array(Default::default());
				}
				if let Self::Array(a) = self {
					let i = n.as_int().max(0) as usize;
					while a.len() <= i {
						a.push(Value::None);
					}
					a[i].set(path.next(), val)?;
				}
				Ok(())
			}
			Some(Part::All) => {
				if let Self::Array(a) = self {
					for v in a.iter_mut() {
						v.set(path.next(), val.clone())?;
					}
				}
				Ok(())
			}
			Some(_) => Ok(()),
		}
	}

	/// Remove the value at the given path, if present.
	pub fn del(&mut self, path: &[Part]) -> Result<(), Error> {
		match path.first() {
			None => {
				*self = Value::None;
				Ok(())
			}
			Some(Part::Field(f)) => {
				if let Self::Object(o) = self {
					if path.len() == 1 {
						o.shift_remove(f.as_str());
					} else if let Some(v) = o.get_mut(f.as_str()) {
						v.del(path.next())?;
					}
				}
				Ok(())
			}
			Some(Part::Index(n)) => {
				if let Self::Array(a) = self {
					let i = n.as_int().max(0) as usize;
					if path.len() == 1 {
						if i < a.len() {
							a.remove(i);
						}
					} else if let Some(v) = a.get_mut(i) {
						v.del(path.next())?;
					}
				}
				Ok(())
			}
			Some(_) => Ok(()),
		}
	}

	/// Whether a value is present (not void) at the given path.
	pub fn exists(&self, path: &[Part]) -> bool {
		match path.first() {
			None => !self.is_none(),
			Some(Part::Field(f)) => match self {
				Self::Object(o) => {
					o.get(f.as_str()).map(|v| v.exists(path.next())).unwrap_or(false)
				}
				_ => false,
			},
			Some(Part::Index(n)) => match self {
				Self::Array(a) => a
					.get(n.as_int().max(0) as usize)
					.map(|v| v.exists(path.next()))
					.unwrap_or(false),
				_ => false,
			},
			Some(_) => false,
		}
	}

	/// Add `n` to the numeric value at the given path (treating an absent
	/// value as `0`).
	pub fn inc(&mut self, path: &[Part], n: Value) -> Result<(), Error> {
		let cur = self.pick(path);
		let next = match (cur, n) {
			(Value::Number(a), Value::Number(b)) => Value::Number(a + b),
			(Value::None, b) => b,
			(a, _) => a,
		};
		self.set(path, next)
	}

	/// Subtract `n` from the numeric value at the given path.
	pub fn dec(&mut self, path: &[Part], n: Value) -> Result<(), Error> {
		let cur = self.pick(path);
		let next = match (cur, n) {
			(Value::Number(a), Value::Number(b)) => Value::Number(a - b),
			(Value::None, Value::Number(b)) => Value::Number(-b),
			(a, _) => a,
		};
		self.set(path, next)
	}

	/// Set a value at the given path only if it differs from what's
	/// already there — avoids rewriting an unchanged leaf during a
	/// structural merge.
	pub fn iff(&mut self, path: &[Part], val: Value) -> Result<(), Error> {
		if self.pick(path) != val {
			self.set(path, val)?;
		}
		Ok(())
	}

	/// Visit every concrete leaf matching `pattern`, invoking `visitor`
	/// with the leaf's full path, its current value, and whether it
	/// already existed. A `Some` return from the visitor replaces the
	/// leaf in place. A bare `*` segment in `pattern` fans out over every
	/// array element or object field.
	pub fn walk(
		&mut self,
		pattern: &[Part],
		visitor: &mut impl FnMut(&Idiom, &Value, bool) -> Option<Value>,
	) -> Result<(), Error> {
		let mut prefix = Idiom::default();
		self.walk_at(&mut prefix, pattern, visitor)
	}

	fn walk_at(
		&mut self,
		prefix: &mut Idiom,
		pattern: &[Part],
		visitor: &mut impl FnMut(&Idiom, &Value, bool) -> Option<Value>,
	) -> Result<(), Error> {
		match pattern.first() {
			None => {
				let existed = !self.is_none();
				if let Some(next) = visitor(prefix, self, existed) {
					*self = next;
				}
				Ok(())
			}
			Some(Part::Field(f)) => {
				if let Self::Object(o) = self {
					let existed = o.contains_key(f.as_str());
					let mut child = o.get(f.as_str()).cloned().unwrap_or(Value::None);
					prefix.0.push(Part::Field(f.clone()));
					child.walk_at(prefix, pattern.next(), visitor)?;
					prefix.0.pop();
					if existed || !child.is_none() {
						o.insert(f.to_raw(), child);
					}
				}
				Ok(())
			}
			Some(Part::Index(n)) => {
				if let Self::Array(a) = self {
					let i = n.as_int().max(0) as usize;
					if let Some(child) = a.get_mut(i) {
						prefix.0.push(Part::Index(n.clone()));
						child.walk_at(prefix, pattern.next(), visitor)?;
						prefix.0.pop();
					}
				}
				Ok(())
			}
			Some(Part::All) => {
				match self {
					Self::Array(a) => {
						for (i, child) in a.iter_mut().enumerate() {
							prefix.0.push(Part::Index(Number::Int(i as i64)));
							child.walk_at(prefix, pattern.next(), visitor)?;
							prefix.0.pop();
						}
					}
					Self::Object(o) => {
						let keys: Vec<String> = o.keys().cloned().collect();
						for k in keys {
							prefix.0.push(Part::Field(k.clone().into()));
							if let Some(child) = o.get_mut(k.as_str()) {
								child.walk_at(prefix, pattern.next(), visitor)?;
							}
							prefix.0.pop();
						}
					}
					_ => {}
				}
				Ok(())
			}
			Some(_) => Ok(()),
		}
	}

	fn pick(&self, path: &[Part]) -> Value {
		match path.first() {
			None => self.clone(),
			Some(Part::Field(f)) => match self {
				Self::Object(o) => {
					o.get(f.as_str()).map(|v| v.pick(path.next())).unwrap_or(Value::None)
				}
				_ => Value::None,
			},
			Some(Part::Index(n)) => match self {
				Self::Array(a) => a
					.get(n.as_int().max(0) as usize)
					.map(|v| v.pick(path.next()))
					.unwrap_or(Value::None),
				_ => Value::None,
			},
			Some(_) => Value::None,
		}
	}

	/// Cross-type equality per the triad/record/number-string coercion
	/// rules: same-variant values compare structurally; a record id
	/// compares equal to its stringified form; a number compares equal to
	/// a string that parses to it.
	pub fn fuzzy_eq(&self, other: &Value) -> bool {
		if self == other {
			return true;
		}
		match (self, other) {
			(Self::Thing(t), Self::Strand(s)) | (Self::Strand(s), Self::Thing(t)) => {
				t.to_string() == s.as_str()
			}
			(Self::Number(a), Self::Strand(s)) => {
				Number::try_from(s.as_str()).map(|n| *a == n).unwrap_or(false)
			}
			(Self::Strand(s), Self::Number(b)) => {
				Number::try_from(s.as_str()).map(|n| n == *b).unwrap_or(false)
			}
			_ => false,
		}
	}

	fn as_array_for_set_op(&self) -> Array {
		match self {
			Self::Array(a) => a.clone(),
			Self::None | Self::Null | Self::Empty => Array::default(),
			v => Array(vec![v.clone()]),
		}
	}

	/// Apply a binary operator that isn't `AND`/`OR` (those short-circuit in
	/// [`Expression::compute`]): arithmetic, comparison, string matching and
	/// set containment.
	pub fn arithmetic_or_compare(&self, op: &Operator, other: &Value) -> Result<Value, Error> {
		use Operator::*;
		match op {
			Add => self.clone().try_arith(other.clone(), |a, b| a + b),
			Sub => self.clone().try_arith(other.clone(), |a, b| a - b),
			Mul => self.clone().try_arith(other.clone(), |a, b| a * b),
			Div => self.clone().try_arith(other.clone(), |a, b| a / b),
			Rem => self.clone().try_arith(other.clone(), |a, b| a % b),
			Pow => match (self, other) {
				(Self::Number(a), Self::Number(b)) => {
					Ok(Value::Number(Number::Float(a.as_float().powf(b.as_float()))))
				}
				(a, b) => Err(crate::fail!("cannot raise {a} to the power of {b}")),
			},
			Equal => Ok(Value::Bool(self.fuzzy_eq(other))),
			NotEqual => Ok(Value::Bool(!self.fuzzy_eq(other))),
			LessThan => Ok(Value::Bool(self.partial_cmp(other) == Some(Ordering::Less))),
			LessThanOrEqual => Ok(Value::Bool(matches!(
				self.partial_cmp(other),
				Some(Ordering::Less | Ordering::Equal)
			))),
			MoreThan => Ok(Value::Bool(self.partial_cmp(other) == Some(Ordering::Greater))),
			MoreThanOrEqual => Ok(Value::Bool(matches!(
				self.partial_cmp(other),
				Some(Ordering::Greater | Ordering::Equal)
			))),
			Like => Ok(Value::Bool(
				self.as_string().to_lowercase().contains(&other.as_string().to_lowercase()),
			)),
			NotLike => Ok(Value::Bool(
				!self.as_string().to_lowercase().contains(&other.as_string().to_lowercase()),
			)),
			AnyLike => {
				let matcher = SkimMatcherV2::default();
				Ok(Value::Bool(matcher.fuzzy_match(&self.as_string(), &other.as_string()).is_some()))
			}
			Contain => {
				Ok(Value::Bool(self.as_array_for_set_op().iter().any(|v| v.fuzzy_eq(other))))
			}
			NotContain => {
				Ok(Value::Bool(!self.as_array_for_set_op().iter().any(|v| v.fuzzy_eq(other))))
			}
			ContainAll => {
				Ok(Value::Bool(self.as_array_for_set_op().contains_all(&other.as_array_for_set_op())))
			}
			ContainAny => {
				Ok(Value::Bool(self.as_array_for_set_op().contains_any(&other.as_array_for_set_op())))
			}
			ContainNone => {
				Ok(Value::Bool(!self.as_array_for_set_op().contains_any(&other.as_array_for_set_op())))
			}
			Inside => {
				Ok(Value::Bool(other.as_array_for_set_op().iter().any(|v| v.fuzzy_eq(self))))
			}
			NotInside => {
				Ok(Value::Bool(!other.as_array_for_set_op().iter().any(|v| v.fuzzy_eq(self))))
			}
			AllInside => {
				Ok(Value::Bool(self.as_array_for_set_op().all_inside(&other.as_array_for_set_op())))
			}
			AnyInside => {
				Ok(Value::Bool(self.as_array_for_set_op().any_inside(&other.as_array_for_set_op())))
			}
			NoneInside => {
				Ok(Value::Bool(!self.as_array_for_set_op().any_inside(&other.as_array_for_set_op())))
			}
			_ => Err(crate::fail!("unsupported binary operator {op}")),
		}
	}

	fn try_arith(self, other: Value, f: impl Fn(Number, Number) -> Number) -> Result<Value, Error> {
		match (self, other) {
			(Value::Number(a), Value::Number(b)) => Ok(Value::Number(f(a, b))),
			(Value::Strand(a), Value::Strand(b)) => Ok(Value::Strand(format!("{a}{b}").into())),
			(a, b) => Err(crate::fail!("cannot apply an arithmetic operator to {a} and {b}")),
		}
	}
}

impl Display for Value {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		match self {
			Self::None => write!(f, "NONE"),
			Self::Null => write!(f, "NULL"),
			Self::Empty => write!(f, "NONE"),
			Self::Bool(v) => write!(f, "{v}"),
			Self::Number(v) => write!(f, "{v}"),
			Self::Strand(v) => write!(f, "{v}"),
			Self::Duration(v) => write!(f, "{v}"),
			Self::Datetime(v) => write!(f, "{v}"),
			Self::Uuid(v) => write!(f, "{v}"),
			Self::Bytes(v) => write!(f, "{v}"),
			Self::Array(v) => write!(f, "{v}"),
			Self::Object(v) => write!(f, "{v}"),
			Self::Thing(v) => write!(f, "{v}"),
			Self::Table(v) => write!(f, "{v}"),
			Self::Param(v) => write!(f, "{v}"),
			Self::Idiom(v) => write!(f, "{v}"),
			Self::Regex(v) => write!(f, "{v}"),
			Self::Expression(v) => write!(f, "{v}"),
			Self::Subquery(v) => write!(f, "{v}"),
			Self::Mock(v) => write!(f, "{v}"),
		}
	}
}

impl From<Mock> for Value {
	fn from(v: Mock) -> Self {
		Self::Mock(v)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn truthy_triad() {
		assert!(!Value::None.is_truthy());
		assert!(!Value::Null.is_truthy());
		assert!(!Value::Empty.is_truthy());
		assert!(Value::Bool(true).is_truthy());
		assert!(!Value::from(0i64).is_truthy());
		assert!(Value::from(1i64).is_truthy());
	}

	#[test]
	fn record_id_compares_equal_to_its_string() {
		let thing = Value::Thing(Thing::from(("person", crate::sql::id::Id::from("tobie"))));
		let strand = Value::Strand("person:tobie".into());
		assert!(thing.fuzzy_eq(&strand));
	}

	#[test]
	fn get_and_set_roundtrip_through_nested_objects() {
		let mut v = Value::Object(Default::default());
		let path: Idiom = "a.b".into();
		v.set(&path, Value::from(1i64)).unwrap();
		assert!(v.exists(&path));
		assert_eq!(v.pick(&path), Value::from(1i64));
		v.del(&path).unwrap();
		assert!(!v.exists(&path));
	}

	#[test]
	fn array_containment_operators() {
		let a = Value::Array(Array(vec![Value::from(1i64), Value::from(2i64)]));
		let b = Value::Array(Array(vec![Value::from(1i64)]));
		assert_eq!(a.arithmetic_or_compare(&Operator::ContainAll, &b).unwrap(), Value::Bool(true));
		assert_eq!(b.arithmetic_or_compare(&Operator::AllInside, &a).unwrap(), Value::Bool(true));
	}
}
