use crate::ctx::Context;
use crate::dbs::Options;
use crate::doc::CursorDoc;
use crate::err::Error;
use crate::sql::array::Array;
use crate::sql::datetime::Datetime;
use crate::sql::number::Number;
use crate::sql::uuid::Uuid;
use crate::sql::value::Value;
use reblessive::tree::Stk;
use revision::revisioned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// `RUN name(args...)` — invokes one of a fixed set of builtin functions by
/// name and returns its result. Grounded on the teacher's `Function::Normal`
/// dispatch-by-name, but scoped down to a small registry matched directly
/// here: this crate's `Value` carries no `Function` expression variant, so
/// there is nowhere to embed a function call inside another expression —
/// `RUN` is the one place a function by name can be invoked, as its own
/// statement.
#[revisioned(revision = 1)]
#[derive(Clone, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct RunStatement {
	pub name: String,
	pub args: Vec<Value>,
}

impl RunStatement {
	pub(crate) async fn compute(
		&self,
		stk: &mut Stk,
		ctx: &Context,
		opt: &Options,
		doc: Option<&CursorDoc>,
	) -> Result<Value, Error> {
		let mut args = Vec::with_capacity(self.args.len());
		for a in &self.args {
			args.push(stk.run(|stk| a.compute(stk, ctx, opt, doc)).await?);
		}
		dispatch(&self.name, args)
	}
}

fn arity_error(name: &str, expected: usize, got: usize) -> Error {
	Error::Internal(format!(
		"RUN {name}: expected {expected} argument(s), got {got}"
	))
}

fn type_error(name: &str, message: &str) -> Error {
	Error::Internal(format!("RUN {name}: {message}"))
}

fn as_number(name: &str, v: Value) -> Result<Number, Error> {
	v.coerce_to_number().map_err(|v| type_error(name, &format!("expected a number, got `{v}`")))
}

fn as_array(name: &str, v: Value) -> Result<Array, Error> {
	match v {
		Value::Array(a) => Ok(a),
		v => Err(type_error(name, &format!("expected an array, got `{v}`"))),
	}
}

fn numbers(name: &str, array: &Array) -> Result<Vec<Number>, Error> {
	array
		.0
		.iter()
		.cloned()
		.map(|v| as_number(name, v))
		.collect()
}

/// Dispatch a builtin function call by name. Mirrors the shape of the
/// teacher's `fnc::run` match-by-name dispatch, trimmed to the handful of
/// functions this crate implements directly rather than through the
/// teacher's full `fnc::*` module tree (which expects a `Value::Function`
/// expression site this crate doesn't have).
fn dispatch(name: &str, mut args: Vec<Value>) -> Result<Value, Error> {
	use crate::fnc::math;
	match name {
		"math::max" => {
			let a = as_array(name, one(name, args)?)?;
			Ok(math::max(&numbers(name, &a)?).map(Value::from).unwrap_or(Value::None))
		}
		"math::min" => {
			let a = as_array(name, one(name, args)?)?;
			Ok(math::min(&numbers(name, &a)?).map(Value::from).unwrap_or(Value::None))
		}
		"math::sum" => {
			let a = as_array(name, one(name, args)?)?;
			Ok(Value::from(math::sum(&numbers(name, &a)?)))
		}
		"math::mean" => {
			let a = as_array(name, one(name, args)?)?;
			Ok(Value::from(math::mean(&numbers(name, &a)?)))
		}
		"count" => {
			if args.is_empty() {
				return Ok(Value::from(1));
			}
			let a = as_array(name, one(name, args)?)?;
			Ok(Value::from(a.len() as i64))
		}
		"array::len" => {
			let a = as_array(name, one(name, args)?)?;
			Ok(Value::from(a.len() as i64))
		}
		"array::first" => {
			let a = as_array(name, one(name, args)?)?;
			Ok(a.0.into_iter().next().unwrap_or(Value::None))
		}
		"array::last" => {
			let a = as_array(name, one(name, args)?)?;
			Ok(a.0.into_iter().next_back().unwrap_or(Value::None))
		}
		"string::len" => {
			let s = one(name, args)?.as_string();
			Ok(Value::from(s.chars().count() as i64))
		}
		"string::uppercase" => Ok(Value::from(one(name, args)?.as_string().to_uppercase())),
		"string::lowercase" => Ok(Value::from(one(name, args)?.as_string().to_lowercase())),
		"string::concat" => {
			Ok(Value::from(args.into_iter().map(|v| v.as_string()).collect::<Vec<_>>().concat()))
		}
		"string::reverse" => Ok(Value::from(one(name, args)?.as_string().chars().rev().collect::<String>())),
		"type::bool" => one(name, args)?.coerce_to_bool().map(Value::from).map_err(|v| {
			type_error(name, &format!("`{v}` cannot be converted to a bool"))
		}),
		"type::int" => one(name, args)?.coerce_to_int().map(Value::from).map_err(|v| {
			type_error(name, &format!("`{v}` cannot be converted to an int"))
		}),
		"type::string" => Ok(Value::from(one(name, args)?.as_string())),
		"rand::bool" => Ok(Value::from(rand::random::<bool>())),
		"rand::uuid" => Ok(Value::from(Uuid::from(uuid::Uuid::new_v4()))),
		"time::now" => Ok(Value::from(Datetime::from(chrono::Utc::now()))),
		_ => {
			let _ = &mut args;
			Err(Error::Internal(format!("RUN: unknown function `{name}`")))
		}
	}
}

fn one(name: &str, mut args: Vec<Value>) -> Result<Value, Error> {
	if args.len() != 1 {
		return Err(arity_error(name, 1, args.len()));
	}
	Ok(args.remove(0))
}

impl fmt::Display for RunStatement {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "RUN {}(", self.name)?;
		for (i, a) in self.args.iter().enumerate() {
			if i > 0 {
				write!(f, ", ")?;
			}
			write!(f, "{a}")?;
		}
		write!(f, ")")
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn math_sum_adds_array_elements() {
		let args = vec![Value::Array(Array::from(vec![Value::from(1), Value::from(2), Value::from(3)]))];
		let result = dispatch("math::sum", args).unwrap();
		assert_eq!(result, Value::from(6));
	}

	#[test]
	fn unknown_function_errors() {
		assert!(dispatch("nonexistent::fn", vec![]).is_err());
	}

	#[test]
	fn array_len_counts_elements() {
		let args = vec![Value::Array(Array::from(vec![Value::from(1), Value::from(2)]))];
		let result = dispatch("array::len", args).unwrap();
		assert_eq!(result, Value::from(2));
	}
}
