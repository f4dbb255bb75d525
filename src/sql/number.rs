use revision::revisioned;
use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::{self, Display, Formatter};
use std::ops::{Add, Div, Mul, Neg, Rem, Sub};
use std::str::FromStr;

/// A numeric value: integer, float, or exact decimal.
#[revisioned(revision = 1)]
#[derive(Clone, Copy, Serialize, Deserialize, Debug)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[non_exhaustive]
pub enum Number {
	Int(i64),
	Float(f64),
	Decimal(Decimal),
}

impl Default for Number {
	fn default() -> Self {
		Self::Int(0)
	}
}

macro_rules! from_prim_ints {
	($($int:ty),*) => {
		$(impl From<$int> for Number {
			fn from(i: $int) -> Self {
				Self::Int(i as i64)
			}
		})*
	};
}

from_prim_ints!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl From<f32> for Number {
	fn from(f: f32) -> Self {
		Self::Float(f as f64)
	}
}

impl From<f64> for Number {
	fn from(f: f64) -> Self {
		Self::Float(f)
	}
}

impl From<Decimal> for Number {
	fn from(v: Decimal) -> Self {
		Self::Decimal(v)
	}
}

impl FromStr for Number {
	type Err = ();
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::try_from(s)
	}
}

impl TryFrom<&str> for Number {
	type Error = ();
	fn try_from(v: &str) -> Result<Self, Self::Error> {
		match v.parse::<i64>() {
			Ok(v) => Ok(Self::Int(v)),
			_ => match f64::from_str(v) {
				Ok(v) => Ok(Self::Float(v)),
				_ => Err(()),
			},
		}
	}
}

impl Number {
	pub fn is_zero(&self) -> bool {
		match self {
			Self::Int(v) => *v == 0,
			Self::Float(v) => *v == 0.0,
			Self::Decimal(v) => v.is_zero(),
		}
	}

	pub fn is_truthy(&self) -> bool {
		!self.is_zero()
	}

	pub fn as_int(&self) -> i64 {
		match self {
			Self::Int(v) => *v,
			Self::Float(v) => *v as i64,
			Self::Decimal(v) => v.to_i64().unwrap_or_default(),
		}
	}

	pub fn as_float(&self) -> f64 {
		match self {
			Self::Int(v) => *v as f64,
			Self::Float(v) => *v,
			Self::Decimal(v) => v.to_f64().unwrap_or_default(),
		}
	}

	pub fn as_decimal(&self) -> Decimal {
		match self {
			Self::Int(v) => Decimal::from(*v),
			Self::Float(v) => Decimal::from_f64(*v).unwrap_or_default(),
			Self::Decimal(v) => *v,
		}
	}
}

impl PartialEq for Number {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Self::Int(a), Self::Int(b)) => a == b,
			(Self::Float(a), Self::Float(b)) => a == b,
			(Self::Decimal(a), Self::Decimal(b)) => a == b,
			_ => self.as_decimal() == other.as_decimal(),
		}
	}
}

impl PartialOrd for Number {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		match (self, other) {
			(Self::Int(a), Self::Int(b)) => a.partial_cmp(b),
			(Self::Float(a), Self::Float(b)) => a.partial_cmp(b),
			_ => self.as_decimal().partial_cmp(&other.as_decimal()),
		}
	}
}

impl Display for Number {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		match self {
			Self::Int(v) => Display::fmt(v, f),
			Self::Float(v) => {
				if v.is_finite() {
					write!(f, "{v}f")
				} else {
					Display::fmt(v, f)
				}
			}
			Self::Decimal(v) => write!(f, "{v}dec"),
		}
	}
}

impl Add for Number {
	type Output = Number;
	fn add(self, other: Self) -> Self {
		match (self, other) {
			(Self::Int(a), Self::Int(b)) => Self::Int(a.wrapping_add(b)),
			(Self::Decimal(a), Self::Decimal(b)) => Self::Decimal(a + b),
			(a, b) => Self::Float(a.as_float() + b.as_float()),
		}
	}
}

impl Sub for Number {
	type Output = Number;
	fn sub(self, other: Self) -> Self {
		match (self, other) {
			(Self::Int(a), Self::Int(b)) => Self::Int(a.wrapping_sub(b)),
			(Self::Decimal(a), Self::Decimal(b)) => Self::Decimal(a - b),
			(a, b) => Self::Float(a.as_float() - b.as_float()),
		}
	}
}

impl Mul for Number {
	type Output = Number;
	fn mul(self, other: Self) -> Self {
		match (self, other) {
			(Self::Int(a), Self::Int(b)) => Self::Int(a.wrapping_mul(b)),
			(Self::Decimal(a), Self::Decimal(b)) => Self::Decimal(a * b),
			(a, b) => Self::Float(a.as_float() * b.as_float()),
		}
	}
}

impl Div for Number {
	type Output = Number;
	fn div(self, other: Self) -> Self {
		if other.is_zero() {
			return Self::Float(f64::NAN);
		}
		match (self, other) {
			(Self::Decimal(a), Self::Decimal(b)) => Self::Decimal(a / b),
			(a, b) => Self::Float(a.as_float() / b.as_float()),
		}
	}
}

impl Rem for Number {
	type Output = Number;
	fn rem(self, other: Self) -> Self {
		match (self, other) {
			(Self::Int(a), Self::Int(b)) if b != 0 => Self::Int(a % b),
			(a, b) => Self::Float(a.as_float() % b.as_float()),
		}
	}
}

impl Neg for Number {
	type Output = Number;
	fn neg(self) -> Self {
		match self {
			Self::Int(v) => Self::Int(-v),
			Self::Float(v) => Self::Float(-v),
			Self::Decimal(v) => Self::Decimal(-v),
		}
	}
}
