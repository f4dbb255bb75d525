use crate::sql::value::Value;
use revision::revisioned;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::ops::{Deref, DerefMut};

/// An ordered sequence of values.
#[revisioned(revision = 1)]
#[derive(Clone, Debug, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub struct Array(pub Vec<Value>);

impl From<Vec<Value>> for Array {
	fn from(v: Vec<Value>) -> Self {
		Self(v)
	}
}

impl FromIterator<Value> for Array {
	fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
		Self(iter.into_iter().collect())
	}
}

impl IntoIterator for Array {
	type Item = Value;
	type IntoIter = std::vec::IntoIter<Value>;
	fn into_iter(self) -> Self::IntoIter {
		self.0.into_iter()
	}
}

impl Deref for Array {
	type Target = Vec<Value>;
	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

impl DerefMut for Array {
	fn deref_mut(&mut self) -> &mut Self::Target {
		&mut self.0
	}
}

impl Array {
	/// `a ⊆ b`: every element of `self` is present in `other`.
	pub fn all_inside(&self, other: &Array) -> bool {
		self.0.iter().all(|v| other.0.contains(v))
	}

	/// `a ⊂ b`: at least one element of `self` is present in `other`.
	pub fn any_inside(&self, other: &Array) -> bool {
		self.0.iter().any(|v| other.0.contains(v))
	}

	/// `a ⊇ b`: every element of `other` is present in `self`.
	pub fn contains_all(&self, other: &Array) -> bool {
		other.0.iter().all(|v| self.0.contains(v))
	}

	/// `a ⊃ b`: at least one element of `other` is present in `self`.
	pub fn contains_any(&self, other: &Array) -> bool {
		other.0.iter().any(|v| self.0.contains(v))
	}
}

impl Display for Array {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		write!(f, "[")?;
		for (i, v) in self.0.iter().enumerate() {
			if i > 0 {
				write!(f, ", ")?;
			}
			write!(f, "{v}")?;
		}
		write!(f, "]")
	}
}
