use crate::sql::value::Value;
use indexmap::IndexMap;
use revision::revisioned;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::ops::{Deref, DerefMut};

/// An insertion-ordered string-keyed map of values.
///
/// Ordered insertion is required so `CONTENT`/projection output preserves the
/// field order the caller wrote, rather than a lexicographic sort.
#[revisioned(revision = 1)]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Object(pub IndexMap<String, Value>);

impl PartialOrd for Object {
	fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
		let a: Vec<_> = self.0.iter().collect();
		let b: Vec<_> = other.0.iter().collect();
		a.partial_cmp(&b)
	}
}

impl From<IndexMap<String, Value>> for Object {
	fn from(v: IndexMap<String, Value>) -> Self {
		Self(v)
	}
}

impl FromIterator<(String, Value)> for Object {
	fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
		Self(iter.into_iter().collect())
	}
}

impl Deref for Object {
	type Target = IndexMap<String, Value>;
	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

impl DerefMut for Object {
	fn deref_mut(&mut self) -> &mut Self::Target {
		&mut self.0
	}
}

impl Display for Object {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		write!(f, "{{ ")?;
		for (i, (k, v)) in self.0.iter().enumerate() {
			if i > 0 {
				write!(f, ", ")?;
			}
			write!(f, "{k}: {v}")?;
		}
		write!(f, " }}")
	}
}
