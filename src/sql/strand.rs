use revision::revisioned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;

/// A UTF-8 string value.
#[revisioned(revision = 1)]
#[derive(Clone, Debug, Default, Eq, PartialEq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub struct Strand(pub String);

impl From<String> for Strand {
	fn from(v: String) -> Self {
		Self(v)
	}
}

impl From<&str> for Strand {
	fn from(v: &str) -> Self {
		Self(v.to_owned())
	}
}

impl Deref for Strand {
	type Target = str;
	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

impl Strand {
	pub fn as_str(&self) -> &str {
		&self.0
	}

	pub fn into_string(self) -> String {
		self.0
	}
}

impl fmt::Display for Strand {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "{:?}", self.0)
	}
}
