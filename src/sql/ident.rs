use revision::revisioned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;

/// A plain, unquoted identifier (field name, table name, parameter name).
#[revisioned(revision = 1)]
#[derive(Clone, Debug, Default, Eq, PartialEq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub struct Ident(pub String);

impl From<String> for Ident {
	fn from(v: String) -> Self {
		Self(v)
	}
}

impl From<&str> for Ident {
	fn from(v: &str) -> Self {
		Self(v.to_owned())
	}
}

impl Deref for Ident {
	type Target = str;
	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

impl Ident {
	pub fn as_str(&self) -> &str {
		&self.0
	}

	pub fn to_raw(&self) -> String {
		self.0.clone()
	}
}

impl fmt::Display for Ident {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}
