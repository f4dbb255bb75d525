use revision::revisioned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;

/// An arbitrary byte string value.
#[revisioned(revision = 1)]
#[derive(Clone, Debug, Default, Eq, PartialEq, PartialOrd, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub struct Bytes(pub Vec<u8>);

impl From<Vec<u8>> for Bytes {
	fn from(v: Vec<u8>) -> Self {
		Self(v)
	}
}

impl Bytes {
	pub fn into_inner(self) -> Vec<u8> {
		self.0
	}
}

impl Deref for Bytes {
	type Target = [u8];
	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

impl fmt::Display for Bytes {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "b\"")?;
		for b in &self.0 {
			write!(f, "{b:02x}")?;
		}
		write!(f, "\"")
	}
}
