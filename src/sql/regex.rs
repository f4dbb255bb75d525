use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::Deref;
use std::str::FromStr;

/// A compiled regular expression value.
#[derive(Clone, Debug)]
pub struct Regex(pub regex::Regex);

impl FromStr for Regex {
	type Err = regex::Error;
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		regex::Regex::new(s).map(Self)
	}
}

impl PartialEq for Regex {
	fn eq(&self, other: &Self) -> bool {
		self.0.as_str() == other.0.as_str()
	}
}

impl Eq for Regex {}

impl PartialOrd for Regex {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		self.0.as_str().partial_cmp(other.0.as_str())
	}
}

impl Deref for Regex {
	type Target = regex::Regex;
	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

impl fmt::Display for Regex {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "/{}/", self.0.as_str())
	}
}

impl Serialize for Regex {
	fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(self.0.as_str())
	}
}

impl<'de> Deserialize<'de> for Regex {
	fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let s = String::deserialize(deserializer)?;
		Regex::from_str(&s).map_err(serde::de::Error::custom)
	}
}
