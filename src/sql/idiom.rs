use crate::sql::part::Part;
use revision::revisioned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;

/// A dotted path through a document: `a.b[0].c`.
#[revisioned(revision = 1)]
#[derive(Clone, Debug, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Idiom(pub Vec<Part>);

impl From<Vec<Part>> for Idiom {
	fn from(v: Vec<Part>) -> Self {
		Self(v)
	}
}

impl From<&str> for Idiom {
	fn from(v: &str) -> Self {
		Self(v.split('.').map(Part::from).collect())
	}
}

impl From<String> for Idiom {
	fn from(v: String) -> Self {
		Self::from(v.as_str())
	}
}

impl Deref for Idiom {
	type Target = [Part];
	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

impl Idiom {
	pub fn to_dotted(&self) -> String {
		self.to_string()
	}
}

impl fmt::Display for Idiom {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		for (i, p) in self.0.iter().enumerate() {
			if i == 0 {
				if let Part::Field(v) = p {
					write!(f, "{v}")?;
					continue;
				}
			}
			write!(f, "{p}")?;
		}
		Ok(())
	}
}
