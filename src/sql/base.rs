use revision::revisioned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The authentication/resource scope a statement or auth level applies to.
#[revisioned(revision = 1)]
#[derive(Clone, Debug, Eq, PartialEq, PartialOrd, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Base {
	Root,
	Ns,
	Db,
	/// Legacy scope-qualified base, kept for statements parsed against a
	/// named scope.
	Sc(String),
}

impl fmt::Display for Base {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::Root => write!(f, "ROOT"),
			Self::Ns => write!(f, "NAMESPACE"),
			Self::Db => write!(f, "DATABASE"),
			Self::Sc(v) => write!(f, "SCOPE {v}"),
		}
	}
}
