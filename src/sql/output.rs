use revision::revisioned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// `RETURN` clause on a data-modifying statement: which document snapshot
/// the response should report.
#[revisioned(revision = 1)]
#[derive(Clone, Debug, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Output {
	#[default]
	None,
	Null,
	Diff,
	After,
	Before,
}

impl fmt::Display for Output {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::None => f.write_str("RETURN NONE"),
			Self::Null => f.write_str("RETURN NULL"),
			Self::Diff => f.write_str("RETURN DIFF"),
			Self::After => f.write_str("RETURN AFTER"),
			Self::Before => f.write_str("RETURN BEFORE"),
		}
	}
}
