use crate::sql::{Object, Uuid, Value};
use revision::revisioned;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// Which write caused a live query match.
#[revisioned(revision = 1)]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
#[non_exhaustive]
pub enum Action {
	Create,
	Update,
	Delete,
}

impl Display for Action {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::Create => write!(f, "CREATE"),
			Self::Update => write!(f, "UPDATE"),
			Self::Delete => write!(f, "DELETE"),
		}
	}
}

/// A single message delivered to a `LIVE SELECT` subscriber: the live
/// query it matched, what kind of write triggered it, and the resulting
/// document snapshot.
#[revisioned(revision = 1)]
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[non_exhaustive]
pub struct Notification {
	pub id: Uuid,
	pub action: Action,
	pub result: Value,
}

impl Display for Notification {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		let obj: Object = [
			("id".to_string(), self.id.to_string().into()),
			("action".to_string(), self.action.to_string().into()),
			("result".to_string(), self.result.clone()),
		]
		.into_iter()
		.collect();
		write!(f, "{obj}")
	}
}

impl Notification {
	pub fn new(id: Uuid, action: Action, result: Value) -> Self {
		Self {
			id,
			action,
			result,
		}
	}
}
