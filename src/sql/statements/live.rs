use crate::iam::Auth;
use crate::sql::cond::Cond;
use crate::sql::fetch::Fetchs;
use crate::sql::field::Fields;
use crate::sql::table::Table;
use crate::sql::uuid::Uuid;
use revision::revisioned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// `LIVE SELECT expr FROM what [WHERE cond] [FETCH ...]`
///
/// Registered against the table's live-query list; every subsequent write
/// is diffed and, if it matches, turned into a [`crate::dbs::Notification`].
#[revisioned(revision = 1)]
#[derive(Clone, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct LiveStatement {
	pub id: Uuid,
	/// The connection that registered this subscription. Reused (despite
	/// the field name, inherited from the teacher) to recognise and skip
	/// the owner's own writes instead of echoing them back as notifications.
	pub node: Uuid,
	pub expr: Fields,
	pub what: Table,
	pub cond: Option<Cond>,
	pub fetch: Option<Fetchs>,
	/// `true` for `LIVE SELECT DIFF`: deliver a JSON-patch-shaped diff of
	/// the record instead of its full post-change projection.
	pub diff: bool,
	/// The authenticated session that owns this subscription, captured so
	/// later notifications can be permission-checked as that session
	/// instead of the writer's.
	pub auth: Option<Auth>,
}

impl fmt::Display for LiveStatement {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "LIVE SELECT {} FROM {}", self.expr, self.what)?;
		if let Some(cond) = &self.cond {
			write!(f, " {cond}")?;
		}
		Ok(())
	}
}

/// `KILL id` — unregisters a live query by its id.
#[revisioned(revision = 1)]
#[derive(Clone, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct KillStatement {
	pub id: Value,
}

impl fmt::Display for KillStatement {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "KILL {}", self.id)
	}
}
