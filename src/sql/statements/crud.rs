use crate::sql::cond::Cond;
use crate::sql::data::Data;
use crate::sql::duration::Duration;
use crate::sql::fetch::Fetchs;
use crate::sql::field::Fields;
use crate::sql::group::Groups;
use crate::sql::limit::Limit;
use crate::sql::order::Orders;
use crate::sql::output::Output;
use crate::sql::start::Start;
use crate::sql::value::Value;
use crate::sql::version::Version;
use crate::sql::view::Aggregate;
use revision::revisioned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// `SELECT ... FROM what [WHERE cond] [GROUP BY ...] [ORDER BY ...] [LIMIT
/// n] [START n] [FETCH ...] [VERSION ...]`
#[revisioned(revision = 1)]
#[derive(Clone, Debug, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct SelectStatement {
	/// Plain projected fields: with `group` set, these must all be group
	/// keys (there is no function-call expression in this crate's value
	/// grammar, so an aggregate can't be written as an ordinary projected
	/// field — it is listed separately in `aggregates` instead, the same
	/// structured-data shape a materialised view's `AS SELECT` uses).
	pub expr: Fields,
	pub aggregates: Vec<Aggregate>,
	pub only: bool,
	pub what: Vec<Value>,
	pub cond: Option<Cond>,
	pub group: Option<Groups>,
	pub order: Option<Orders>,
	pub limit: Option<Limit>,
	pub start: Option<Start>,
	pub fetch: Option<Fetchs>,
	pub version: Option<Version>,
	pub timeout: Option<Duration>,
}

impl fmt::Display for SelectStatement {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "SELECT {}", self.expr)?;
		for agg in &self.aggregates {
			write!(f, ", {agg}")?;
		}
		write!(f, " FROM ")?;
		if self.only {
			write!(f, "ONLY ")?;
		}
		for (i, w) in self.what.iter().enumerate() {
			if i > 0 {
				write!(f, ", ")?;
			}
			write!(f, "{w}")?;
		}
		if let Some(v) = &self.cond {
			write!(f, " {v}")?;
		}
		if let Some(group) = &self.group {
			write!(f, " GROUP BY ")?;
			for (i, g) in group.0.iter().enumerate() {
				if i > 0 {
					write!(f, ", ")?;
				}
				write!(f, "{g}")?;
			}
		}
		if let Some(orders) = &self.order {
			write!(f, " ORDER BY ")?;
			for (i, o) in orders.0.iter().enumerate() {
				if i > 0 {
					write!(f, ", ")?;
				}
				write!(f, "{o}")?;
			}
		}
		if let Some(v) = &self.limit {
			write!(f, " {v}")?;
		}
		if let Some(v) = &self.start {
			write!(f, " {v}")?;
		}
		Ok(())
	}
}

/// `CREATE [ONLY] what [data] [RETURN ...] [TIMEOUT ...]`
#[revisioned(revision = 1)]
#[derive(Clone, Debug, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct CreateStatement {
	pub only: bool,
	pub what: Vec<Value>,
	pub data: Option<Data>,
	pub output: Option<Output>,
	pub timeout: Option<Duration>,
}

impl fmt::Display for CreateStatement {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "CREATE ")?;
		if self.only {
			write!(f, "ONLY ")?;
		}
		for (i, w) in self.what.iter().enumerate() {
			if i > 0 {
				write!(f, ", ")?;
			}
			write!(f, "{w}")?;
		}
		if let Some(v) = &self.data {
			write!(f, " {v}")?;
		}
		if let Some(v) = &self.output {
			write!(f, " {v}")?;
		}
		Ok(())
	}
}

/// `UPDATE [ONLY] what [data] [WHERE cond] [RETURN ...] [TIMEOUT ...]`
/// Fails if no matching record exists (use `UPSERT` to create one).
#[revisioned(revision = 1)]
#[derive(Clone, Debug, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct UpdateStatement {
	pub only: bool,
	pub what: Vec<Value>,
	pub data: Option<Data>,
	pub cond: Option<Cond>,
	pub output: Option<Output>,
	pub timeout: Option<Duration>,
}

impl fmt::Display for UpdateStatement {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "UPDATE ")?;
		if self.only {
			write!(f, "ONLY ")?;
		}
		for (i, w) in self.what.iter().enumerate() {
			if i > 0 {
				write!(f, ", ")?;
			}
			write!(f, "{w}")?;
		}
		if let Some(v) = &self.data {
			write!(f, " {v}")?;
		}
		if let Some(v) = &self.cond {
			write!(f, " {v}")?;
		}
		if let Some(v) = &self.output {
			write!(f, " {v}")?;
		}
		Ok(())
	}
}

/// Like `UPDATE`, but creates the record when it doesn't already exist.
#[revisioned(revision = 1)]
#[derive(Clone, Debug, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct UpsertStatement {
	pub only: bool,
	pub what: Vec<Value>,
	pub data: Option<Data>,
	pub cond: Option<Cond>,
	pub output: Option<Output>,
	pub timeout: Option<Duration>,
}

impl fmt::Display for UpsertStatement {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "UPSERT ")?;
		if self.only {
			write!(f, "ONLY ")?;
		}
		for (i, w) in self.what.iter().enumerate() {
			if i > 0 {
				write!(f, ", ")?;
			}
			write!(f, "{w}")?;
		}
		if let Some(v) = &self.data {
			write!(f, " {v}")?;
		}
		if let Some(v) = &self.cond {
			write!(f, " {v}")?;
		}
		if let Some(v) = &self.output {
			write!(f, " {v}")?;
		}
		Ok(())
	}
}

/// `DELETE [ONLY] what [WHERE cond] [RETURN ...] [TIMEOUT ...]`
#[revisioned(revision = 1)]
#[derive(Clone, Debug, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct DeleteStatement {
	pub only: bool,
	pub what: Vec<Value>,
	pub cond: Option<Cond>,
	pub output: Option<Output>,
	pub timeout: Option<Duration>,
}

impl fmt::Display for DeleteStatement {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "DELETE ")?;
		if self.only {
			write!(f, "ONLY ")?;
		}
		for (i, w) in self.what.iter().enumerate() {
			if i > 0 {
				write!(f, ", ")?;
			}
			write!(f, "{w}")?;
		}
		if let Some(v) = &self.cond {
			write!(f, " {v}")?;
		}
		if let Some(v) = &self.output {
			write!(f, " {v}")?;
		}
		Ok(())
	}
}

/// `RELATE from->kind->with [data] [RETURN ...]`
#[revisioned(revision = 1)]
#[derive(Clone, Debug, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct RelateStatement {
	pub only: bool,
	pub from: Value,
	pub kind: Value,
	pub with: Value,
	pub data: Option<Data>,
	pub output: Option<Output>,
}

impl fmt::Display for RelateStatement {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "RELATE {}->{}->{}", self.from, self.kind, self.with)?;
		if let Some(v) = &self.data {
			write!(f, " {v}")?;
		}
		if let Some(v) = &self.output {
			write!(f, " {v}")?;
		}
		Ok(())
	}
}

/// `INSERT [IGNORE] INTO what data [ON DUPLICATE KEY UPDATE update]
/// [RETURN ...]`
#[revisioned(revision = 1)]
#[derive(Clone, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct InsertStatement {
	pub into: Option<Value>,
	pub data: Data,
	pub ignore: bool,
	pub update: Option<Data>,
	pub output: Option<Output>,
}

impl fmt::Display for InsertStatement {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "INSERT ")?;
		if self.ignore {
			write!(f, "IGNORE ")?;
		}
		if let Some(into) = &self.into {
			write!(f, "INTO {into} ")?;
		}
		write!(f, "{}", self.data)?;
		if let Some(update) = &self.update {
			write!(f, " ON DUPLICATE KEY {update}")?;
		}
		if let Some(v) = &self.output {
			write!(f, " {v}")?;
		}
		Ok(())
	}
}
