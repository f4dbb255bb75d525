use crate::sql::cond::Cond;
use crate::sql::value::Value;
use crate::sql::statements::{
	BeginStatement, CancelStatement, CommitStatement, CreateStatement, DefineStatement,
	DeleteStatement, IfelseStatement, InfoStatement, InsertStatement, KillStatement,
	LiveStatement, OptionStatement, OutputStatement, RelateStatement, RemoveStatement,
	RunStatement, SelectStatement, SetStatement, UpdateStatement, UpsertStatement, UseStatement,
};
use revision::revisioned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Any statement the executor can run. Parsing produces these; the
/// executor's per-statement dispatch and `dbs::execute_statement` (used by
/// subqueries) both switch on this enum.
#[revisioned(revision = 1)]
#[derive(Clone, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Statement {
	Use(UseStatement),
	Set(SetStatement),
	Output(OutputStatement),
	Info(InfoStatement),
	Select(SelectStatement),
	Create(CreateStatement),
	Update(UpdateStatement),
	Upsert(UpsertStatement),
	Delete(DeleteStatement),
	Relate(RelateStatement),
	Insert(InsertStatement),
	Define(DefineStatement),
	Remove(RemoveStatement),
	Live(LiveStatement),
	Kill(KillStatement),
	Begin(BeginStatement),
	Commit(CommitStatement),
	Cancel(CancelStatement),
	Option(OptionStatement),
	Run(RunStatement),
	Ifelse(IfelseStatement),
}

impl Statement {
	/// Whether running this statement requires a writable transaction.
	pub fn writeable(&self) -> bool {
		match self {
			Self::Select(v) => v.what.iter().any(|w| w.writeable()),
			Self::Create(_)
			| Self::Update(_)
			| Self::Upsert(_)
			| Self::Delete(_)
			| Self::Relate(_)
			| Self::Insert(_)
			| Self::Define(_)
			| Self::Remove(_) => true,
			Self::Set(v) => v.what.writeable(),
			Self::Output(v) => v.what.writeable(),
			Self::Run(v) => v.args.iter().any(Value::writeable),
			Self::Ifelse(v) => v.writeable(),
			_ => false,
		}
	}

	/// Whether this statement removes records (used to decide whether a
	/// document should be purged rather than re-stored).
	pub fn is_delete(&self) -> bool {
		matches!(self, Self::Delete(_))
	}

	/// The statement's `WHERE` clause, if it has one.
	pub fn conds(&self) -> Option<&Cond> {
		match self {
			Self::Select(v) => v.cond.as_ref(),
			Self::Update(v) => v.cond.as_ref(),
			Self::Upsert(v) => v.cond.as_ref(),
			Self::Delete(v) => v.cond.as_ref(),
			_ => None,
		}
	}
}

impl fmt::Display for Statement {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::Use(v) => write!(f, "{v}"),
			Self::Set(v) => write!(f, "{v}"),
			Self::Output(v) => write!(f, "{v}"),
			Self::Info(v) => write!(f, "{v}"),
			Self::Select(v) => write!(f, "{v}"),
			Self::Create(v) => write!(f, "{v}"),
			Self::Update(v) => write!(f, "{v}"),
			Self::Upsert(v) => write!(f, "{v}"),
			Self::Delete(v) => write!(f, "{v}"),
			Self::Relate(v) => write!(f, "{v}"),
			Self::Insert(v) => write!(f, "{v}"),
			Self::Define(v) => write!(f, "{v}"),
			Self::Remove(v) => write!(f, "{v}"),
			Self::Live(v) => write!(f, "{v}"),
			Self::Kill(v) => write!(f, "{v}"),
			Self::Begin(v) => write!(f, "{v}"),
			Self::Commit(v) => write!(f, "{v}"),
			Self::Cancel(v) => write!(f, "{v}"),
			Self::Option(v) => write!(f, "{v}"),
			Self::Run(v) => write!(f, "{v}"),
			Self::Ifelse(v) => write!(f, "{v}"),
		}
	}
}
