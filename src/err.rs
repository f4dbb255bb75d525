use crate::iam::Error as IamError;
use crate::sql::idiom::Idiom;
use crate::sql::thing::Thing;
use crate::sql::value::Value;
use std::io;
use thiserror::Error;

/// An error originating from the executor, evaluator, document pipeline or
/// key-value layer.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
	/// A catch-all error for any unhandled case
	#[error("There was a problem with the underlying storage engine: {0}")]
	Tx(String),

	/// The transaction was already cancelled or committed
	#[error("Couldn't update a finished transaction")]
	TxFinished,

	/// The current transaction was made read-only
	#[error("Couldn't write to a read only transaction")]
	TxReadonly,

	/// The conditional value in the request was not equal
	#[error("Value being checked was not correct")]
	TxConditionNotMet,

	/// The key being inserted in the transaction already exists
	#[error("The key being inserted already exists")]
	TxKeyAlreadyExists,

	/// The key exceeds a limit set by the KV store
	#[error("Record id or key is too large")]
	TxKeyTooLarge,

	/// Represents an underlying error with versionstamps
	#[error("Failed to process a versionstamp: {0}")]
	InvalidVersionstamp(String),

	/// Represents a failure in the (de)serialisation of a value
	#[error("Key encoding error: {0}")]
	Serialization(String),

	/// Represents an underlying IO error
	#[error(transparent)]
	Io(#[from] io::Error),

	/// The query timed out before completion
	#[error("The query was not executed because it exceeded the timeout")]
	QueryTimedout,

	/// The query was cancelled by the caller or by a parent context
	#[error("The query was not executed due to a cancelled transaction")]
	QueryCancelled,

	/// A statement could not be executed because a prior statement in the
	/// same sticky transaction failed
	#[error("The query was not executed due to a failed transaction")]
	QueryNotExecuted,

	/// Same as [`Error::QueryNotExecuted`], carrying the failure that
	/// poisoned the sticky transaction for clients that want the detail
	#[error("The query was not executed due to a failed transaction: {message}")]
	QueryNotExecutedDetail {
		message: String,
	},

	/// The sticky transaction behind the current batch has already failed
	/// and cannot be committed
	#[error("The transaction failed and could not be committed")]
	TxFailure,

	/// The specified table can not be written to because it is set to read-only
	#[error("Unable to write to the `{table}` table while it is set to read-only")]
	TableIsView {
		table: String,
	},

	/// Subquery/expression recursion depth exceeded
	#[error("Reached excessive computation depth due to functions, subqueries, or futures")]
	ComputationDepthExceeded,

	/// A field's ASSERT clause evaluated to false
	#[error("Found {value} for field `{field}`, with record `{thing}`, but field must conform to: {check}")]
	FieldValue {
		thing: String,
		value: String,
		field: Idiom,
		check: String,
	},

	/// An INSERT/CREATE was attempted on a key that already exists
	#[error("The record `{0}` already exists")]
	RecordExists(Thing),

	/// A write touched a `READONLY` field on a record that already existed
	#[error("Found changed value for field `{field}`, with record `{thing}`, but field is readonly")]
	FieldReadonly {
		thing: String,
		field: Idiom,
	},

	/// A `SCHEMAFULL` table was written to with a field it doesn't declare
	#[error("Found field `{field}`, but field is not defined on table `{table}`")]
	UndefinedField {
		table: String,
		field: Idiom,
	},

	/// A unique index conflict was detected
	#[error("Database index `{index}` already contains {value}, with record `{thing}`")]
	IndexExists {
		thing: Thing,
		index: String,
		value: String,
	},

	/// A table/scope/namespace/database permission check failed
	#[error("You don't have permission to perform this action")]
	IamError(#[from] IamError),

	/// A table permission denied the current method
	#[error("You don't have permission to {0} this resource")]
	TablePermissions(String),

	/// No namespace has been selected
	#[error("Specify a namespace to use")]
	NsEmpty,

	/// No database has been selected
	#[error("Specify a namespace and database to use")]
	DbEmpty,

	/// Real-time functionality (live queries) is disabled
	#[error("Live queries are not supported on this connection")]
	RealtimeDisabled,

	/// The session used to run this batch has expired
	#[error("This session has expired")]
	ExpiredSession,

	/// The auth context used does not resolve to a valid level
	#[error("Invalid authentication")]
	InvalidAuth,

	/// A LIMIT/START/VERSION clause did not coerce to the expected type
	#[error("Expected a non-negative integer for {kind}, found: {value}")]
	InvalidLimit {
		kind: &'static str,
		value: String,
	},

	/// Something went wrong while processing a record during an iteration
	#[error("A record could not be processed: {0}")]
	DocumentError(String),

	/// Attempted to follow an ident in a context that forbids identifiers
	#[error("Failed to process value, as it refers to a field which cannot be computed")]
	IdentFailed,

	/// The document should be silently skipped by the enclosing step
	///
	/// Never surfaced to a client: used as an internal control-flow signal
	/// between pipeline steps and their callers.
	#[error("Ignoring this document")]
	Ignore,

	/// A generic, unclassified internal failure
	#[error("Internal error: {0}")]
	Internal(String),

	/// A value did not coerce to a field's declared `Kind`
	#[error("Expected a value of type `{into}` but found `{from}`")]
	ConvertTo {
		from: Value,
		into: String,
	},
}

impl From<channel::SendError<crate::dbs::Notification>> for Error {
	fn from(_: channel::SendError<crate::dbs::Notification>) -> Self {
		Error::Internal("live query notification channel closed".into())
	}
}

impl From<Error> for String {
	fn from(e: Error) -> String {
		e.to_string()
	}
}

impl PartialEq for Error {
	fn eq(&self, other: &Self) -> bool {
		self.to_string() == other.to_string()
	}
}

#[doc(hidden)]
#[macro_export]
macro_rules! fail {
	($($arg:tt)*) => {
		$crate::err::Error::Internal(format!($($arg)*))
	};
}
