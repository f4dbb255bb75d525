use crate::err::Error;
use crate::sql::value::Value;
use serde::Serialize;
use std::time::Duration;

/// Whether a response carries data that needs live-query bookkeeping.
#[derive(Debug)]
#[non_exhaustive]
pub enum QueryType {
	Other,
	Live,
	Kill,
}

/// The outcome of running one statement from a batch.
#[derive(Debug)]
#[non_exhaustive]
pub struct Response {
	pub time: Duration,
	pub result: Result<Value, Error>,
	pub query_type: QueryType,
}

impl Response {
	pub fn speed(&self) -> String {
		format!("{:?}", self.time)
	}

	pub fn output(self) -> Result<Value, Error> {
		self.result
	}
}

#[derive(Debug, Serialize, PartialEq, Eq)]
#[non_exhaustive]
pub enum Status {
	#[serde(rename = "OK")]
	Ok,
	#[serde(rename = "ERR")]
	Err,
	#[serde(rename = "ERR_DB")]
	ErrDb,
	#[serde(rename = "ERR_PE")]
	ErrPe,
	#[serde(rename = "ERR_EX")]
	ErrEx,
	#[serde(rename = "ERR_FD")]
	ErrFd,
	#[serde(rename = "ERR_IX")]
	ErrIx,
	#[serde(rename = "ERR_TO")]
	ErrTo,
}

impl From<&Error> for Status {
	/// The status code a client sees for this error, per the error-handling
	/// design's trigger/status table.
	fn from(e: &Error) -> Self {
		match e {
			Error::Tx(_) | Error::Io(_) => Status::ErrDb,
			Error::IamError(_) | Error::TablePermissions(_) => Status::ErrPe,
			Error::RecordExists(_) => Status::ErrEx,
			Error::FieldValue {
				..
			} => Status::ErrFd,
			Error::IndexExists {
				..
			} => Status::ErrIx,
			Error::QueryTimedout => Status::ErrTo,
			_ => Status::Err,
		}
	}
}

impl Response {
	pub fn status(&self) -> Status {
		match &self.result {
			Ok(_) => Status::Ok,
			Err(e) => Status::from(e),
		}
	}

	/// The human-readable detail a client sees alongside `status` — empty
	/// for a successful response.
	pub fn detail(&self) -> String {
		match &self.result {
			Ok(_) => String::new(),
			Err(e) => e.to_string(),
		}
	}
}

/// The wire-shaped projection of a [`Response`], mirroring the `status`
/// code described in the error-handling design: `OK` or `ERR*`.
#[derive(Debug, Serialize)]
#[non_exhaustive]
pub struct QueryMethodResponse {
	pub time: String,
	pub status: Status,
	pub detail: String,
	pub result: Value,
}

impl From<&Response> for QueryMethodResponse {
	fn from(res: &Response) -> Self {
		Self {
			time: res.speed(),
			status: res.status(),
			detail: res.detail(),
			result: res.result.as_ref().cloned().unwrap_or_default(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn record_exists_maps_to_err_ex() {
		let r = Response {
			time: Duration::default(),
			result: Err(Error::RecordExists(crate::sql::thing::Thing::from(("t", crate::sql::id::Id::from(1))))),
			query_type: QueryType::Other,
		};
		assert_eq!(r.status(), Status::ErrEx);
		assert!(!r.detail().is_empty());
	}

	#[test]
	fn success_has_ok_status_and_empty_detail() {
		let r = Response {
			time: Duration::default(),
			result: Ok(Value::None),
			query_type: QueryType::Other,
		};
		assert_eq!(r.status(), Status::Ok);
		assert_eq!(r.detail(), "");
	}
}
