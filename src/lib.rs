#[macro_use]
extern crate tracing;

#[macro_use]
mod mac;

#[doc(hidden)]
pub mod ctx;
mod doc;
mod fnc;

pub mod sql;

#[doc(hidden)]
pub mod cnf;
#[doc(hidden)]
pub mod dbs;
#[doc(hidden)]
pub mod err;
#[doc(hidden)]
pub mod iam;
#[doc(hidden)]
pub mod key;
#[doc(hidden)]
pub mod kvs;
#[doc(hidden)]
pub mod options;

#[doc(hidden)]
/// Channels for receiving a database export
pub mod channel {
	pub use channel::bounded;
	pub use channel::unbounded;
	pub use channel::Receiver;
	pub use channel::Sender;
}
