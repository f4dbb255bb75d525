//! Key encoding: how schema entities and record documents are laid out as
//! byte strings in the key-value store, so a lexicographic range scan over
//! keys visits rows in a useful order (e.g. every row of one table).
//!
//! The teacher generates key structs via an internal `derive::Key` proc
//! macro over a struct of separator bytes and fields; that macro isn't
//! available outside the teacher's own workspace, so the byte composition
//! it would have generated is hand-written here instead, using
//! `storekey::serialize` for the variable-length (string/`Id`) tail of each
//! key so multi-field keys still compare correctly byte-for-byte.
//!
//! Layout (`/` separates segments, `!`/`+`/`*` mark sub-keys):
//!
//! - namespace: `/*{ns}`
//! - database:  `/*{ns}*{db}`
//! - table:     `/*{ns}*{db}*{tb}`
//! - field:     `/*{ns}*{db}*{tb}!fd{fd}`
//! - index def: `/*{ns}*{db}*{tb}!ix{ix}`
//! - event:     `/*{ns}*{db}*{tb}!ev{ev}`
//! - thing:     `/*{ns}*{db}*{tb}*{id}`
//! - index row: `/*{ns}*{db}*{tb}+{ix}*{fd}{id}`
//! - ns/db login: `/*{ns}!lg{name}` / `/*{ns}*{db}!lg{name}`
//! - ns/db token: `/*{ns}!tk{name}` / `/*{ns}*{db}!tk{name}`
//! - scope:       `/*{ns}*{db}!sc{name}`

use crate::err::Error;
use crate::sql::id::Id;

fn push_str(buf: &mut Vec<u8>, s: &str) {
	buf.extend_from_slice(s.as_bytes());
}

pub(crate) fn encode_id(id: &Id) -> Result<Vec<u8>, Error> {
	storekey::serialize(id).map_err(|e| Error::Serialization(e.to_string()))
}

/// `/*{ns}`
pub fn namespace(ns: &str) -> Vec<u8> {
	let mut k = Vec::new();
	k.push(b'/');
	k.push(b'*');
	push_str(&mut k, ns);
	k
}

/// `/*{ns}*{db}`
pub fn database(ns: &str, db: &str) -> Vec<u8> {
	let mut k = namespace(ns);
	k.push(b'*');
	push_str(&mut k, db);
	k
}

/// `/*{ns}*{db}*{tb}`
pub fn table(ns: &str, db: &str, tb: &str) -> Vec<u8> {
	let mut k = database(ns, db);
	k.push(b'*');
	push_str(&mut k, tb);
	k
}

/// The half-open byte range covering every database (and everything nested
/// under it) in `ns` — used by `INFO FOR NAMESPACE` to list its databases.
pub fn namespace_range(ns: &str) -> std::ops::Range<Vec<u8>> {
	let mut start = namespace(ns);
	start.push(b'*');
	start.push(0x00);
	let mut end = namespace(ns);
	end.push(b'*');
	end.push(0xff);
	start..end
}

/// The half-open byte range covering every table (and everything nested
/// under it) in `ns`/`db` — used by `INFO FOR DATABASE` to list its tables.
pub fn database_range(ns: &str, db: &str) -> std::ops::Range<Vec<u8>> {
	let mut start = database(ns, db);
	start.push(b'*');
	start.push(0x00);
	let mut end = database(ns, db);
	end.push(b'*');
	end.push(0xff);
	start..end
}

/// The half-open byte range covering every row of a table.
pub fn table_range(ns: &str, db: &str, tb: &str) -> std::ops::Range<Vec<u8>> {
	let mut start = table(ns, db, tb);
	start.push(b'*');
	start.push(0x00);
	let mut end = table(ns, db, tb);
	end.push(b'*');
	end.push(0xff);
	start..end
}

/// `/*{ns}*{db}*{tb}!fd{fd}` — a field definition.
pub fn field(ns: &str, db: &str, tb: &str, fd: &str) -> Vec<u8> {
	let mut k = table(ns, db, tb);
	push_str(&mut k, "!fd");
	push_str(&mut k, fd);
	k
}

/// `/*{ns}*{db}*{tb}!ix{ix}` — an index definition.
pub fn index_def(ns: &str, db: &str, tb: &str, ix: &str) -> Vec<u8> {
	let mut k = table(ns, db, tb);
	push_str(&mut k, "!ix");
	push_str(&mut k, ix);
	k
}

/// `/*{ns}*{db}*{tb}!ev{ev}` — an event definition.
pub fn event(ns: &str, db: &str, tb: &str, ev: &str) -> Vec<u8> {
	let mut k = table(ns, db, tb);
	push_str(&mut k, "!ev");
	push_str(&mut k, ev);
	k
}

/// `/*{ns}*{db}*{tb}*{id}` — a record document.
pub fn thing(ns: &str, db: &str, tb: &str, id: &Id) -> Result<Vec<u8>, Error> {
	let mut k = table(ns, db, tb);
	k.push(b'*');
	k.extend(encode_id(id)?);
	Ok(k)
}

/// `/*{ns}*{db}*{tb}!ft{ft}` — registers `ft` as a foreign (materialised)
/// table fed by `tb`, so a write to `tb` can find every view that needs
/// recomputing without scanning the whole database for `DEFINE TABLE`s.
pub fn foreign_table(ns: &str, db: &str, tb: &str, ft: &str) -> Vec<u8> {
	let mut k = table(ns, db, tb);
	push_str(&mut k, "!ft");
	push_str(&mut k, ft);
	k
}

/// `/*{ns}!lg{name}` — a namespace-level login (user account).
pub fn login_ns(ns: &str, name: &str) -> Vec<u8> {
	let mut k = namespace(ns);
	push_str(&mut k, "!lg");
	push_str(&mut k, name);
	k
}

/// `/*{ns}*{db}!lg{name}` — a database-level login.
pub fn login_db(ns: &str, db: &str, name: &str) -> Vec<u8> {
	let mut k = database(ns, db);
	push_str(&mut k, "!lg");
	push_str(&mut k, name);
	k
}

/// `/*{ns}!tk{name}` — a namespace-level token.
pub fn token_ns(ns: &str, name: &str) -> Vec<u8> {
	let mut k = namespace(ns);
	push_str(&mut k, "!tk");
	push_str(&mut k, name);
	k
}

/// `/*{ns}*{db}!tk{name}` — a database-level token.
pub fn token_db(ns: &str, db: &str, name: &str) -> Vec<u8> {
	let mut k = database(ns, db);
	push_str(&mut k, "!tk");
	push_str(&mut k, name);
	k
}

/// `/*{ns}*{db}!sc{name}` — a scope (record-access) definition. Scopes are
/// always database-scoped, unlike logins/tokens which may be namespace- or
/// database-level.
pub fn scope(ns: &str, db: &str, name: &str) -> Vec<u8> {
	let mut k = database(ns, db);
	push_str(&mut k, "!sc");
	push_str(&mut k, name);
	k
}

/// The byte range covering every scope defined in `ns`/`db` — used by
/// `INFO FOR DATABASE` and `INFO FOR SCOPE`'s listing.
pub fn scope_range(ns: &str, db: &str) -> std::ops::Range<Vec<u8>> {
	let mut start = database(ns, db);
	push_str(&mut start, "!sc");
	let mut end = database(ns, db);
	push_str(&mut end, "!sd");
	start..end
}

/// The byte range covering every foreign table registered against `tb`.
pub fn foreign_table_range(ns: &str, db: &str, tb: &str) -> std::ops::Range<Vec<u8>> {
	let mut start = table(ns, db, tb);
	push_str(&mut start, "!ft");
	let mut end = table(ns, db, tb);
	push_str(&mut end, "!fu");
	start..end
}

/// The byte range covering every field definition on `tb`.
pub fn field_range(ns: &str, db: &str, tb: &str) -> std::ops::Range<Vec<u8>> {
	let mut start = table(ns, db, tb);
	push_str(&mut start, "!fd");
	let mut end = table(ns, db, tb);
	push_str(&mut end, "!fe");
	start..end
}

/// The byte range covering every index definition on `tb`.
pub fn index_def_range(ns: &str, db: &str, tb: &str) -> std::ops::Range<Vec<u8>> {
	let mut start = table(ns, db, tb);
	push_str(&mut start, "!ix");
	let mut end = table(ns, db, tb);
	push_str(&mut end, "!iy");
	start..end
}

/// The byte range covering every event definition on `tb`.
pub fn event_range(ns: &str, db: &str, tb: &str) -> std::ops::Range<Vec<u8>> {
	let mut start = table(ns, db, tb);
	push_str(&mut start, "!ev");
	let mut end = table(ns, db, tb);
	push_str(&mut end, "!ew");
	start..end
}

/// `/*{ns}*{db}*{tb}+{ix}*{fd}{id}` — one row of a secondary index, keyed
/// by its indexed column values so a unique-constraint check is a single
/// point lookup and a non-unique scan is a range over one `fd` tuple.
pub fn index_row(ns: &str, db: &str, tb: &str, ix: &str, fd: &str, id: &Id) -> Result<Vec<u8>, Error> {
	let mut k = index_row_prefix(ns, db, tb, ix, fd);
	k.extend(encode_id(id)?);
	Ok(k)
}

/// The byte range covering every row of one index column-tuple (`fd`),
/// regardless of record id — used for a non-unique index's duplicate scan.
pub fn index_row_prefix(ns: &str, db: &str, tb: &str, ix: &str, fd: &str) -> Vec<u8> {
	let mut k = table(ns, db, tb);
	push_str(&mut k, "+");
	push_str(&mut k, ix);
	push_str(&mut k, "*");
	push_str(&mut k, fd);
	k
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn thing_keys_for_different_ids_are_distinct() {
		let a = thing("test", "test", "person", &Id::from("one")).unwrap();
		let b = thing("test", "test", "person", &Id::from("two")).unwrap();
		assert_ne!(a, b);
		assert!(a.starts_with(&table("test", "test", "person")));
	}

	#[test]
	fn table_range_brackets_every_thing_key() {
		let range = table_range("test", "test", "person");
		let k = thing("test", "test", "person", &Id::from("one")).unwrap();
		assert!(k >= range.start && k < range.end);
	}

	#[test]
	fn index_row_prefix_brackets_its_rows() {
		let prefix = index_row_prefix("test", "test", "person", "uniq_email", "a@b.com");
		let k = index_row("test", "test", "person", "uniq_email", "a@b.com", &Id::from("one")).unwrap();
		assert!(k.starts_with(&prefix));
	}
}
