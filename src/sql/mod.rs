//! The data model and query-language AST: values, paths, expressions and
//! statements. Parsing is out of scope here; this module defines the types
//! that a parser would produce and the executor consumes.

pub mod algorithm;
pub mod array;
pub mod base;
pub mod bytes;
pub mod cond;
pub mod data;
pub mod datetime;
pub mod duration;
pub mod expression;
pub mod fetch;
pub mod field;
pub mod group;
pub mod id;
pub mod ident;
pub mod idiom;
pub mod kind;
pub mod limit;
pub mod mock;
pub mod number;
pub mod object;
pub mod operator;
pub mod order;
pub mod output;
pub mod param;
pub mod part;
pub mod paths;
pub mod permission;
pub mod query;
pub mod regex;
pub mod start;
pub mod statement;
pub mod statements;
pub mod strand;
pub mod subquery;
pub mod table;
pub mod thing;
pub mod uuid;
pub mod value;
pub mod version;
pub mod view;

pub use self::algorithm::Algorithm;
pub use self::array::Array;
pub use self::base::Base;
pub use self::bytes::Bytes;
pub use self::cond::Cond;
pub use self::data::Data;
pub use self::datetime::Datetime;
pub use self::duration::Duration;
pub use self::expression::Expression;
pub use self::fetch::{Fetch, Fetchs};
pub use self::field::{Field, Fields};
pub use self::group::{Group, Groups};
pub use self::id::Id;
pub use self::ident::Ident;
pub use self::idiom::Idiom;
pub use self::kind::Kind;
pub use self::limit::Limit;
pub use self::mock::Mock;
pub use self::number::Number;
pub use self::object::Object;
pub use self::operator::Operator;
pub use self::order::{Order, Orders};
pub use self::output::Output;
pub use self::param::Param;
pub use self::part::Part;
pub use self::permission::{Permission, Permissions};
pub use self::query::Query;
pub use self::regex::Regex;
pub use self::start::Start;
pub use self::statement::Statement;
pub use self::strand::Strand;
pub use self::subquery::Subquery;
pub use self::table::Table;
pub use self::thing::Thing;
pub use self::uuid::Uuid;
pub use self::value::Value;
pub use self::version::Version;
pub use self::view::View;
