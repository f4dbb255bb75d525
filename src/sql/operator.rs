use revision::revisioned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Binary (and some unary) operators recognised by the expression evaluator.
#[revisioned(revision = 1)]
#[derive(Clone, Debug, Eq, PartialEq, PartialOrd, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Operator {
	Neg, // -
	Not, // !

	Or,  // ||
	And, // &&

	Add, // +
	Sub, // -
	Mul, // *
	Div, // /
	Pow, // **
	Rem, // %
	Inc, // +=
	Dec, // -=

	Equal,    // =
	NotEqual, // !=

	Like,    // ~
	NotLike, // !~
	AnyLike, // ?~ fuzzy-any

	LessThan,        // <
	LessThanOrEqual, // <=
	MoreThan,        // >
	MoreThanOrEqual, // >=

	Contain,     // ∋
	NotContain,  // ∌
	ContainAll,  // ⊇
	ContainAny,  // ⊃
	ContainNone, // ⊅
	Inside,      // ∈
	NotInside,   // ∉
	AllInside,   // ⊆
	AnyInside,   // ⊂
	NoneInside,  // ⊄
}

impl Default for Operator {
	fn default() -> Self {
		Self::Equal
	}
}

impl fmt::Display for Operator {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::Neg => f.write_str("-"),
			Self::Not => f.write_str("!"),
			Self::Or => f.write_str("OR"),
			Self::And => f.write_str("AND"),
			Self::Add => f.write_str("+"),
			Self::Sub => f.write_str("-"),
			Self::Mul => f.write_str("*"),
			Self::Div => f.write_str("/"),
			Self::Pow => f.write_str("**"),
			Self::Rem => f.write_str("%"),
			Self::Inc => f.write_str("+="),
			Self::Dec => f.write_str("-="),
			Self::Equal => f.write_str("="),
			Self::NotEqual => f.write_str("!="),
			Self::Like => f.write_str("~"),
			Self::NotLike => f.write_str("!~"),
			Self::AnyLike => f.write_str("?~"),
			Self::LessThan => f.write_str("<"),
			Self::LessThanOrEqual => f.write_str("<="),
			Self::MoreThan => f.write_str(">"),
			Self::MoreThanOrEqual => f.write_str(">="),
			Self::Contain => f.write_str("CONTAINS"),
			Self::NotContain => f.write_str("CONTAINSNOT"),
			Self::ContainAll => f.write_str("CONTAINSALL"),
			Self::ContainAny => f.write_str("CONTAINSANY"),
			Self::ContainNone => f.write_str("CONTAINSNONE"),
			Self::Inside => f.write_str("INSIDE"),
			Self::NotInside => f.write_str("NOTINSIDE"),
			Self::AllInside => f.write_str("ALLINSIDE"),
			Self::AnyInside => f.write_str("ANYINSIDE"),
			Self::NoneInside => f.write_str("NONEINSIDE"),
		}
	}
}
