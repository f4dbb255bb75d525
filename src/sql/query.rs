use crate::sql::statement::Statement;
use std::fmt::{self, Display, Formatter};
use std::ops::Deref;

/// A parsed batch of statements, as the executor receives it. Turning query
/// text into this form is an external collaborator's job; this type only
/// carries the already-parsed AST.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Query(pub Vec<Statement>);

impl From<Statement> for Query {
	fn from(s: Statement) -> Self {
		Query(vec![s])
	}
}

impl From<Vec<Statement>> for Query {
	fn from(v: Vec<Statement>) -> Self {
		Query(v)
	}
}

impl Deref for Query {
	type Target = Vec<Statement>;
	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

impl IntoIterator for Query {
	type Item = Statement;
	type IntoIter = std::vec::IntoIter<Statement>;
	fn into_iter(self) -> Self::IntoIter {
		self.0.into_iter()
	}
}

impl Display for Query {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		for (i, stm) in self.0.iter().enumerate() {
			if i > 0 {
				writeln!(f, ";")?;
			}
			write!(f, "{stm}")?;
		}
		write!(f, ";")
	}
}
