pub mod crud;
pub mod define;
pub mod ifelse;
pub mod live;
pub mod misc;
pub mod remove;
pub mod run;

pub use self::crud::{
	CreateStatement, DeleteStatement, InsertStatement, RelateStatement, SelectStatement,
	UpdateStatement, UpsertStatement,
};
pub use self::ifelse::IfelseStatement;
pub use self::run::RunStatement;
pub use self::define::{
	DefineDatabaseStatement, DefineEventStatement, DefineFieldStatement, DefineIndexStatement,
	DefineLoginStatement, DefineNamespaceStatement, DefineScopeStatement, DefineStatement,
	DefineTableStatement, DefineTokenStatement,
};
pub use self::live::{KillStatement, LiveStatement};
pub use self::misc::{
	BeginStatement, CancelStatement, CommitStatement, InfoStatement, OptionStatement,
	OutputStatement, SetStatement, UseStatement,
};
pub use self::remove::{
	RemoveDatabaseStatement, RemoveEventStatement, RemoveFieldStatement, RemoveIndexStatement,
	RemoveLoginStatement, RemoveNamespaceStatement, RemoveScopeStatement, RemoveStatement,
	RemoveTableStatement, RemoveTokenStatement,
};
