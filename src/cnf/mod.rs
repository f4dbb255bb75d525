use once_cell::sync::Lazy;

/// Specifies how many concurrent jobs can be buffered in the worker channel.
#[allow(dead_code)]
pub const MAX_CONCURRENT_TASKS: usize = 64;

/// Specifies the number of workers in the iterator's worker pool.
pub static WORKER_COUNT: Lazy<usize> = lazy_env_parse!("GRAVEL_WORKER_COUNT", usize, 4);

/// Specifies how deep various forms of computation will go before the query fails
/// with [`crate::err::Error::ComputationDepthExceeded`].
///
/// All potentially-recursive code paths (expression evaluation, sub-queries,
/// function calls) count against this limit.
pub static MAX_COMPUTATION_DEPTH: Lazy<u32> =
	lazy_env_parse!("GRAVEL_MAX_COMPUTATION_DEPTH", u32, 120);

/// Specifies the names of parameters which can not be specified in a query.
pub const PROTECTED_PARAM_NAMES: &[&str] = &["access", "auth", "token", "session"];

/// The characters which are supported in generated record ids.
pub const ID_CHARS: [char; 36] = [
	'0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i',
	'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
];

/// Datastore processor batch size for range-scan operations.
pub const PROCESSOR_BATCH_SIZE: u32 = 50;

/// Export statement batch size (number of records per buffered `INSERT`).
pub const EXPORT_BATCH_SIZE: u32 = 100;
