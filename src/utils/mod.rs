pub mod dates;
pub mod fs_atomic;
pub mod output;
pub mod paths;
pub mod redact;
pub mod suggest;
