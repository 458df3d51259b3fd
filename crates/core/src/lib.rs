// crates/core/src/lib.rs
pub mod codec;
pub mod discovery;
pub mod error;
pub mod log_parser;
pub mod paths;
pub mod session_index;
pub mod time_split;

pub use codec::*;
pub use discovery::*;
pub use error::*;
pub use log_parser::*;
pub use session_index::*;
pub use time_split::*;
