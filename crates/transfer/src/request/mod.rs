//! Decoding of `rsync --server ...` command lines.
//!
//! An rsync client reaching us over SSH asks the remote shell to run
//! something like `rsync --server --sender -logDtpre.iLsfxC . module/file`.
//! [`RequestParser`] turns the split command line into a [`RequestData`]:
//! the option set, the requested paths and the `-e` protocol token.

mod data;
mod error;
mod option;
mod parser;


pub use data::{ProtocolToken, RequestData};
pub use error::{ArgsParseError, ArgsParseReason};
pub use option::RsyncOption;
pub use parser::RequestParser;
