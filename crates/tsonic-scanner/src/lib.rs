//! Scanner for the Tsonic input language.
//!
//! A hand-written pull scanner over UTF-8 source. The parser drives it one
//! token at a time; template literals use an explicit rescan protocol at the
//! closing `}` of each substitution.

pub mod token;
pub use token::{Token, TokenKind};

mod scanner;
pub use scanner::Scanner;
