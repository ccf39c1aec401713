pub mod error;

pub use error::{ErrorCategory, RepoWikiError, Result};
