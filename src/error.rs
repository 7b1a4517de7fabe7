//! Error kinds for the storage engine.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
	#[error("unsupported dictionary version {0}")]
	UnsupportedVersion(i32),

	#[error("unsupported index language {0:?}")]
	UnsupportedLanguage(String),

	#[error("corrupt dictionary: {0}")]
	Corrupt(String),

	#[error(transparent)]
	Io(#[from] std::io::Error),

	#[error("operation attempted on a closed dictionary")]
	Closed,

	#[error("search was cancelled")]
	Cancelled,
}

pub type Result<T> = std::result::Result<T, Error>;
