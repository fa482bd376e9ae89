use crate::lexer::CodePoint;

/// Lexer related errors
#[derive(thiserror::Error, Debug)]
pub(crate) enum LexerError {
	/// Internal compiler error, should never happen
	#[error("{0}")]
	InternalError(#[from] anyhow::Error),
	/// Errors encountered while scanning the source
	#[error(transparent)]
	LexError(#[from] LexError),
}

/// A specific lexical error with its source position.
#[derive(thiserror::Error, Debug)]
#[error("line {line}, col {col}: {type}")]
pub struct LexError {
	/// The line number where the error occurred.
	line:   usize,
	/// The column where the error occurred.
	col:    usize,
	/// The kind of lexical error.
	r#type: LexErrorType,
}

impl LexError {
	pub(crate) fn new(point: CodePoint, r#type: LexErrorType) -> Self {
		Self { line: point.line, col: point.col, r#type }
	}
}

/// Kinds of lexical errors.
#[derive(Debug)]
pub enum LexErrorType {
	/// A character no recognizer accepts.
	UnexpectedCharacter(char),
}

impl std::fmt::Display for LexErrorType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		use LexErrorType::*;
		match self {
			UnexpectedCharacter(c) => {
				write!(f, "Unexpected character '{c}'")
			}
		}
	}
}
