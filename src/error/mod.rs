pub mod lexer;
pub mod vm;

/// ExprcError is the top-level error type for the whole pipeline.
///
/// Parse errors have no variant payload of their own: they live inside the
/// syntax tree as error nodes, and only their count surfaces here after the
/// facade has reported each message.
#[derive(thiserror::Error, Debug)]
pub enum ExprcError {
	/// Internal compiler error, should never happen
	#[error("CompilerInternalError: {0}")]
	InternalError(#[from] anyhow::Error),
	/// Lexical errors encountered during tokenizing
	#[error("Generated {0} lexer errors")]
	LexerErrors(usize),
	/// Parse errors embedded in the syntax tree
	#[error("Generated {0} parser errors")]
	ParserErrors(usize),
	/// Runtime fault raised by the virtual machine
	#[error("Runtime error:\n{0}")]
	RuntimeError(#[from] vm::RuntimeError),
}
