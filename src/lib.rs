//! # How a toy program becomes a running stack machine
//!
//! A source text like `mut v: float = 1; v = v + 2.14; return v;` goes
//! through four stages, each consuming the complete output of the one
//! before it. There is no streaming between stages and no shared state
//! across runs.

//! ## Lexing
//!
//! The lexer turns characters into typed tokens — numbers, floats, signs,
//! keywords, identifiers — each carrying its lexeme and source position,
//! and the stream always ends with a single end-of-input token. `1` and
//! `1.` already differ here, and that distinction drives the whole static
//! typing story later.

//! ## Parsing
//!
//! A recursive-descent parser climbs the precedence ladder (values, then
//! `*`/`/`, then `+`/`-`, then `=`) and builds a syntax tree. It also owns
//! the scope map: declarations insert a binding, references resolve
//! against it, and the resolved type is annotated right into the tree.
//!
//! Errors do not unwind the parse. A bad statement becomes an error node
//! carrying a message (and the partial subtree when that helps), and its
//! `none` static type poisons whatever sits above it. The tree can always
//! be dumped as indented pseudo-XML for inspection and golden tests.

//! ## Code generation
//!
//! Every node lowers itself to instructions in post-order, so operands are
//! on the stack before the opcode that needs them. Where a child's type
//! disagrees with its parent's, a `cast` instruction is slotted in — that
//! is all implicit int→float widening amounts to. The result is a flat,
//! branch-free instruction list, fixed before execution starts.

//! ## Execution
//!
//! A minimal stack machine walks the list against an operand stack and a
//! named variable store. `ret` raises the abort flag cleanly; any fault —
//! a write to a `const`, a tag-mismatched move, division by zero, an
//! invalid cast — raises the same flag with a diagnostic and leaves the
//! partial stack state in place for the caller to inspect.

pub mod cli;
mod codegen;
mod error;
mod exprc;
mod lexer;
mod parser;
mod types;
mod vm;

pub use error::{ExprcError, vm::RuntimeError};
pub use exprc::Exprc;
pub use types::{ObjectType, evaluate_type};
pub use vm::value::Object;
