use crate::types::ObjectType;

/// Faults the virtual machine can raise while executing a program.
///
/// A fault never unwinds: the VM stores it, raises the abort flag and halts
/// at the next dispatch, leaving whatever partial stack state exists.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum RuntimeError {
	/// A variable reference that has no binding in the store.
	#[error("undefined variable '{0}'")]
	UndefinedVariable(String),
	/// `alloc` over a name that is already bound.
	#[error("variable '{0}' is already defined")]
	Redefinition(String),
	/// `init` on a variable that was already initialized.
	#[error("variable '{0}' is already initialized")]
	Reinitialization(String),
	/// `mov` into a variable declared `const`.
	#[error("variable '{0}' is not mutable")]
	ImmutableMove(String),
	/// `mov` carrying a value whose tag differs from the variable's.
	#[error("cannot move {found} into {expected} variable '{name}'")]
	MoveTypeMismatch {
		name:     String,
		expected: ObjectType,
		found:    ObjectType,
	},
	/// An arithmetic opcode found an operand of the wrong tag.
	#[error("invalid operand for {0}")]
	InvalidOperand(&'static str),
	/// `cast` produced a value no type can represent.
	#[error("invalid cast to {0}")]
	InvalidCast(ObjectType),
	/// Integer or floating division with a zero divisor.
	#[error("division by zero")]
	DivisionByZero,
	/// `push` of the invalid operand sentinel.
	#[error("push of an invalid value")]
	InvalidValue,
	/// The generator emitted unbalanced stack traffic.
	#[error("operand stack underflow")]
	StackUnderflow,
	/// An explicit `abort` instruction.
	#[error("aborted")]
	Aborted,
}
