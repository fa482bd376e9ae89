//! The static type lattice.
//!
//! Four members: `none`, `integer`, `floating` and `string`. `none` is the
//! bottom element — it marks a value that never resolved to a real type
//! (an undeclared identifier, a failed unification) and it swallows every
//! type it is combined with, which is how a single bad leaf poisons the
//! whole expression above it.
//!
//! [`evaluate_type`] is the only unification rule in the compiler. Both the
//! parser (assignment compatibility) and the syntax tree (operator result
//! types) go through it, so widening behaves identically everywhere.

use std::fmt::Display;

/// Static type of a value, and the tag index of its runtime counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectType {
	/// No valid type. Propagates through every unification.
	None,
	/// 64-bit signed integer.
	Integer,
	/// 64-bit floating point.
	Floating,
	/// Character string. No literal syntax produces one yet; the lattice
	/// still has to reject it against the numeric types.
	String,
}

impl Display for ObjectType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			ObjectType::None => write!(f, "none"),
			ObjectType::Integer => write!(f, "integer"),
			ObjectType::Floating => write!(f, "floating"),
			ObjectType::String => write!(f, "string"),
		}
	}
}

/// Unify the types of two operands.
///
/// Identical types unify to themselves, `none` absorbs everything, and a
/// mixed integer/floating pair widens to floating. Every other combination
/// has no common type and yields `none`.
pub fn evaluate_type(lhs: ObjectType, rhs: ObjectType) -> ObjectType {
	use ObjectType::*;

	if lhs == rhs {
		return lhs;
	}
	if lhs == None || rhs == None {
		return None;
	}
	if matches!((lhs, rhs), (Integer, Floating) | (Floating, Integer)) {
		return Floating;
	}
	None
}
