//! The virtual machine.
//!
//! A single linear pass over the instruction list against an operand stack
//! and a named variable store. There is no program counter to speak of —
//! the language has no branches — so halting is a flag, not a jump: `ret`
//! raises it cleanly, every fault raises it with a diagnostic, and the
//! dispatch loop stops before the next instruction either way.
//!
//! Faults never unwind and never panic. Whatever partial stack state exists
//! when the flag goes up is left in place, so callers must check
//! [`Vm::aborted`] and [`Vm::take_fault`] rather than assume a result is
//! sitting on the stack.

pub(crate) mod value;

use std::collections::HashMap;

use value::Variable;
pub(crate) use value::Object;

use crate::{
	codegen::{Instruction, Operand},
	error::vm::RuntimeError,
	types::ObjectType,
};

/// Execution context for one program run.
pub(crate) struct Vm {
	/// Operand stack of intermediate values.
	stack:     Vec<Object>,
	/// Named variable store.
	variables: HashMap<String, Variable>,
	/// Once raised, no further instruction executes.
	abort:     bool,
	/// The diagnostic behind an abnormal halt.
	fault:     Option<RuntimeError>,
}

impl Vm {
	pub fn new() -> Self { Self { stack: Vec::new(), variables: HashMap::new(), abort: false, fault: None } }

	/// Run the program to completion or to the abort flag.
	pub fn execute(&mut self, codes: &[Instruction]) {
		for instruction in codes {
			if self.abort {
				break;
			}
			self.step(instruction);
		}
	}

	pub fn aborted(&self) -> bool { self.abort }

	/// Take the fault behind an abnormal halt, if any. A plain `ret` halts
	/// without one.
	pub fn take_fault(&mut self) -> Option<RuntimeError> { self.fault.take() }

	/// Top of the operand stack: the program result after a `ret`.
	pub fn result(&self) -> Option<&Object> { self.stack.last() }

	pub fn stack(&self) -> &[Object] { &self.stack }

	fn step(&mut self, instruction: &Instruction) {
		match instruction {
			Instruction::Push(Operand::Immediate(object)) => {
				// The none sentinel marks a value that never type-checked;
				// it must not reach the stack.
				if object.kind() == ObjectType::None {
					return self.raise(RuntimeError::InvalidValue);
				}
				self.stack.push(object.clone());
			}
			Instruction::Push(Operand::Variable(name)) => match self.variables.get(name) {
				Some(variable) => self.stack.push(variable.value.clone()),
				None => self.raise(RuntimeError::UndefinedVariable(name.clone())),
			},
			Instruction::Pop => {
				self.pop_operand();
			}
			Instruction::Alloc { name, mutable, var_type } => {
				if self.variables.contains_key(name) {
					return self.raise(RuntimeError::Redefinition(name.clone()));
				}
				let variable =
					Variable { mutable: *mutable, initialized: false, value: Object::zeroed(*var_type) };
				self.variables.insert(name.clone(), variable);
			}
			Instruction::Init { name } => {
				let Some(value) = self.pop_operand() else { return };
				let Some(variable) = self.variables.get_mut(name) else {
					return self.raise(RuntimeError::UndefinedVariable(name.clone()));
				};
				if variable.initialized {
					return self.raise(RuntimeError::Reinitialization(name.clone()));
				}
				variable.value = value;
				variable.initialized = true;
			}
			Instruction::Mov { name } | Instruction::Movf { name } => self.mov(name),
			Instruction::Add => self.binary_int("add", |lhs, rhs| Some(lhs.wrapping_add(rhs))),
			Instruction::Sub => self.binary_int("sub", |lhs, rhs| Some(lhs.wrapping_sub(rhs))),
			Instruction::Mul => self.binary_int("mul", |lhs, rhs| Some(lhs.wrapping_mul(rhs))),
			Instruction::Div => {
				self.binary_int("div", |lhs, rhs| if rhs == 0 { None } else { Some(lhs.wrapping_div(rhs)) })
			}
			Instruction::Addf => self.binary_float("addf", |lhs, rhs| Some(lhs + rhs)),
			Instruction::Subf => self.binary_float("subf", |lhs, rhs| Some(lhs - rhs)),
			Instruction::Mulf => self.binary_float("mulf", |lhs, rhs| Some(lhs * rhs)),
			Instruction::Divf => {
				self.binary_float("divf", |lhs, rhs| if rhs == 0.0 { None } else { Some(lhs / rhs) })
			}
			Instruction::Cast(target) => self.cast(*target),
			Instruction::Ret => self.abort = true,
			Instruction::Abort => self.raise(RuntimeError::Aborted),
		}
	}

	/// Pop into a mutable variable. `mov` and `movf` only differ in their
	/// mnemonic; both enforce the same store rules.
	fn mov(&mut self, name: &str) {
		let Some(value) = self.pop_operand() else { return };
		let Some(variable) = self.variables.get_mut(name) else {
			return self.raise(RuntimeError::UndefinedVariable(name.to_string()));
		};
		if !variable.mutable {
			return self.raise(RuntimeError::ImmutableMove(name.to_string()));
		}
		// A variable's tag is pinned by its declaration; a mismatched
		// write faults instead of coercing.
		let expected = variable.value.kind();
		if value.kind() != expected {
			let found = value.kind();
			return self.raise(RuntimeError::MoveTypeMismatch { name: name.to_string(), expected, found });
		}
		variable.value = value;
	}

	fn cast(&mut self, target: ObjectType) {
		let Some(value) = self.pop_operand() else { return };
		match (value, target) {
			(Object::Int(n), ObjectType::Floating) => self.stack.push(Object::Float(n as f64)),
			(Object::Float(n), ObjectType::Integer) => self.stack.push(Object::Int(n as i64)),
			(value, target) if value.kind() == target => self.stack.push(value),
			_ => {
				// The invalid result still lands on the stack; the fault
				// leaves partial state in place.
				self.stack.push(Object::None);
				self.raise(RuntimeError::InvalidCast(target));
			}
		}
	}

	fn binary_int(&mut self, op: &'static str, apply: fn(i64, i64) -> Option<i64>) {
		let Some(rhs) = self.pop_operand() else { return };
		let Some(lhs) = self.pop_operand() else { return };
		let (Object::Int(lhs), Object::Int(rhs)) = (lhs, rhs) else {
			return self.raise(RuntimeError::InvalidOperand(op));
		};
		match apply(lhs, rhs) {
			Some(result) => self.stack.push(Object::Int(result)),
			None => self.raise(RuntimeError::DivisionByZero),
		}
	}

	fn binary_float(&mut self, op: &'static str, apply: fn(f64, f64) -> Option<f64>) {
		let Some(rhs) = self.pop_operand() else { return };
		let Some(lhs) = self.pop_operand() else { return };
		let (Object::Float(lhs), Object::Float(rhs)) = (lhs, rhs) else {
			return self.raise(RuntimeError::InvalidOperand(op));
		};
		match apply(lhs, rhs) {
			Some(result) => self.stack.push(Object::Float(result)),
			None => self.raise(RuntimeError::DivisionByZero),
		}
	}

	/// Pop the top operand. Underflow means the generator emitted
	/// unbalanced stack traffic; it faults instead of panicking.
	fn pop_operand(&mut self) -> Option<Object> {
		let value = self.stack.pop();
		if value.is_none() {
			self.raise(RuntimeError::StackUnderflow);
		}
		value
	}

	/// Record a fault and raise the abort flag; the dispatch loop stops
	/// before the next instruction.
	fn raise(&mut self, error: RuntimeError) {
		self.abort = true;
		self.fault = Some(error);
	}
}

impl Default for Vm {
	fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{codegen::Generator, lexer::Lexer, parser::Parser};

	/// Full pipeline over a source that must parse cleanly.
	fn run(input: &str) -> Vm {
		let mut lexer = Lexer::new(input);
		let tokens = lexer.tokenize().unwrap();
		let mut parser = Parser::new(tokens);
		let root = parser.parse();
		assert!(root.errors().is_empty(), "unexpected parse errors for {input:?}");
		run_codes(&Generator::generate(&root))
	}

	/// Full pipeline, parse errors allowed through to the VM.
	fn run_unchecked(input: &str) -> Vm {
		let mut lexer = Lexer::new(input);
		let tokens = lexer.tokenize().unwrap();
		let mut parser = Parser::new(tokens);
		run_codes(&Generator::generate(&parser.parse()))
	}

	fn run_codes(codes: &[Instruction]) -> Vm {
		let mut vm = Vm::new();
		vm.execute(codes);
		vm
	}

	#[test]
	fn integer_arithmetic() {
		assert_eq!(run("return 1 + 2;").result(), Some(&Object::Int(3)));
		assert_eq!(run("return 2 * 3 + 4;").result(), Some(&Object::Int(10)));
		assert_eq!(run("return 10 - 2 * 3;").result(), Some(&Object::Int(4)));
		assert_eq!(run("return (1 + 2) * 3;").result(), Some(&Object::Int(9)));
		assert_eq!(run("return 7 / 2;").result(), Some(&Object::Int(3)));
	}

	#[test]
	fn widening_to_floating() {
		assert_eq!(run("return 1 + 2.14;").result(), Some(&Object::Float(3.14)));
		assert_eq!(run("return 2.5 * 2;").result(), Some(&Object::Float(5.0)));
	}

	#[test]
	fn variable_round_trip() {
		assert_eq!(run("const v: int = 1; return v + 2;").result(), Some(&Object::Int(3)));
		assert_eq!(run("const v: float = 2.14; return 1 + v;").result(), Some(&Object::Float(3.14)));
	}

	#[test]
	fn mutation() {
		assert_eq!(run("mut v: int = 1; v = 2; return v;").result(), Some(&Object::Int(2)));
		assert_eq!(run("mut a: float = 1; a = a + 1.5; return a;").result(), Some(&Object::Float(2.5)));
	}

	#[test]
	fn assignment_casts_to_declared_type() {
		assert_eq!(run("mut v: float = 0; v = 1; return v;").result(), Some(&Object::Float(1.0)));
		assert_eq!(run("mut v: int = 0; v = 2.14; return v;").result(), Some(&Object::Int(2)));
	}

	#[test]
	fn return_leaves_sole_stack_value() {
		let vm = run("1 + 2; return 5;");
		assert!(vm.aborted());
		assert_eq!(vm.stack(), &[Object::Int(5)]);
	}

	#[test]
	fn program_without_return_leaves_nothing() {
		let mut vm = run("const v: int = 1;");
		assert!(!vm.aborted());
		assert_eq!(vm.result(), None);
		assert_eq!(vm.take_fault(), None);
	}

	#[test]
	fn uninitialized_variable_reads_zero() {
		assert_eq!(run("const v: int; return v;").result(), Some(&Object::Int(0)));
		assert_eq!(run("const v: float; return v;").result(), Some(&Object::Float(0.0)));
	}

	#[test]
	fn division_by_zero_faults() {
		let mut vm = run("return 1 / 0;");
		assert!(vm.aborted());
		assert_eq!(vm.take_fault(), Some(RuntimeError::DivisionByZero));

		let mut vm = run("return 1.5 / 0.0;");
		assert_eq!(vm.take_fault(), Some(RuntimeError::DivisionByZero));
	}

	#[test]
	fn undeclared_identifier_faults_through_cast() {
		// The error node lowers to nothing, but its none type forces the
		// surviving operand through a cast to none.
		let mut vm = run_unchecked("return x + 1;");
		assert!(vm.aborted());
		assert_eq!(vm.take_fault(), Some(RuntimeError::InvalidCast(ObjectType::None)));
	}

	#[test]
	fn redefinition_faults() {
		let alloc = Instruction::Alloc { name: "v".into(), mutable: false, var_type: ObjectType::Integer };
		let mut vm = run_codes(&[alloc.clone(), alloc]);
		assert_eq!(vm.take_fault(), Some(RuntimeError::Redefinition("v".into())));
	}

	#[test]
	fn reinitialization_faults() {
		let mut vm = run_codes(&[
			Instruction::Alloc { name: "v".into(), mutable: false, var_type: ObjectType::Integer },
			Instruction::Push(Operand::Immediate(Object::Int(1))),
			Instruction::Init { name: "v".into() },
			Instruction::Push(Operand::Immediate(Object::Int(2))),
			Instruction::Init { name: "v".into() },
		]);
		assert_eq!(vm.take_fault(), Some(RuntimeError::Reinitialization("v".into())));
	}

	#[test]
	fn move_to_immutable_faults() {
		let mut vm = run_codes(&[
			Instruction::Alloc { name: "v".into(), mutable: false, var_type: ObjectType::Integer },
			Instruction::Push(Operand::Immediate(Object::Int(1))),
			Instruction::Mov { name: "v".into() },
		]);
		assert_eq!(vm.take_fault(), Some(RuntimeError::ImmutableMove("v".into())));
	}

	#[test]
	fn move_with_mismatched_tag_faults() {
		let mut vm = run_codes(&[
			Instruction::Alloc { name: "v".into(), mutable: true, var_type: ObjectType::Integer },
			Instruction::Push(Operand::Immediate(Object::Float(2.5))),
			Instruction::Mov { name: "v".into() },
		]);
		assert_eq!(
			vm.take_fault(),
			Some(RuntimeError::MoveTypeMismatch {
				name:     "v".into(),
				expected: ObjectType::Integer,
				found:    ObjectType::Floating,
			})
		);
	}

	#[test]
	fn invalid_cast_faults_and_leaves_sentinel() {
		let mut vm = run_codes(&[
			Instruction::Push(Operand::Immediate(Object::Int(1))),
			Instruction::Cast(ObjectType::None),
		]);
		assert_eq!(vm.take_fault(), Some(RuntimeError::InvalidCast(ObjectType::None)));
		assert_eq!(vm.result(), Some(&Object::None));
	}

	#[test]
	fn pushing_invalid_sentinel_faults() {
		let mut vm = run_codes(&[Instruction::Push(Operand::Immediate(Object::None))]);
		assert_eq!(vm.take_fault(), Some(RuntimeError::InvalidValue));
		assert_eq!(vm.stack(), &[]);
	}

	#[test]
	fn stack_underflow_faults_instead_of_panicking() {
		let mut vm = run_codes(&[Instruction::Pop]);
		assert_eq!(vm.take_fault(), Some(RuntimeError::StackUnderflow));
	}

	#[test]
	fn abort_halts_before_later_instructions() {
		let mut vm = run_codes(&[Instruction::Abort, Instruction::Push(Operand::Immediate(Object::Int(1)))]);
		assert!(vm.aborted());
		assert_eq!(vm.take_fault(), Some(RuntimeError::Aborted));
		assert_eq!(vm.stack(), &[]);
	}

	#[test]
	fn ret_halts_before_later_instructions() {
		let mut vm = run_codes(&[
			Instruction::Push(Operand::Immediate(Object::Int(1))),
			Instruction::Ret,
			Instruction::Push(Operand::Immediate(Object::Int(2))),
		]);
		assert!(vm.aborted());
		assert_eq!(vm.take_fault(), None);
		assert_eq!(vm.stack(), &[Object::Int(1)]);
	}

	#[test]
	fn cast_truncates_and_widens() {
		let mut vm = run_codes(&[
			Instruction::Push(Operand::Immediate(Object::Float(2.9))),
			Instruction::Cast(ObjectType::Integer),
		]);
		assert_eq!(vm.result(), Some(&Object::Int(2)));
		assert_eq!(vm.take_fault(), None);

		let vm = run_codes(&[
			Instruction::Push(Operand::Immediate(Object::Int(3))),
			Instruction::Cast(ObjectType::Floating),
		]);
		assert_eq!(vm.result(), Some(&Object::Float(3.0)));
	}
}
