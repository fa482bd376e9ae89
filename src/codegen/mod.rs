//! Code generation: syntax tree to a flat instruction list.
//!
//! Each node lowers in post-order — operands first, then the opcode that
//! consumes them — so the operand stack lines up by construction. Wherever
//! a child's static type differs from the type its parent computes in, a
//! `cast` is slotted in between; that is the entire implementation of
//! implicit widening.
//!
//! Generation always succeeds, even over a tree holding error nodes: an
//! error node lowers to nothing, its `none` static type forces a cast to
//! `none` around whatever surrounds it, and executing that cast is what
//! finally aborts the program. The returned list is fixed once generation
//! finishes; nothing appends to or rewrites it during execution.

pub(crate) mod instruction;

pub(crate) use instruction::{Instruction, Operand};

use crate::{
	lexer::{Token, TokenType},
	parser::AstNode,
	types::{ObjectType, evaluate_type},
	vm::value::Object,
};

/// Lowers a syntax tree onto a shared instruction list.
pub(crate) struct Generator {
	codes: Vec<Instruction>,
}

impl Generator {
	/// Lower the whole tree.
	pub fn generate(root: &AstNode<'_>) -> Vec<Instruction> {
		let mut generator = Self { codes: Vec::new() };
		generator.encode(root);
		generator.codes
	}

	fn encode(&mut self, node: &AstNode<'_>) {
		match node {
			AstNode::Error { .. } => {}
			AstNode::Value { token, .. } => self.encode_value(node, token),
			AstNode::Parenthess(expr) => self.encode(expr),
			AstNode::BinOp { op, lhs, rhs } => self.encode_bin_op(op, lhs, rhs),
			AstNode::ExprStmt(expr) => {
				self.encode(expr);
				self.codes.push(Instruction::Pop);
			}
			AstNode::VarDefine { modifier, name, initial_value, .. } => {
				self.codes.push(Instruction::Alloc {
					name:     name.text.to_string(),
					mutable:  modifier.r#type == TokenType::Mut,
					var_type: node.static_type(),
				});
				if let Some(init) = initial_value {
					self.encode(init);
					if init.static_type() != node.static_type() {
						self.codes.push(Instruction::Cast(node.static_type()));
					}
					self.codes.push(Instruction::Init { name: name.text.to_string() });
				}
			}
			AstNode::Return(expr) => {
				self.encode(expr);
				self.codes.push(Instruction::Ret);
			}
			AstNode::Block { nodes, .. } => {
				for node in nodes {
					self.encode(node);
				}
			}
		}
	}

	/// Lower a value node: identifiers push a variable reference, literals
	/// are folded into immediates here, at generation time.
	fn encode_value(&mut self, node: &AstNode<'_>, token: &Token<'_>) {
		if token.r#type == TokenType::Identifier {
			self.codes.push(Instruction::Push(Operand::Variable(token.text.to_string())));
			return;
		}
		let object = match node.static_type() {
			ObjectType::Integer => token.text.parse::<i64>().map(Object::Int).ok(),
			ObjectType::Floating => token.text.parse::<f64>().map(Object::Float).ok(),
			// A value that never resolved to a type pushes the invalid
			// sentinel; the VM halts on it.
			_ => Some(Object::None),
		};
		match object {
			Some(object) => self.codes.push(Instruction::Push(Operand::Immediate(object))),
			// A literal the runtime representation cannot hold folds to an
			// explicit abort.
			None => self.codes.push(Instruction::Abort),
		}
	}

	fn encode_bin_op(&mut self, op: &Token<'_>, lhs: &AstNode<'_>, rhs: &AstNode<'_>) {
		let node_type = evaluate_type(lhs.static_type(), rhs.static_type());
		self.encode(lhs);
		if lhs.static_type() != node_type {
			self.codes.push(Instruction::Cast(node_type));
		}
		self.encode(rhs);
		if rhs.static_type() != node_type {
			self.codes.push(Instruction::Cast(node_type));
		}

		if op.r#type == TokenType::Equal {
			// The assignment target's own push stays on the stack; the
			// surrounding expression statement's pop consumes it.
			let lhs_type = lhs.static_type();
			if lhs_type != rhs.static_type() && evaluate_type(lhs_type, rhs.static_type()) != ObjectType::None
			{
				self.codes.push(Instruction::Cast(lhs_type));
			}
			let AstNode::Value { token, .. } = lhs else { return };
			let name = token.text.to_string();
			match lhs_type {
				ObjectType::Integer => self.codes.push(Instruction::Mov { name }),
				ObjectType::Floating => self.codes.push(Instruction::Movf { name }),
				_ => {}
			}
			return;
		}

		let instruction = match (node_type, op.r#type) {
			(ObjectType::Integer, TokenType::Plus) => Instruction::Add,
			(ObjectType::Integer, TokenType::Minus) => Instruction::Sub,
			(ObjectType::Integer, TokenType::Star) => Instruction::Mul,
			(ObjectType::Integer, TokenType::Slash) => Instruction::Div,
			(ObjectType::Floating, TokenType::Plus) => Instruction::Addf,
			(ObjectType::Floating, TokenType::Minus) => Instruction::Subf,
			(ObjectType::Floating, TokenType::Star) => Instruction::Mulf,
			(ObjectType::Floating, TokenType::Slash) => Instruction::Divf,
			// A none-typed operator has nothing to compute.
			_ => return,
		};
		self.codes.push(instruction);
	}
}
