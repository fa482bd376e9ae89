//! Recursive-descent parser: tokens to an annotated syntax tree.
//!
//! Precedence is encoded in the call chain, one function per level,
//! tightest binding at the bottom:
//!
//! ``` BNF
//! value    → "(" add_sub ")" | IDENTIFIER | NUMBER | FLOATING ;
//! mul_div  → value ( ( "*" | "/" ) value )* ;
//! add_sub  → mul_div ( ( "+" | "-" ) mul_div )* ;
//! assign   → add_sub ( "=" add_sub )* ;
//! define   → ( "const" | "mut" ) IDENTIFIER ":" ( "int" | "float" ) ( ";" | "=" add_sub ";" ) ;
//! stmt     → define | "return" add_sub ";" | assign ";" ;
//! program  → stmt* EOF ;
//! ```
//!
//! The parser owns the compile-time scope map: a declaration inserts its
//! binding, every identifier reference resolves against it, and nothing is
//! ever removed — the language has one flat global scope.
//!
//! Failure never unwinds. A malformed statement becomes an error node in
//! the tree and parsing moves on; the top-level loop only gives up when a
//! statement consumes no tokens at all, wrapping whatever block it has
//! accumulated in a final error node.

pub(crate) mod ast;

use std::collections::HashMap;

use TokenType::*;
pub(crate) use ast::AstNode;

use crate::{
	lexer::{Token, TokenType},
	types::{ObjectType, evaluate_type},
};

/// A compile-time variable binding: declared mutability and type.
#[derive(Debug, Clone, Copy)]
struct Binding {
	mutable:  bool,
	var_type: ObjectType,
}

/// Parser over one token stream.
pub(crate) struct Parser<'a> {
	/// The tokens to parse, terminated by an `Eof` token.
	tokens: Vec<Token<'a>>,
	/// Index of the token being considered. Never moves past `Eof`.
	cursor: usize,
	/// Scope map of declared variables, consulted on every reference.
	scope:  HashMap<&'a str, Binding>,
}

impl<'a> Parser<'a> {
	pub fn new(tokens: Vec<Token<'a>>) -> Self { Self { tokens, cursor: 0, scope: HashMap::new() } }

	/// Parse the whole stream into a `global` block.
	///
	/// Statements that fail still land in the block as error nodes; the
	/// loop stops early only when a statement makes no forward progress.
	pub fn parse(&mut self) -> AstNode<'a> {
		let mut nodes = Vec::new();
		while self.peek().r#type != Eof {
			let before = self.cursor;
			let node = self.statement();
			nodes.push(node);
			if self.cursor == before {
				let block = AstNode::Block { name: "global".into(), nodes };
				return AstNode::error_with("failed to parse.", block);
			}
		}
		AstNode::Block { name: "global".into(), nodes }
	}

	/// Parse one statement, trying declaration, `return`, then a plain
	/// expression statement. A stray leading `;` is skipped.
	fn statement(&mut self) -> AstNode<'a> {
		if self.peek().r#type == Semicolon {
			self.advance();
			return self.statement();
		}
		if let Some(node) = self.var_define() {
			return node;
		}
		if let Some(node) = self.return_statement() {
			return node;
		}

		let node = self.assign();
		if node.is_error() {
			return node;
		}
		if self.peek().r#type != Semicolon {
			return AstNode::error("not found semicolon");
		}
		self.advance();
		AstNode::ExprStmt(Box::new(node))
	}

	/// Parse a variable declaration, or `None` if the statement does not
	/// start with a modifier keyword.
	fn var_define(&mut self) -> Option<AstNode<'a>> {
		if !matches!(self.peek().r#type, Const | Mut) {
			return None;
		}
		let modifier = self.advance();
		let name = self.advance();
		if self.peek().r#type != Colon {
			return Some(AstNode::error("not found colon"));
		}
		self.advance();

		if !matches!(self.peek().r#type, Int | Float) {
			return Some(AstNode::error("invalid type"));
		}
		let declared_type = self.advance();
		if !matches!(self.peek().r#type, Semicolon | Equal) {
			return Some(AstNode::error("not found semicolon"));
		}
		if self.scope.contains_key(name.text) {
			return Some(AstNode::error(format!("{} is already defined", name.text)));
		}
		let binding = Binding {
			mutable:  modifier.r#type == Mut,
			var_type: if declared_type.r#type == Int { ObjectType::Integer } else { ObjectType::Floating },
		};

		if self.peek().r#type == Semicolon {
			self.advance();
			self.scope.insert(name.text, binding);
			return Some(AstNode::VarDefine { modifier, name, declared_type, initial_value: None });
		}
		self.advance(); // consume '='
		// The binding is inserted only after the initializer parses, so a
		// declaration is not visible to its own initializer.
		let initial_value = self.add_sub();
		if self.peek().r#type != Semicolon {
			return Some(AstNode::error("not found semicolon"));
		}
		self.advance();
		self.scope.insert(name.text, binding);
		Some(AstNode::VarDefine { modifier, name, declared_type, initial_value: Some(Box::new(initial_value)) })
	}

	/// Parse a `return` statement, or `None` if the next token is not the
	/// keyword.
	fn return_statement(&mut self) -> Option<AstNode<'a>> {
		if self.peek().r#type != Return {
			return None;
		}
		self.advance();
		let expr = self.add_sub();
		if self.peek().r#type != Semicolon {
			return Some(AstNode::error("not found semicolon"));
		}
		self.advance();
		Some(AstNode::Return(Box::new(expr)))
	}

	/// Parse assignments. The target must be a bare, mutable variable
	/// reference and the value castable to its declared type; a violation
	/// wraps the attempted operator node in an error naming the rule.
	fn assign(&mut self) -> AstNode<'a> {
		let mut lhs = self.add_sub();
		while self.peek().r#type == Equal {
			let op = self.advance();
			let rhs = self.add_sub();
			let lhs_type = lhs.static_type();
			let rhs_type = rhs.static_type();
			let target = match &lhs {
				AstNode::Value { token, .. } if token.r#type == Identifier => Some(token.text),
				_ => None,
			};
			let node = AstNode::bin_op(op, lhs, rhs);
			lhs = if evaluate_type(lhs_type, rhs_type) == ObjectType::None {
				AstNode::error_with(format!("failed to cast {rhs_type} -> {lhs_type}"), node)
			} else if let Some(name) = target {
				if self.scope.get(name).is_some_and(|binding| binding.mutable) {
					node
				} else {
					AstNode::error_with("assign operator's lhs is not mutable", node)
				}
			} else {
				AstNode::error_with("assign operator's lhs is not a variable", node)
			};
		}
		lhs
	}

	/// Parse addition and subtraction, left associative.
	fn add_sub(&mut self) -> AstNode<'a> {
		let mut lhs = self.mul_div();
		while matches!(self.peek().r#type, Plus | Minus) {
			let op = self.advance();
			lhs = AstNode::bin_op(op, lhs, self.mul_div());
		}
		lhs
	}

	/// Parse multiplication and division, left associative.
	fn mul_div(&mut self) -> AstNode<'a> {
		let mut lhs = self.value();
		while matches!(self.peek().r#type, Star | Slash) {
			let op = self.advance();
			lhs = AstNode::bin_op(op, lhs, self.value());
		}
		lhs
	}

	/// Parse a value: a parenthesized expression, an identifier resolved
	/// against the scope map, or a numeric literal. An undeclared
	/// identifier stays in the tree, wrapped in an error node with a
	/// `none` static type that poisons everything built on top of it.
	fn value(&mut self) -> AstNode<'a> {
		if self.peek().r#type == LeftParen {
			return self.parenthess();
		}
		match self.peek().r#type {
			Identifier => {
				let token = self.advance();
				match self.scope.get(token.text) {
					Some(binding) => AstNode::Value { token, var_type: binding.var_type },
					None => AstNode::error_with(
						"value type is not appropriate",
						AstNode::Value { token, var_type: ObjectType::None },
					),
				}
			}
			Number | Floating => AstNode::Value { token: self.advance(), var_type: ObjectType::None },
			_ => AstNode::error("value type is not appropriate"),
		}
	}

	/// Parse a parenthesized expression; the opening `(` is known to be
	/// next.
	fn parenthess(&mut self) -> AstNode<'a> {
		self.advance(); // consume '('
		let expr = self.add_sub();
		if self.peek().r#type != RightParen {
			self.advance();
			return AstNode::error("not found `)`");
		}
		self.advance(); // consume ')'
		AstNode::Parenthess(Box::new(expr))
	}

	/// Peek at the current token.
	fn peek(&self) -> Token<'a> { self.tokens[self.cursor] }

	/// Advance to the next token, staying put on `Eof`.
	fn advance(&mut self) -> Token<'a> {
		let token = self.tokens[self.cursor];
		if token.r#type != Eof {
			self.cursor += 1;
		}
		token
	}
}
