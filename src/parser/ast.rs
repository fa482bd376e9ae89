//! Syntax tree nodes.
//!
//! One closed enum covers the whole tree, error nodes included: a malformed
//! statement parses to an [`AstNode::Error`] carrying a message and, when
//! one was informative enough to keep, the partially built subtree. The
//! parser never throws — callers walk the finished tree for error nodes.
//!
//! Every node answers two questions: its static type, computed bottom-up
//! from its children through the lattice, and its textual dump, an indented
//! pseudo-XML rendering that tests compare byte-for-byte.

use crate::{
	lexer::{Token, TokenType},
	types::{ObjectType, evaluate_type},
};

/// A node of the syntax tree, owning its children exclusively.
#[derive(Debug)]
pub(crate) enum AstNode<'a> {
	/// A parse or semantic error, with the offending subtree when kept.
	Error { message: String, child: Option<Box<AstNode<'a>>> },
	/// A literal or identifier reference. `var_type` is the declared type
	/// resolved from the scope map for identifiers; literals ignore it.
	Value { token: Token<'a>, var_type: ObjectType },
	/// A parenthesized expression.
	Parenthess(Box<AstNode<'a>>),
	/// A binary operator, assignment included.
	BinOp { op: Token<'a>, lhs: Box<AstNode<'a>>, rhs: Box<AstNode<'a>> },
	/// An expression evaluated for effect; its value is discarded.
	ExprStmt(Box<AstNode<'a>>),
	/// A `const`/`mut` variable declaration.
	VarDefine {
		modifier:      Token<'a>,
		name:          Token<'a>,
		declared_type: Token<'a>,
		initial_value: Option<Box<AstNode<'a>>>,
	},
	/// A `return` statement.
	Return(Box<AstNode<'a>>),
	/// A sequence of statements.
	Block { name: String, nodes: Vec<AstNode<'a>> },
}

impl<'a> AstNode<'a> {
	pub fn error(message: impl Into<String>) -> Self {
		AstNode::Error { message: message.into(), child: None }
	}

	pub fn error_with(message: impl Into<String>, child: Self) -> Self {
		AstNode::Error { message: message.into(), child: Some(Box::new(child)) }
	}

	pub fn bin_op(op: Token<'a>, lhs: Self, rhs: Self) -> Self {
		AstNode::BinOp { op, lhs: Box::new(lhs), rhs: Box::new(rhs) }
	}

	pub fn is_error(&self) -> bool { matches!(self, AstNode::Error { .. }) }

	/// Static type of the node, computed from its children.
	pub fn static_type(&self) -> ObjectType {
		match self {
			AstNode::Error { .. } => ObjectType::None,
			AstNode::Value { token, var_type } => match token.r#type {
				TokenType::Number => ObjectType::Integer,
				TokenType::Floating => ObjectType::Floating,
				TokenType::Identifier => *var_type,
				_ => ObjectType::None,
			},
			AstNode::Parenthess(expr) => expr.static_type(),
			AstNode::BinOp { lhs, rhs, .. } => evaluate_type(lhs.static_type(), rhs.static_type()),
			AstNode::ExprStmt(expr) => expr.static_type(),
			AstNode::VarDefine { declared_type, .. } => match declared_type.r#type {
				TokenType::Int => ObjectType::Integer,
				TokenType::Float => ObjectType::Floating,
				_ => ObjectType::None,
			},
			AstNode::Return(expr) => expr.static_type(),
			AstNode::Block { .. } => ObjectType::None,
		}
	}

	/// Render the subtree as indented pseudo-XML, one tag pair per node,
	/// every line newline-terminated. Golden-file tests depend on this
	/// exact shape.
	pub fn dump(&self, prefix: &str) -> String {
		match self {
			AstNode::Error { message, child: None } => format!("{prefix}<error>{message}</error>\n"),
			AstNode::Error { message, child: Some(child) } => {
				let mut str = format!("{prefix}<error message=\"{message}\">\n");
				str += &child.dump(&format!("{prefix}\t"));
				str + &format!("{prefix}</error>\n")
			}
			AstNode::Value { token, .. } => format!("{prefix}<value>{}</value>\n", token.text),
			AstNode::Parenthess(expr) => {
				let mut str = format!("{prefix}<parenthess>\n");
				str += &expr.dump(&format!("{prefix}\t"));
				str + &format!("{prefix}</parenthess>\n")
			}
			AstNode::BinOp { op, lhs, rhs } => {
				let child_prefix = format!("{prefix}\t");
				let mut str = format!("{prefix}<operator op=\"{}\">\n", op.text);
				str += &lhs.dump(&child_prefix);
				str += &rhs.dump(&child_prefix);
				str + &format!("{prefix}</operator>\n")
			}
			AstNode::ExprStmt(expr) => expr.dump(prefix),
			AstNode::VarDefine { modifier, name, declared_type, initial_value } => {
				let mut type_name = String::new();
				if modifier.r#type == TokenType::Mut {
					type_name += "mut ";
				} else if modifier.r#type == TokenType::Const {
					type_name += "const ";
				}
				if declared_type.r#type == TokenType::Int {
					type_name += "int";
				} else if declared_type.r#type == TokenType::Float {
					type_name += "float";
				}
				let mut str = format!("{prefix}<define name=\"{}\" type=\"{type_name}\">\n", name.text);
				if let Some(init) = initial_value {
					str += &init.dump(&format!("{prefix}\t"));
				}
				str + &format!("{prefix}</define>\n")
			}
			AstNode::Return(expr) => {
				let mut str = format!("{prefix}<return>\n");
				str += &expr.dump(&format!("{prefix}\t"));
				str + &format!("{prefix}</return>\n")
			}
			AstNode::Block { name, nodes } => {
				let child_prefix = format!("{prefix}\t");
				let mut str = format!("{prefix}<block name=\"{name}\">\n");
				for node in nodes {
					str += &node.dump(&child_prefix);
				}
				str + &format!("{prefix}</block>\n")
			}
		}
	}

	/// All error messages in the subtree, in source order.
	pub fn errors(&self) -> Vec<&str> {
		let mut messages = Vec::new();
		self.collect_errors(&mut messages);
		messages
	}

	fn collect_errors<'n>(&'n self, messages: &mut Vec<&'n str>) {
		match self {
			AstNode::Error { message, child } => {
				messages.push(message);
				if let Some(child) = child {
					child.collect_errors(messages);
				}
			}
			AstNode::Value { .. } => {}
			AstNode::Parenthess(expr) | AstNode::ExprStmt(expr) | AstNode::Return(expr) => {
				expr.collect_errors(messages)
			}
			AstNode::BinOp { lhs, rhs, .. } => {
				lhs.collect_errors(messages);
				rhs.collect_errors(messages);
			}
			AstNode::VarDefine { initial_value, .. } => {
				if let Some(init) = initial_value {
					init.collect_errors(messages);
				}
			}
			AstNode::Block { nodes, .. } => {
				for node in nodes {
					node.collect_errors(messages);
				}
			}
		}
	}
}

impl std::fmt::Display for AstNode<'_> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "{}", self.dump("")) }
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::lexer::CodePoint;

	fn token(r#type: TokenType, text: &str) -> Token<'_> {
		Token::new(r#type, text, CodePoint::default())
	}

	#[test]
	fn literal_static_types() {
		let int = AstNode::Value { token: token(TokenType::Number, "1"), var_type: ObjectType::None };
		let float = AstNode::Value { token: token(TokenType::Floating, "1.5"), var_type: ObjectType::None };
		assert_eq!(int.static_type(), ObjectType::Integer);
		assert_eq!(float.static_type(), ObjectType::Floating);
	}

	#[test]
	fn operator_type_widens() {
		let lhs = AstNode::Value { token: token(TokenType::Number, "1"), var_type: ObjectType::None };
		let rhs = AstNode::Value { token: token(TokenType::Floating, "2.14"), var_type: ObjectType::None };
		let node = AstNode::bin_op(token(TokenType::Plus, "+"), lhs, rhs);
		assert_eq!(node.static_type(), ObjectType::Floating);
	}

	#[test]
	fn error_node_dumps_inline_without_child() {
		let node = AstNode::error("not found semicolon");
		assert_eq!(node.dump(""), "<error>not found semicolon</error>\n");
		assert_eq!(node.dump("\t"), "\t<error>not found semicolon</error>\n");
	}

	#[test]
	fn error_node_wraps_child() {
		let child = AstNode::Value { token: token(TokenType::Identifier, "v"), var_type: ObjectType::None };
		let node = AstNode::error_with("value type is not appropriate", child);
		assert_eq!(
			node.dump(""),
			"<error message=\"value type is not appropriate\">\n\t<value>v</value>\n</error>\n"
		);
		assert_eq!(node.errors(), vec!["value type is not appropriate"]);
	}
}
