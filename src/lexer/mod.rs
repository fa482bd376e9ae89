//! Lexical analysis: raw source text to a token stream.
//!
//! The lexer walks the source left to right and classifies each lexeme by
//! maximal munch: the longest recognizer wins at every position, which is
//! what makes `->` a single arrow instead of a minus followed by garbage,
//! and `mutx` an identifier instead of the keyword `mut`.
//!
//! Numeric literals keep their integer/floating distinction from here on —
//! `1` and `1.` are different token kinds, and that difference is what the
//! whole static-typing story downstream hangs off of.
//!
//! A character no recognizer accepts is a lexical error. The lexer consumes
//! it, records the error with its position, and keeps scanning, so a single
//! stray symbol reports once instead of wedging the scan; the error count is
//! returned after the full pass.

mod token;

use std::{iter::Peekable, str::CharIndices};

use TokenType::*;
use anyhow::Context;
pub(crate) use token::*;

use crate::{
	ExprcError,
	error::lexer::{LexError, LexErrorType, LexerError},
};

/// A lexer over one source buffer
pub(crate) struct Lexer<'a> {
	/// User input source code
	source:      &'a str,
	/// User input source code iterator
	source_iter: Peekable<CharIndices<'a>>,
	/// Points at the beginning of the current lexeme
	start:       usize,
	/// Points one past the character last consumed
	cursor:      usize,
	/// Position of the character about to be consumed
	point:       CodePoint,
}

impl<'a> Lexer<'a> {
	pub fn new(source: &'a str) -> Self {
		let source_iter = source.char_indices().peekable();

		Self { source, source_iter, start: 0, cursor: 0, point: CodePoint { line: 1, col: 1, line_start: 0 } }
	}

	/// Scan the whole source, producing a stream terminated by one [`Eof`]
	/// token.
	pub fn tokenize(&mut self) -> Result<Vec<Token<'a>>, ExprcError> {
		let mut tokens = Vec::new();
		let mut error_count = 0;
		while let Some(&(index, _)) = self.source_iter.peek() {
			// We are at the beginning of the next lexeme.
			self.start = index;
			self.cursor = index;
			let point = self.point;
			match self.scan_token(point) {
				Ok(Some(r#type)) => {
					let text = &self.source[self.start..self.cursor];
					tokens.push(Token::new(r#type, text, point));
				}
				Ok(None) => {}
				Err(LexerError::LexError(e)) => {
					eprintln!("Lex error: {e}");
					error_count += 1;
				}
				Err(LexerError::InternalError(e)) => {
					return Err(e.into());
				}
			}
		}
		if error_count != 0 {
			return Err(ExprcError::LexerErrors(error_count));
		}
		tokens.push(Token::new(Eof, "", self.point));
		Ok(tokens)
	}

	/// Scan a single lexeme. `Ok(None)` means the lexeme produces no token
	/// (whitespace).
	fn scan_token(&mut self, point: CodePoint) -> Result<Option<TokenType>, LexerError> {
		let next_char = self.advance().context("Unexpected end of input")?;
		let r#type = match next_char {
			'(' => LeftParen,
			')' => RightParen,
			'{' => LeftBrace,
			'}' => RightBrace,
			',' => Comma,
			':' => Colon,
			';' => Semicolon,
			'=' => Equal,
			'+' => Plus,
			'*' => Star,
			'/' => Slash,
			'-' => {
				if self.match_next('>') {
					Arrow
				} else {
					Minus
				}
			}
			' ' | '\r' | '\t' => return Ok(None),
			'\n' => {
				self.point.line += 1;
				self.point.col = 1;
				self.point.line_start = self.cursor;
				return Ok(None);
			}
			'.' => {
				if self.peek().is_some_and(|c| c.is_ascii_digit()) {
					self.number(true)
				} else {
					return Err(LexError::new(point, LexErrorType::UnexpectedCharacter('.')).into());
				}
			}
			c if c.is_ascii_digit() => self.number(false),
			c if c.is_ascii_alphabetic() || c == '_' => self.identifier(),
			c => return Err(LexError::new(point, LexErrorType::UnexpectedCharacter(c)).into()),
		};

		Ok(Some(r#type))
	}

	/// Match the next character if it is the expected one
	fn match_next(&mut self, expected: char) -> bool {
		matches!(self.peek(), Some(c) if c == expected && { self.advance(); true })
	}

	/// Advance to the next character
	fn advance(&mut self) -> Option<char> {
		let (i, c) = self.source_iter.next()?;
		self.cursor = i + c.len_utf8();
		self.point.col += 1;
		Some(c)
	}

	/// Peek the current character
	fn peek(&mut self) -> Option<char> { self.source_iter.peek().map(|&(_, c)| c) }

	/// Scan a numeric literal. The integer part may be empty (`.5`) and the
	/// fractional part may be empty too (`1.`); both read as floating.
	fn number(&mut self, mut floating: bool) -> TokenType {
		while self.peek().is_some_and(|c| c.is_ascii_digit()) {
			self.advance();
		}
		if !floating && self.peek() == Some('.') {
			floating = true;
			self.advance(); // consume '.'
			while self.peek().is_some_and(|c| c.is_ascii_digit()) {
				self.advance();
			}
		}
		if floating { Floating } else { Number }
	}

	/// Scan an identifier or keyword
	fn identifier(&mut self) -> TokenType {
		while self.peek().is_some_and(|c| c.is_ascii_alphanumeric() || c == '_') {
			self.advance();
		}
		TokenType::keyword_or_identifier(&self.source[self.start..self.cursor])
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn scan(input: &str, ok: bool) {
		let mut lexer = Lexer::new(input);
		let result = lexer.tokenize();
		assert!(result.is_ok() == ok, "{input:?}");
	}

	fn types(input: &str) -> Vec<TokenType> {
		let mut lexer = Lexer::new(input);
		lexer.tokenize().unwrap().iter().map(|t| t.r#type).collect()
	}

	#[test]
	fn scan_tokens() {
		scan("", true);
		scan("(", true);
		scan("(){};:,", true);
		scan(" ( ) ", true);
		scan("@", false);
		scan("你好", false);
		scan("12345", true);
		scan("value", true);
		scan("return", true);
		scan("const v: int = 1;", true);
	}

	#[test]
	fn scan_numbers() {
		scan("0", true);
		scan("42", true);
		scan("3.14", true);
		scan("0.5", true);
		scan("123.456", true);
		scan("1.", true);
		scan(".5", true);
		scan(".", false);

		assert_eq!(types("42"), vec![Number, Eof]);
		assert_eq!(types("3.14"), vec![Floating, Eof]);
		assert_eq!(types("1."), vec![Floating, Eof]);
		assert_eq!(types(".5"), vec![Floating, Eof]);
	}

	#[test]
	fn scan_signs() {
		assert_eq!(types("+ - * /"), vec![Plus, Minus, Star, Slash, Eof]);
		assert_eq!(types("( ) { } , : ; ="), vec![
			LeftParen, RightParen, LeftBrace, RightBrace, Comma, Colon, Semicolon, Equal, Eof
		]);
	}

	#[test]
	fn arrow_wins_over_minus() {
		assert_eq!(types("->"), vec![Arrow, Eof]);
		assert_eq!(types("->-"), vec![Arrow, Minus, Eof]);
		assert_eq!(types("- -"), vec![Minus, Minus, Eof]);
	}

	#[test]
	fn scan_keywords() {
		assert_eq!(types("return fn const mut int float"), vec![Return, Fn, Const, Mut, Int, Float, Eof]);
	}

	#[test]
	fn keyword_needs_word_boundary() {
		assert_eq!(types("mutx"), vec![Identifier, Eof]);
		assert_eq!(types("int8"), vec![Identifier, Eof]);
		assert_eq!(types("mut x"), vec![Mut, Identifier, Eof]);
		assert_eq!(types("_return"), vec![Identifier, Eof]);
	}

	#[test]
	fn scan_identifiers() {
		scan("x", true);
		scan("_name", true);
		scan("snake_case", true);
		scan("CamelCase", true);
		scan("value123", true);
	}

	#[test]
	fn scan_statement_tokens() {
		let mut lexer = Lexer::new("mut v: float = 2.14;");
		let tokens = lexer.tokenize().unwrap();
		let texts: Vec<&str> = tokens.iter().map(|t| t.text).collect();
		assert_eq!(texts, vec!["mut", "v", ":", "float", "=", "2.14", ";", ""]);
		assert_eq!(tokens[0].r#type, Mut);
		assert_eq!(tokens[5].r#type, Floating);
		assert_eq!(tokens[7].r#type, Eof);
	}

	#[test]
	fn scan_positions() {
		let mut lexer = Lexer::new("a\nbc");
		let tokens = lexer.tokenize().unwrap();
		assert_eq!(tokens[0].point, CodePoint { line: 1, col: 1, line_start: 0 });
		assert_eq!(tokens[1].point, CodePoint { line: 2, col: 1, line_start: 2 });
	}

	#[test]
	fn errors_recover_and_are_counted() {
		// Both stray characters are consumed; scanning reaches the end.
		let mut lexer = Lexer::new("1 @ 2 #");
		assert!(matches!(lexer.tokenize(), Err(ExprcError::LexerErrors(2))));
	}
}
