use std::{fs::read_to_string, io::Write, path::Path};

use anyhow::Context;

use crate::{
	ExprcError,
	codegen::Generator,
	lexer::Lexer,
	parser::Parser,
	vm::{Object, Vm},
};

/// Exprc is the compiler facade wiring the pipeline stages together.
///
/// Every run builds a fresh context per stage — token buffer, scope map,
/// instruction list, VM — so nothing leaks between invocations.
#[derive(Default)]
pub struct Exprc {
	/// Print the pseudo-XML syntax tree after parsing.
	pub dump_ast:  bool,
	/// Print the instruction mnemonics after generation.
	pub dump_code: bool,
}

impl Exprc {
	/// Compile and run a source file, printing the program result.
	pub fn run_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ExprcError> {
		let source = read_to_string(path).context("Failed open source file")?;
		if let Some(value) = self.run(&source)? {
			println!("{value}");
		}
		Ok(())
	}

	/// Run the REPL prompt.
	pub fn run_prompt(&self) {
		let mut input = String::new();
		let stdin = std::io::stdin();
		loop {
			input.clear();
			print!("> ");
			if let Err(e) = std::io::stdout().flush() {
				eprintln!("Failed flush: {e}");
			}
			match stdin.read_line(&mut input) {
				Ok(0) => {
					println!("\nExited exprc repl");
					break;
				}
				Ok(_) => {}
				Err(e) => {
					eprintln!("Failed read line: {e}");
					continue;
				}
			}
			match self.run(input.trim()) {
				Ok(Some(value)) => println!("{value}"),
				Ok(None) => {}
				Err(e) => eprintln!("Failed run prompt: {e}"),
			}
		}
	}

	/// Run one source text through the whole pipeline.
	///
	/// Returns the program result — the sole stack value a `ret` left
	/// behind — or `None` for a program that ran off the end without
	/// returning. Parse errors are reported to stderr and stop the run
	/// before code generation.
	pub fn run(&self, source: &str) -> Result<Option<Object>, ExprcError> {
		let mut lexer = Lexer::new(source);
		let tokens = lexer.tokenize()?;

		let mut parser = Parser::new(tokens);
		let root = parser.parse();
		if self.dump_ast {
			print!("{}", root.dump(""));
		}
		let errors = root.errors();
		if !errors.is_empty() {
			for message in &errors {
				eprintln!("Parse error: {message}");
			}
			return Err(ExprcError::ParserErrors(errors.len()));
		}

		let codes = Generator::generate(&root);
		if self.dump_code {
			for instruction in &codes {
				println!("{instruction}");
			}
		}

		let mut vm = Vm::new();
		vm.execute(&codes);
		if let Some(fault) = vm.take_fault() {
			return Err(fault.into());
		}
		if !vm.aborted() {
			// The program ran off the end without a `return`.
			return Ok(None);
		}
		Ok(vm.result().cloned())
	}
}
