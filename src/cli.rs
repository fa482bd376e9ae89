use std::path::PathBuf;

use palc::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "exprc", after_long_help = "A toy expression-language compiler with a tiny stack VM.")]
pub struct Cli {
	#[command(subcommand)]
	pub mode: Mode,
}

#[derive(Subcommand, Debug)]
pub enum Mode {
	/// Compile and run a source file
	File {
		path:      PathBuf,
		/// Print the parsed syntax tree
		#[arg(long)]
		dump_ast:  bool,
		/// Print the generated instruction list
		#[arg(long)]
		dump_code: bool,
	},
	/// Read statements from an interactive prompt
	Repl,
}
