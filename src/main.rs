use exprc::{Exprc, cli::*};
use palc::Parser;

fn main() {
	match Cli::parse().mode {
		Mode::File { path, dump_ast, dump_code } => {
			let exprc = Exprc { dump_ast, dump_code };
			if let Err(e) = exprc.run_file(&path) {
				eprintln!("Failed run file: {e}");
			}
		}
		Mode::Repl => Exprc::default().run_prompt(),
	}
}
