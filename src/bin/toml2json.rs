//! Conformance harness: reads TOML from a file argument (or stdin), prints
//! the typed-JSON dump on success, and exits 1 with a one-line diagnostic on
//! any parse error.

use std::io::Read;
use std::process::ExitCode;

fn main() -> ExitCode {
    let path = std::env::args().nth(1);
    let (name, result) = match &path {
        Some(path) => (path.as_str(), toml_keytree::parse_file(path)),
        None => {
            let mut input = Vec::new();
            if let Err(err) = std::io::stdin().read_to_end(&mut input) {
                eprintln!("stdin: {err}");
                return ExitCode::FAILURE;
            }
            ("stdin", toml_keytree::parse_reader(&input[..]))
        }
    };
    match result {
        Ok(root) => {
            println!("{}", toml_keytree::ser::dumps(&root));
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{}", err.report(name));
            ExitCode::FAILURE
        }
    }
}
