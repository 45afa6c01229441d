use std::env;
use std::process::ExitCode;

use primus::cli;

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    ExitCode::from(cli::run_with_args(&args) as u8)
}
