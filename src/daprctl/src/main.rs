use daprctl::cli::process_command;
use std::process::ExitCode;

pub fn main() -> ExitCode {
    process_command()
}
