use std::process::ExitCode;

fn main() -> ExitCode {
    postwise_cli::run()
}
