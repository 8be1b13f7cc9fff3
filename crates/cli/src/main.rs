use std::process::ExitCode;

fn main() -> ExitCode {
    liftquote_cli::run()
}
