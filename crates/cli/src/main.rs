use std::process::ExitCode;

fn main() -> ExitCode {
    smeta_cli::run()
}
