use std::process::ExitCode;

fn main() -> ExitCode {
    ur_verify::cli::run()
}
