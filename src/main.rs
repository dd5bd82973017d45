use std::process::ExitCode;

fn main() -> ExitCode {
    match signal_quality::app::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("sq: {err}");
            ExitCode::from(err.exit_code())
        }
    }
}
