use std::process::ExitCode;

fn main() -> ExitCode {
    match toyc_drv::run(std::env::args().skip(1)) {
        Ok(code) => ExitCode::from(code as u8),
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(1)
        }
    }
}
