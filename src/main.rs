use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match tenxr_web_portal_lib::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("tenxr-web-portal: {err}");
            ExitCode::FAILURE
        }
    }
}
