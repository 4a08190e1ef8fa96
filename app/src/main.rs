use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    clipper_app::run().await
}
