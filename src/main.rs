use std::process::ExitCode;

use terraform_provider_incident::server::{magic_cookie_matches, MAGIC_COOKIE_KEY};
use terraform_provider_incident::{init_logging, serve, IncidentProvider};

#[tokio::main]
async fn main() -> ExitCode {
    let cookie = std::env::var(MAGIC_COOKIE_KEY).ok();
    if !magic_cookie_matches(cookie.as_deref()) {
        eprintln!(
            "This binary is a plugin. These are not meant to be executed directly.\n\
             Please execute the program that consumes these plugins, which will\n\
             load any plugins automatically."
        );
        return ExitCode::FAILURE;
    }

    init_logging();

    let provider = IncidentProvider::default();
    tracing::info!(version = %provider.version(), "starting incident.io provider");

    match serve(provider).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "provider server failed");
            ExitCode::FAILURE
        },
    }
}
