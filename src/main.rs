use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{AppState, router};
use patients_core::{CoreConfig, PatientService, config::patient_data_file_from_env_value};

/// Main entry point for the patient records service
///
/// Serves the REST API on port 3000 (configurable via PATIENTS_REST_ADDR).
///
/// # Environment Variables
/// - `PATIENTS_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `PATIENT_DATA_FILE`: JSON document holding all patients (default: "patients.json")
/// - `RUST_LOG`: log filter, combined with the default per-crate `info` directives
///
/// # Errors
/// Returns an error if:
/// - the logging configuration cannot be initialised,
/// - the server address is invalid or cannot be bound,
/// - the configured data file is not usable,
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("patients_run=info".parse()?)
                .add_directive("patients_core=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr: SocketAddr = std::env::var("PATIENTS_REST_ADDR")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| "0.0.0.0:3000".into())
        .parse()?;

    let data_file = patient_data_file_from_env_value(std::env::var("PATIENT_DATA_FILE").ok());
    let cfg = CoreConfig::new(data_file)?;

    tracing::info!("++ Patient data file: {}", cfg.patient_data_file().display());
    tracing::info!("++ Starting patient records REST API on {}", rest_addr);

    let patient_service = PatientService::from_config(&cfg);
    let preloaded = patient_service.list()?;
    tracing::info!("++ Loaded {} patients", preloaded.len());

    let app = router(AppState::new(patient_service));

    let listener = tokio::net::TcpListener::bind(rest_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
