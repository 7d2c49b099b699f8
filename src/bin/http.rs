#[cfg(feature = "http_api")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use std::net::SocketAddr;

    use study_planner::{DynStore, FileStore, PlannerConfig, StudyPlanner, SystemClock, http_api};
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let addr: SocketAddr = std::env::var("STUDY_PLANNER_HTTP_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
        .parse()?;
    let data_dir =
        std::env::var("STUDY_PLANNER_DATA_DIR").unwrap_or_else(|_| ".study-planner".to_string());
    let config = match std::env::var("STUDY_PLANNER_CONFIG") {
        Ok(path) => PlannerConfig::from_json_file(path)?,
        Err(_) => PlannerConfig::default(),
    };

    let store: DynStore = Box::new(FileStore::new(&data_dir));
    let planner = StudyPlanner::open(store, config, SystemClock)?;

    tracing::info!(%addr, data_dir = %data_dir, "study-planner HTTP API listening");
    http_api::serve(addr, planner).await?;
    Ok(())
}

#[cfg(not(feature = "http_api"))]
fn main() {
    eprintln!("Rebuild with the `http_api` feature to enable the HTTP server.");
}
