use std::env;
use std::path::PathBuf;
use std::time::Duration;

use dotenvy::dotenv;

#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub log_dir: PathBuf,
    pub simulated_latency: Duration,

    // Defaults for check-in / check-out
    pub employee_id: Option<String>,
    pub employee_name: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        Self {
            data_dir: env::var("HRM_DATA_DIR")
                .unwrap_or_else(|_| "data".to_string())
                .into(),
            log_dir: env::var("HRM_LOG_DIR")
                .unwrap_or_else(|_| "logs".to_string())
                .into(),
            simulated_latency: Duration::from_millis(
                env::var("HRM_SIMULATED_LATENCY_MS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(500), // default 500 ms
            ),
            employee_id: env::var("HRM_EMPLOYEE_ID").ok().filter(|v| !v.is_empty()),
            employee_name: env::var("HRM_EMPLOYEE_NAME").ok().filter(|v| !v.is_empty()),
        }
    }
}
