//! Configuration module for the staff backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::errors::AppError;

/// Office whose directory sheet gets the address/fax notice by default.
pub const DEFAULT_CENTRAL_OFFICE: &str = "Центральный аппарат";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Access key for the API; authentication is disabled when unset
    pub api_key: Option<String>,
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Path to Tantivy search index directory
    pub index_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Office name limiting which employees get arrangement rows
    pub arrangement_office: Option<String>,
    /// Office name that receives the notice row in the phone directory
    pub central_office_name: String,
    /// Fax number printed in the central office notice
    pub central_office_fax: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let api_key = non_empty_var("STAFF_API_KEY");

        let db_path = env::var("STAFF_DB_PATH")
            .unwrap_or_else(|_| "./data/staff.sqlite".to_string())
            .into();

        let index_path = env::var("STAFF_INDEX_PATH")
            .unwrap_or_else(|_| "./data/index".to_string())
            .into();

        let bind_addr = env::var("STAFF_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()
            .map_err(|e| AppError::Internal(format!("Invalid STAFF_BIND_ADDR format: {}", e)))?;

        let log_level = env::var("STAFF_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let arrangement_office = non_empty_var("STAFF_ARRANGEMENT_OFFICE");

        let central_office_name = non_empty_var("STAFF_CENTRAL_OFFICE_NAME")
            .unwrap_or_else(|| DEFAULT_CENTRAL_OFFICE.to_string());

        let central_office_fax =
            non_empty_var("STAFF_CENTRAL_OFFICE_FAX").unwrap_or_else(|| "-".to_string());

        Ok(Self {
            api_key,
            db_path,
            index_path,
            bind_addr,
            log_level,
            arrangement_office,
            central_office_name,
            central_office_fax,
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
