/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Static bearer token for administrative endpoints.
    /// Admin routes reject every request when unset.
    pub admin_token: Option<String>,
    /// CRD number of the monitored hiring firm, used by reconciliation to
    /// decide whether a registry record counts as "hired by us".
    pub firm_crd: Option<i64>,
    /// Seconds between scheduled reconciliation runs (default: one week).
    pub reconcile_interval_secs: u64,
    /// Milliseconds to wait between registry lookups within a run
    /// (default: `400`). Respects the upstream API's implicit rate limits.
    pub reconcile_lookup_delay_ms: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                      | Default                 |
    /// |------------------------------|-------------------------|
    /// | `HOST`                       | `0.0.0.0`               |
    /// | `PORT`                       | `3000`                  |
    /// | `CORS_ORIGINS`               | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`       | `30`                    |
    /// | `ADMIN_TOKEN`                | unset (admin disabled)  |
    /// | `FIRM_CRD`                   | unset (recon disabled)  |
    /// | `RECONCILE_INTERVAL_SECS`    | `604800` (weekly)       |
    /// | `RECONCILE_LOOKUP_DELAY_MS`  | `400`                   |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let admin_token = std::env::var("ADMIN_TOKEN").ok().filter(|t| !t.is_empty());

        let firm_crd: Option<i64> = std::env::var("FIRM_CRD")
            .ok()
            .map(|v| v.parse().expect("FIRM_CRD must be a valid integer"));

        let reconcile_interval_secs: u64 = std::env::var("RECONCILE_INTERVAL_SECS")
            .unwrap_or_else(|_| "604800".into())
            .parse()
            .expect("RECONCILE_INTERVAL_SECS must be a valid u64");

        let reconcile_lookup_delay_ms: u64 = std::env::var("RECONCILE_LOOKUP_DELAY_MS")
            .unwrap_or_else(|_| "400".into())
            .parse()
            .expect("RECONCILE_LOOKUP_DELAY_MS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            admin_token,
            firm_crd,
            reconcile_interval_secs,
            reconcile_lookup_delay_ms,
        }
    }
}
