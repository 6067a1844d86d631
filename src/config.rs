#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    /// `EnvFilter` directive, e.g. `info` or `garage_accounting=debug,sea_orm=warn`.
    pub log_level: String,
    pub log_json: bool,
}

pub const DEFAULT_PORT: u16 = 3333;
pub const DEFAULT_DATABASE_URL: &str = "sqlite://garage-accounting.db?mode=rwc";
pub const DEFAULT_LOG_LEVEL: &str = "info";
