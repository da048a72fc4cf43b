use std::env;
use std::time::Duration;

use tracing::info;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // MQTT transport
    pub mqtt_host: String,
    pub mqtt_port: u16,
    pub topic_root: String,

    // Relational store (Postgres)
    pub pg_host: String,
    pub pg_port: u16,
    pub pg_user: String,
    pub pg_password: String,
    pub pg_db: String,
    pub sensor_table: String,
    pub claims_table: String,

    // Document store (MongoDB)
    pub mongo_host: String,
    pub mongo_port: u16,
    pub mongo_db: String,
    pub mongo_collection: String,
    pub mongo_username: Option<String>,
    pub mongo_password: Option<String>,

    // Graph store (Neo4j)
    pub neo4j_uri: String,
    pub neo4j_user: String,
    pub neo4j_password: String,

    // Pipeline tuning
    pub workers: usize,
    pub queue_depth: usize,
    pub store_write_timeout: Duration,
    pub store_write_retries: u32,
    /// Zero disables claim suppression entirely.
    pub claim_suppress: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    /// Panics with a clear message if required vars are missing.
    pub fn from_env() -> Self {
        Self {
            mqtt_host: env_or("MQTT_BROKER_HOST", "localhost"),
            mqtt_port: parsed_env("MQTT_BROKER_PORT", 1883),
            topic_root: env_or("MQTT_TOPIC_ROOT", "home"),
            pg_host: env_or("PG_HOST", "localhost"),
            pg_port: parsed_env("PG_PORT", 5432),
            pg_user: required_env("PG_USER"),
            pg_password: required_env("PG_PASSWORD"),
            pg_db: required_env("PG_DB"),
            sensor_table: env_or("PG_SENSOR_TABLE", "sensor_readings"),
            claims_table: env_or("PG_CLAIMS_TABLE", "insurance_claims"),
            mongo_host: env_or("MONGO_HOST", "localhost"),
            mongo_port: parsed_env("MONGO_PORT", 27017),
            mongo_db: env_or("MONGO_DATABASE", "home_sensor_data"),
            mongo_collection: env_or("MONGO_SENSOR_COLLECTION", "raw_sensor_data"),
            mongo_username: env::var("MONGO_USERNAME").ok(),
            mongo_password: env::var("MONGO_PASSWORD").ok(),
            neo4j_uri: required_env("NEO4J_URI"),
            neo4j_user: required_env("NEO4J_USERNAME"),
            neo4j_password: required_env("NEO4J_PASSWORD"),
            workers: parsed_env("COLLECTOR_WORKERS", 4),
            queue_depth: parsed_env("COLLECTOR_QUEUE_DEPTH", 256),
            store_write_timeout: Duration::from_millis(parsed_env("STORE_WRITE_TIMEOUT_MS", 5000)),
            store_write_retries: parsed_env("STORE_WRITE_RETRIES", 2),
            claim_suppress: Duration::from_secs(parsed_env("CLAIM_SUPPRESS_SECS", 0)),
        }
    }

    /// Minimal config for the sensor simulator: only the transport surface
    /// is needed, store fields stay empty.
    pub fn simulator_from_env() -> Self {
        Self {
            mqtt_host: env_or("MQTT_BROKER_HOST", "localhost"),
            mqtt_port: parsed_env("MQTT_BROKER_PORT", 1883),
            topic_root: env_or("MQTT_TOPIC_ROOT", "home"),
            pg_host: String::new(),
            pg_port: 0,
            pg_user: String::new(),
            pg_password: String::new(),
            pg_db: String::new(),
            sensor_table: String::new(),
            claims_table: String::new(),
            mongo_host: String::new(),
            mongo_port: 0,
            mongo_db: String::new(),
            mongo_collection: String::new(),
            mongo_username: None,
            mongo_password: None,
            neo4j_uri: String::new(),
            neo4j_user: String::new(),
            neo4j_password: String::new(),
            workers: 0,
            queue_depth: 0,
            store_write_timeout: Duration::ZERO,
            store_write_retries: 0,
            claim_suppress: Duration::ZERO,
        }
    }

    /// Postgres connection URL for sqlx.
    pub fn pg_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.pg_user, self.pg_password, self.pg_host, self.pg_port, self.pg_db
        )
    }

    /// MongoDB connection URL; authSource=admin when credentials are set.
    pub fn mongo_url(&self) -> String {
        match (&self.mongo_username, &self.mongo_password) {
            (Some(user), Some(password)) => format!(
                "mongodb://{}:{}@{}:{}/{}?authSource=admin",
                user, password, self.mongo_host, self.mongo_port, self.mongo_db
            ),
            _ => format!("mongodb://{}:{}", self.mongo_host, self.mongo_port),
        }
    }

    /// Log the non-secret configuration surface.
    pub fn log_redacted(&self) {
        info!(
            mqtt = %format!("{}:{}", self.mqtt_host, self.mqtt_port),
            topic_root = %self.topic_root,
            pg = %format!("{}:{}/{}", self.pg_host, self.pg_port, self.pg_db),
            sensor_table = %self.sensor_table,
            claims_table = %self.claims_table,
            mongo = %format!("{}:{}/{}", self.mongo_host, self.mongo_port, self.mongo_db),
            neo4j = %self.neo4j_uri,
            workers = self.workers,
            queue_depth = self.queue_depth,
            store_write_timeout_ms = self.store_write_timeout.as_millis() as u64,
            store_write_retries = self.store_write_retries,
            claim_suppress_secs = self.claim_suppress.as_secs(),
            "Configuration loaded"
        );
    }
}

fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} environment variable is required"))
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parsed_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .unwrap_or_else(|_| panic!("{key} must be a number")),
        Err(_) => default,
    }
}
