// src/config.rs

use dotenvy::dotenv;
use std::env;

/// Default number of questions served per quiz request.
pub const DEFAULT_QUESTION_LIMIT: usize = 10;

/// Leaderboard size returned by the ranking endpoint.
pub const LEADERBOARD_SIZE: usize = 20;

/// Minimum attempts before a topic is eligible as the primary "weakest topic".
pub const MIN_TOPIC_ATTEMPTS: u64 = 5;

/// Maximum number of subjects in the skills breakdown.
pub const SKILLS_LIMIT: usize = 5;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expiration: u64,
    pub rust_log: String,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET must be set");

        let jwt_expiration = env::var("JWT_EXPIRATION")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(86400);

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let admin_email = env::var("ADMIN_EMAIL").ok();
        let admin_password = env::var("ADMIN_PASSWORD").ok();

        Self {
            database_url,
            jwt_secret,
            jwt_expiration,
            rust_log,
            admin_email,
            admin_password,
        }
    }
}
