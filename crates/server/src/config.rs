use std::{env, net::IpAddr, time::Duration};

use anyhow::Context;
use services::services::generator::GeneratorConfig;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub database_url: String,
    pub generator: GeneratorConfig,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let host = env::var("HOST")
            .unwrap_or_else(|_| "127.0.0.1".to_string())
            .parse()
            .context("invalid HOST")?;
        let port = env::var("BACKEND_PORT")
            .ok()
            .map(|value| value.parse())
            .transpose()
            .context("invalid BACKEND_PORT")?
            .unwrap_or(3000);
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:chat.db".to_string());

        let mut generator = GeneratorConfig::default();
        if let Some(delay) = duration_ms_from_env("GENERATOR_FIRST_FRAGMENT_DELAY_MS")? {
            generator.first_fragment_delay = delay;
        }
        if let Some(delay) = duration_ms_from_env("GENERATOR_INTER_FRAGMENT_DELAY_MS")? {
            generator.inter_fragment_delay = delay;
        }

        Ok(Self {
            host,
            port,
            database_url,
            generator,
        })
    }
}

fn duration_ms_from_env(key: &str) -> anyhow::Result<Option<Duration>> {
    env::var(key)
        .ok()
        .map(|value| {
            value
                .parse::<u64>()
                .map(Duration::from_millis)
                .with_context(|| format!("invalid {key}"))
        })
        .transpose()
}
