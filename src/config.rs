use anyhow::{anyhow, Context};

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_CONVERSATIONS_URL: &str = "https://conversations.twilio.com";

#[derive(Clone, Debug)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub api_key: String,
    pub api_secret: String,
    pub service_sid: String,
    pub auth_token: String,
    pub conversations_url: String,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub twilio: TwilioConfig,
    pub port: u16,
}

impl Config {
    /// Reads `.env` (if any) and then the process environment.
    pub fn from_env() -> anyhow::Result<Config> {
        dotenv::dotenv().ok();
        Config::from_lookup(|key| dotenv::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Config> {
        let required = |key: &str| {
            lookup(key)
                .filter(|value| !value.is_empty())
                .ok_or_else(|| anyhow!("{key} must be set"))
        };

        let port = match lookup("PORT") {
            Some(port) => port.parse().with_context(|| format!("PORT={port} is not a valid port"))?,
            None => DEFAULT_PORT,
        };

        Ok(Config {
            database_url: required("DATABASE_URL")?,
            twilio: TwilioConfig {
                account_sid: required("TWILIO_ACCOUNT_SID")?,
                api_key: required("TWILIO_API_KEY")?,
                api_secret: required("TWILIO_API_SECRET")?,
                service_sid: required("TWILIO_SERVICE_SID")?,
                auth_token: required("TWILIO_AUTH_TOKEN")?,
                conversations_url: lookup("TWILIO_CONVERSATIONS_URL")
                    .unwrap_or_else(|| DEFAULT_CONVERSATIONS_URL.to_owned()),
            },
            port,
        })
    }
}
