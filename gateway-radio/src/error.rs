use thiserror::Error;

#[derive(Error, Debug)]
pub enum RadioError {
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("Unable to connect to Xiaomi Gateway Radio at {host}: {source}")]
    Connection {
        host: String,
        #[source]
        source: gateway_api::ApiError,
    },
}
