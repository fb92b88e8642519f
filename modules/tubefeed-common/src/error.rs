use thiserror::Error;

#[derive(Error, Debug)]
pub enum TubefeedError {
    #[error("Configuration error: {0}")]
    Config(String),
}
