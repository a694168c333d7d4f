use thiserror::Error;

use crate::backoff::RetryPolicy;

use super::desired::ConfigurationError;

#[derive(Debug, Error)]
pub enum GuestBookError {
    #[error(transparent)]
    Api(#[from] guestbook::Error),
    #[error("Redis {namespace}/{name} does not exist")]
    RedisNotFound { namespace: String, name: String },
    #[error("Invalid configuration: {0}")]
    Configuration(#[from] ConfigurationError),
}

impl RetryPolicy for GuestBookError {
    /// A configuration error cannot resolve itself, only a spec change can.
    fn retryable(&self) -> bool {
        !matches!(self, Self::Configuration(_))
    }
}
