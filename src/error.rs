/// Failures on the event bus side of the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum EventError {
    #[error("event channel `{0}` is not available")]
    ChannelUnavailable(String),

    #[error("could not serialize payload: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("event bus for channel `{0}` has shut down")]
    Disconnected(String),
}

/// Why an inbound payload could not be turned into a sample.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("payload is missing field `{0}`")]
    MissingField(&'static str),

    #[error("payload field `{0}` is not a number")]
    NonNumeric(&'static str),
}

#[derive(Debug, thiserror::Error)]
pub enum SubscriptionError {
    #[error("a subscription to `{0}` is already active")]
    AlreadyActive(String),

    #[error(transparent)]
    Channel(#[from] EventError),
}

impl EventError {
    pub(crate) fn unavailable<S: Into<String>>(channel: S) -> Self {
        EventError::ChannelUnavailable(channel.into())
    }

    pub(crate) fn disconnected<S: Into<String>>(channel: S) -> Self {
        EventError::Disconnected(channel.into())
    }
}
