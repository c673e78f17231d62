use shopdesk_client::ApiError;
use shopdesk_core::ClientError;
use thiserror::Error;

/// Errors raised by the notification and order-status operations.
///
/// `Display` is the user-facing message: for API failures it is the
/// server-supplied message when one exists, else the operation's fallback.
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("{message}")]
    Api {
        message: String,
        #[source]
        source: ApiError,
    },

    #[error("Unable to find order")]
    OrderNotFound(String),

    #[error("Workspace ID is missing")]
    MissingWorkspace,

    #[error("{0}")]
    Channel(String),
}

impl NotifyError {
    /// Wrap an API failure, preferring the server's message over `fallback`.
    pub fn api(fallback: &str, source: ApiError) -> Self {
        let message = source
            .server_message()
            .map(str::to_string)
            .unwrap_or_else(|| fallback.to_string());
        NotifyError::Api { message, source }
    }
}

impl From<NotifyError> for ClientError {
    fn from(e: NotifyError) -> Self {
        let message = e.to_string();
        match e {
            NotifyError::Api { .. } => ClientError::Api(message),
            NotifyError::OrderNotFound(_) => ClientError::NotFound(message),
            NotifyError::MissingWorkspace => ClientError::Validation(message),
            NotifyError::Channel(_) => ClientError::Channel(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_prefers_server_message() {
        let e = NotifyError::api(
            "Failed to update order status",
            ApiError::Server { status: 409, message: "Order already delivered".into() },
        );
        assert_eq!(e.to_string(), "Order already delivered");
    }

    #[test]
    fn api_falls_back_without_server_message() {
        let e = NotifyError::api("Failed to mark notification as read", ApiError::Decode("bad".into()));
        assert_eq!(e.to_string(), "Failed to mark notification as read");

        let empty = NotifyError::api("fallback", ApiError::Server { status: 500, message: String::new() });
        assert_eq!(empty.to_string(), "fallback");
    }

    #[test]
    fn converts_to_client_error_codes() {
        let e: ClientError = NotifyError::MissingWorkspace.into();
        assert_eq!(e.error_code(), "VALIDATION_FAILED");
        assert_eq!(e.to_string(), "Workspace ID is missing");

        let e: ClientError = NotifyError::OrderNotFound("o1".into()).into();
        assert_eq!(e.error_code(), "NOT_FOUND");

        let e: ClientError = NotifyError::api("x", ApiError::Auth("expired".into())).into();
        assert_eq!(e.error_code(), "API_ERROR");

        let e: ClientError = NotifyError::Channel("not attached".into()).into();
        assert_eq!(e.error_code(), "CHANNEL_ERROR");
    }
}
