use log::error;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum AppError {
    #[error("Missing config with key \"{key}\"")]
    MissingConfig { key: String },

    #[error("Invalid value for config \"{key}\": {reason}")]
    InvalidConfig { key: String, reason: String },

    #[error("Configuration error: {msg}")]
    ConfigurationError { msg: String },
}

impl AppError {
    /// Logs an unexpected error under a fresh reference id and returns the id.
    ///
    /// The id is meant to be shown to the user so the log line can be found later.
    pub fn log_with_ref(err: &dyn std::fmt::Display) -> String {
        let ref_id = Uuid::new_v4().simple().to_string()[..8].to_string();
        error!("[ref {ref_id}] {err}");
        ref_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_with_ref_returns_short_id() {
        let ref_id = AppError::log_with_ref(&"boom");
        assert_eq!(ref_id.len(), 8);
        assert!(ref_id.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
