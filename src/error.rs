use std::process::ExitStatus;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum UpperError {
    #[error("`{command}` failed ({status})")]
    CommandFailed { command: String, status: ExitStatus },

    #[error("`{command}` produced no output to parse")]
    MissingOutput { command: String },

    #[error("Unexpected output from `{command}`: {reason}")]
    UnexpectedOutput { command: String, reason: String },

    #[error("Failed to execute `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Output of `{command}` is not valid UTF-8")]
    InvalidUtf8 {
        command: String,
        #[source]
        source: std::string::FromUtf8Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl UpperError {
    /// Whether the error means the environment or a tool misbehaved, as
    /// opposed to a package manager reporting an ordinary failure.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            UpperError::CommandFailed { .. } | UpperError::MissingOutput { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, UpperError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command;

    #[test]
    fn command_failures_are_not_fatal() {
        let status = Command::new("sh").args(["-c", "exit 3"]).status().unwrap();
        let err = UpperError::CommandFailed {
            command: "snap refresh".to_string(),
            status,
        };
        assert!(!err.is_fatal());
        assert!(err.to_string().contains("snap refresh"));

        let err = UpperError::MissingOutput {
            command: "npm outdated".to_string(),
        };
        assert!(!err.is_fatal());
    }

    #[test]
    fn shape_and_environment_errors_are_fatal() {
        let err = UpperError::UnexpectedOutput {
            command: "npm outdated".to_string(),
            reason: "expected a JSON object".to_string(),
        };
        assert!(err.is_fatal());

        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(UpperError::from(json_err).is_fatal());

        let err = UpperError::Spawn {
            command: "/usr/bin/nope".to_string(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert!(err.is_fatal());
    }
}
