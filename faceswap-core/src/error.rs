use std::{fmt, path::PathBuf};

use thiserror::Error;

/// Which input image a failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageRole {
    Source,
    Target,
}

impl fmt::Display for ImageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ImageRole::Source => "source",
            ImageRole::Target => "target",
        })
    }
}

/// Failures surfaced to the user by the swap pipeline. None of them are retried.
#[derive(Debug, Error)]
pub enum SwapError {
    #[error("no face detected in the {role} image")]
    NoFaceDetected { role: ImageRole },

    #[error("unsupported or unreadable image {}: {reason}", path.display())]
    UnsupportedFormat { path: PathBuf, reason: String },

    #[error("model unavailable at {}: {reason}", path.display())]
    ModelUnavailable { path: PathBuf, reason: String },

    #[error("face swap failed: {0}")]
    SwapFailed(String),

    #[error("failed to write result to {}: {reason}", path.display())]
    Output { path: PathBuf, reason: String },
}

impl SwapError {
    /// Short message suitable for a dialog or status line.
    pub fn user_message(&self) -> String {
        match self {
            SwapError::NoFaceDetected { role } => format!(
                "No face could be found in the {role} image. Try a clearer, front-facing photo."
            ),
            other => other.to_string(),
        }
    }

    pub(crate) fn swap_failed(err: anyhow::Error) -> Self {
        SwapError::SwapFailed(format!("{err:#}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_role_and_path() {
        let err = SwapError::NoFaceDetected {
            role: ImageRole::Target,
        };
        assert_eq!(err.to_string(), "no face detected in the target image");
        assert!(err.user_message().contains("target image"));

        let err = SwapError::ModelUnavailable {
            path: PathBuf::from("models/inswapper_128.onnx"),
            reason: "model file not found".into(),
        };
        assert!(err.to_string().contains("models/inswapper_128.onnx"));
    }

    #[test]
    fn swap_failed_keeps_context_chain() {
        let err = anyhow::anyhow!("inner").context("outer");
        let message = SwapError::swap_failed(err).to_string();
        assert!(message.contains("outer") && message.contains("inner"));
    }
}
