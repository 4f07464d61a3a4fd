use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AssemblyError {
    #[error("Malformed input: {message}")]
    MalformedInput { message: String },

    #[error("Structure boxes overlap too much: ratio {ratio:.3} exceeds reject threshold {threshold:.3}")]
    ExcessiveOverlap { ratio: f64, threshold: f64 },

    #[error("Invalid cell merger: {message}")]
    InvalidMerge { message: String },

    #[error("Invalid assembly configuration: {message}")]
    InvalidConfig { message: String },
}

impl AssemblyError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        AssemblyError::MalformedInput {
            message: message.into(),
        }
    }
}
