use thiserror::Error;

/// Failure of a model evaluation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    /// Redshift outside the model domain (non-finite or negative).
    #[error("redshift z={z} is outside the model domain (finite z >= 0 required)")]
    Domain { z: f64 },

    /// Matter density outside `[0, 1]`.
    #[error("matter density omega_m={omega_m} must be finite and within [0, 1]")]
    InvalidOmegaM { omega_m: f64 },

    /// The bracket search never produced a sign change.
    #[error("no sign change of g(w; z) for z={z} after {attempts} bracket widenings and full-domain fallback")]
    NoBracket { z: f64, attempts: usize },

    /// Brent's method ran out of iterations.
    #[error("root search for z={z} did not converge within {max_iter} iterations (last w={w})")]
    NotConverged { z: f64, w: f64, max_iter: usize },

    /// A non-finite intermediate value escaped the clamping discipline.
    #[error("non-finite {stage} for z={z}")]
    Degenerate { z: f64, stage: &'static str },

    /// A batch element failed.
    #[error("element {index}: {source}")]
    Element {
        index: usize,
        #[source]
        source: Box<ModelError>,
    },
}

/// Coarse error taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Domain,
    Convergence,
    Degeneracy,
}

impl ModelError {
    pub fn at(self, index: usize) -> Self {
        ModelError::Element {
            index,
            source: Box::new(self),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ModelError::Domain { .. } | ModelError::InvalidOmegaM { .. } => ErrorKind::Domain,
            ModelError::NoBracket { .. } | ModelError::NotConverged { .. } => ErrorKind::Convergence,
            ModelError::Degenerate { .. } => ErrorKind::Degeneracy,
            ModelError::Element { source, .. } => source.kind(),
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<ModelError> for AppError {
    fn from(err: ModelError) -> Self {
        let code = match err.kind() {
            ErrorKind::Domain => 2,
            ErrorKind::Convergence | ErrorKind::Degeneracy => 4,
        };
        AppError::new(code, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_errors_keep_their_kind() {
        let err = ModelError::NoBracket { z: 3.0, attempts: 50 }.at(7);
        assert_eq!(err.kind(), ErrorKind::Convergence);
        assert!(err.to_string().starts_with("element 7: "));
    }

    #[test]
    fn domain_errors_map_to_input_exit_code() {
        let app: AppError = ModelError::Domain { z: -2.0 }.into();
        assert_eq!(app.exit_code(), 2);
        let app: AppError = ModelError::Degenerate { z: 1.0, stage: "E2" }.into();
        assert_eq!(app.exit_code(), 4);
    }
}
