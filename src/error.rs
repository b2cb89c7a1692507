use thiserror::Error;

/// Errors raised by cosmology construction, evaluation and root finding.
///
/// Every variant carries enough context to name the offending parameter or
/// redshift and the physical reason.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CosmologyError {
    /// A constructor argument or override violates a physical constraint.
    #[error("invalid parameter {field}: {reason}")]
    Validation { field: String, reason: String },

    /// An override names a parameter this cosmology class does not have.
    #[error("{model} has no parameter named `{key}`")]
    UnknownParameter { key: String, model: String },

    /// The request lies outside the physical domain (z < -1, negative E², unset Ob0, ...).
    #[error("{reason}")]
    Domain { reason: String },

    /// A computation produced NaN/Inf or an iterative method hit its bound.
    #[error("numerical failure: {reason}")]
    Numerical { reason: String },

    /// `f(z) - target` never changes sign inside the search bracket.
    #[error(
        "no redshift in [{zmin}, {zmax}] reaches target {target}: the function spans [{fmin}, {fmax}] there"
    )]
    RootNotFound {
        target: f64,
        zmin: f64,
        zmax: f64,
        fmin: f64,
        fmax: f64,
    },

    /// More than one redshift reaches the target; narrow `zmin`/`zmax`.
    #[error(
        "target {target} is reached at {} redshifts (brackets {}); pass zmin/zmax to select one",
        .brackets.len(),
        format_brackets(.brackets)
    )]
    RootAmbiguous {
        target: f64,
        brackets: Vec<(f64, f64)>,
    },

    /// Per-element failures of an array-valued call.
    #[error("{} of {total} elements failed: {}", .failures.len(), format_failures(.failures))]
    Batch {
        failures: Vec<(usize, CosmologyError)>,
        total: usize,
    },
}

impl CosmologyError {
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn domain(reason: impl Into<String>) -> Self {
        Self::Domain {
            reason: reason.into(),
        }
    }

    pub fn numerical(reason: impl Into<String>) -> Self {
        Self::Numerical {
            reason: reason.into(),
        }
    }

    /// Whether this error means "no value exists here" rather than "the computation broke".
    pub fn is_domain(&self) -> bool {
        matches!(self, Self::Domain { .. })
    }
}

fn format_brackets(brackets: &[(f64, f64)]) -> String {
    let parts: Vec<String> = brackets
        .iter()
        .map(|(lo, hi)| format!("[{lo:.4}, {hi:.4}]"))
        .collect();
    parts.join(", ")
}

fn format_failures(failures: &[(usize, CosmologyError)]) -> String {
    let parts: Vec<String> = failures
        .iter()
        .map(|(idx, err)| format!("[{idx}] {err}"))
        .collect();
    parts.join("; ")
}

pub type Result<T> = std::result::Result<T, CosmologyError>;

/// A quadrature that stopped before meeting its tolerance.
///
/// Not an error: the best-effort value is still returned, and the warning
/// is reported through `tracing`.
#[derive(Debug, Clone, PartialEq)]
pub struct IntegrationWarning {
    pub what: &'static str,
    pub z: f64,
    pub value: f64,
    pub abs_error: f64,
}

impl IntegrationWarning {
    pub fn emit(&self) {
        tracing::warn!(
            what = self.what,
            z = self.z,
            value = self.value,
            abs_error = self.abs_error,
            "integration did not converge; returning best estimate"
        );
    }
}

impl std::fmt::Display for IntegrationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} at z={} did not converge: value {} with estimated error {}",
            self.what, self.z, self.value, self.abs_error
        )
    }
}

/// Error surfaced by the `cosmo` binary, carrying its process exit code.
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

impl From<CosmologyError> for AppError {
    fn from(err: CosmologyError) -> Self {
        let exit_code = match &err {
            CosmologyError::Validation { .. }
            | CosmologyError::UnknownParameter { .. }
            | CosmologyError::Domain { .. } => 2,
            CosmologyError::RootNotFound { .. } | CosmologyError::RootAmbiguous { .. } => 3,
            CosmologyError::Numerical { .. } | CosmologyError::Batch { .. } => 4,
        };
        Self::new(exit_code, err.to_string())
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
    fn batch_message_lists_each_index() {
        let err = CosmologyError::Batch {
            failures: vec![
                (1, CosmologyError::domain("redshift z=-2 is below -1")),
                (3, CosmologyError::domain("redshift z=-5 is below -1")),
            ],
            total: 4,
        };
        let msg = err.to_string();
        assert!(msg.starts_with("2 of 4 elements failed"));
        assert!(msg.contains("[1] redshift z=-2"));
        assert!(msg.contains("[3] redshift z=-5"));
    }

    #[test]
    fn app_error_exit_codes_follow_error_class() {
        let not_found = CosmologyError::RootNotFound {
            target: 1.0,
            zmin: 0.0,
            zmax: 1.0,
            fmin: 2.0,
            fmax: 3.0,
        };
        assert_eq!(AppError::from(not_found).exit_code(), 3);
        assert_eq!(AppError::from(CosmologyError::validation("H0", "must be > 0")).exit_code(), 2);
        assert_eq!(AppError::from(CosmologyError::numerical("NaN")).exit_code(), 4);
    }
}
