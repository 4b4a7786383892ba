//! Error types for the provider.
//!
//! [`ProviderError`] is what resource hooks return to the host. Client
//! failures are folded in through `From<ApiError>`, which keeps "rate
//! limited" as its own variant. A 404 becomes [`ProviderError::NotFound`]
//! only through [`ProviderError::from_api`], where the caller names the rule.

use okta_client::ApiError;

/// Errors raised while validating or converting flat state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// The field is not declared by the resource schema.
    #[error("Unknown field '{field}'")]
    UnknownField {
        /// Name of the offending field.
        field: String,
    },

    /// The value does not have the shape declared for the field.
    #[error("Field '{field}' expects {expected}, got {found}")]
    ShapeMismatch {
        /// Name of the offending field.
        field: String,
        /// Declared shape.
        expected: String,
        /// Shape of the supplied value.
        found: String,
    },

    /// A required field has no value.
    #[error("Missing required field '{field}'")]
    MissingRequired {
        /// Name of the missing field.
        field: String,
    },

    /// The value is outside the field's allowed set.
    #[error("Invalid value '{value}' for '{field}', expected one of {allowed}")]
    InvalidValue {
        /// Name of the offending field, `field.key` for record members.
        field: String,
        /// The rejected value.
        value: String,
        /// Rendered list of accepted values.
        allowed: String,
    },

    /// The input document is not a JSON object.
    #[error("Invalid state document: {0}")]
    InvalidDocument(String),
}

impl SchemaError {
    /// Creates a new `UnknownField` error.
    #[must_use]
    pub fn unknown_field(field: impl Into<String>) -> Self {
        Self::UnknownField {
            field: field.into(),
        }
    }

    /// Creates a new `ShapeMismatch` error.
    #[must_use]
    pub fn shape_mismatch(
        field: impl Into<String>,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self::ShapeMismatch {
            field: field.into(),
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Creates a new `MissingRequired` error.
    #[must_use]
    pub fn missing_required(field: impl Into<String>) -> Self {
        Self::MissingRequired {
            field: field.into(),
        }
    }
}

/// Errors raised while loading or validating provider configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The configuration sources could not be read or deserialized.
    #[error("Failed to load configuration: {0}")]
    Load(String),

    /// The configuration was read but is not usable.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Errors returned by resource hooks.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The remote object does not exist.
    #[error("Resource not found: {id}")]
    NotFound {
        /// Identifier of the missing object.
        id: String,
    },

    /// The API kept throttling until the retry budget ran out.
    #[error("Rate limited by the Okta API after {attempts} attempt(s)")]
    RateLimited {
        /// Total attempts made.
        attempts: u32,
    },

    /// Any other failure talking to the API.
    #[error("Okta API error: {0}")]
    Transport(ApiError),

    /// The main write succeeded but the follow-up status change did not.
    #[error("Rule {id} was written but setting status to {desired} failed")]
    PartialReconciliation {
        /// Identifier captured from the main write.
        id: String,
        /// Status that could not be applied.
        desired: String,
        /// Failure of the status call.
        #[source]
        source: ApiError,
    },

    /// The flat state failed validation.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// An import identifier did not have the expected form.
    #[error("Invalid import id '{id}', expected <policy_id>/<rule_id>")]
    InvalidImportId {
        /// The rejected identifier.
        id: String,
    },

    /// The hook needs an identifier the resource data does not carry.
    #[error("Resource data has no {what}")]
    MissingId {
        /// Which identifier is missing, e.g. `rule id` or `policyid`.
        what: String,
    },

    /// No handler is registered for the resource type.
    #[error("Unknown resource type '{name}'")]
    UnknownResourceType {
        /// The requested type name.
        name: String,
    },

    /// Provider configuration is missing or invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ProviderError {
    /// Creates a new `NotFound` error.
    #[must_use]
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// Creates a new `MissingId` error.
    #[must_use]
    pub fn missing_id(what: impl Into<String>) -> Self {
        Self::MissingId { what: what.into() }
    }

    /// Creates a new `InvalidImportId` error.
    #[must_use]
    pub fn invalid_import_id(id: impl Into<String>) -> Self {
        Self::InvalidImportId { id: id.into() }
    }

    /// Returns `true` if the remote object does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` if the error came from exhausted rate-limit retries.
    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }

    /// Maps a client error from a call addressed to rule `id`.
    ///
    /// A 404 here means the rule itself is gone. Everywhere else a 404 stays
    /// a [`ProviderError::Transport`] error, since the missing object may be
    /// the parent policy.
    #[must_use]
    pub fn from_api(err: ApiError, id: &str) -> Self {
        match err {
            ApiError::NotFound { .. } => Self::not_found(id),
            other => other.into(),
        }
    }
}

impl From<ApiError> for ProviderError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::RateLimited { attempts } => Self::RateLimited { attempts },
            other => Self::Transport(other),
        }
    }
}

/// Result alias for provider hooks.
pub type ProviderResult<T> = Result<T, ProviderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_errors_keep_their_class() {
        let err: ProviderError = ApiError::RateLimited { attempts: 6 }.into();
        assert!(matches!(err, ProviderError::RateLimited { attempts: 6 }));

        let err: ProviderError = ApiError::network("reset").into();
        assert!(matches!(err, ProviderError::Transport(ApiError::Network(_))));
    }

    #[test]
    fn test_unaddressed_not_found_stays_transport() {
        let err: ProviderError =
            ApiError::not_found("Not found: Resource not found: 00p1 (Policy)").into();
        assert!(!err.is_not_found());
        assert!(matches!(err, ProviderError::Transport(ApiError::NotFound { .. })));
    }

    #[test]
    fn test_from_api_names_the_object() {
        let err = ProviderError::from_api(ApiError::not_found("gone"), "00p1/0pr1");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Resource not found: 00p1/0pr1");
    }

    #[test]
    fn test_rate_limit_message() {
        let err = ProviderError::RateLimited { attempts: 6 };
        assert_eq!(err.to_string(), "Rate limited by the Okta API after 6 attempt(s)");
        assert!(err.is_rate_limited());
    }
}
