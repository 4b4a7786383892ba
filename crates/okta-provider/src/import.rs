//! Import identifiers of the form `<policy_id>/<rule_id>`.

use std::fmt;
use std::str::FromStr;

use crate::error::ProviderError;

/// Parent policy and rule identifiers of an existing rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportId {
    pub policy_id: String,
    pub rule_id: String,
}

impl FromStr for ImportId {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('/').collect();
        match parts.as_slice() {
            [policy_id, rule_id] if !policy_id.is_empty() && !rule_id.is_empty() => Ok(Self {
                policy_id: (*policy_id).to_string(),
                rule_id: (*rule_id).to_string(),
            }),
            _ => Err(ProviderError::invalid_import_id(s)),
        }
    }
}

impl fmt::Display for ImportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.policy_id, self.rule_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_import_id() {
        let id: ImportId = "00p1/0pr1".parse().unwrap();
        assert_eq!(id.policy_id, "00p1");
        assert_eq!(id.rule_id, "0pr1");
        assert_eq!(id.to_string(), "00p1/0pr1");
    }

    #[test]
    fn test_reject_malformed_import_ids() {
        for raw in ["", "0pr1", "00p1/", "/0pr1", "a/b/c", "/"] {
            let err = raw.parse::<ImportId>().unwrap_err();
            assert!(
                matches!(err, ProviderError::InvalidImportId { ref id } if id == raw),
                "{raw:?} should be rejected"
            );
        }
    }
}
