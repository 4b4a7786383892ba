//! Wire models for Okta policy rules.
//!
//! Only the IdP discovery rule is modelled. Every nested structure is optional
//! on the way in because the API omits empty sections and sometimes returns
//! `null` for them.

use serde::{Deserialize, Serialize};

/// Rule type discriminator for IdP discovery rules.
pub const IDP_DISCOVERY: &str = "IDP_DISCOVERY";

/// Lifecycle status of a rule.
pub const STATUS_ACTIVE: &str = "ACTIVE";
/// Lifecycle status of a deactivated rule.
pub const STATUS_INACTIVE: &str = "INACTIVE";

/// An IdP discovery policy rule as sent to and returned by the API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdpDiscoveryRule {
    /// Server-assigned identifier; never sent on create.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    /// Evaluation order within the policy. Left out on write when unset so the
    /// server keeps its own assignment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,

    /// Set by the server for the built-in catch-all rule.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<RuleConditions>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actions: Option<RuleActions>,
}

/// Conditions block of an IdP discovery rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleConditions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app: Option<AppCondition>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<NetworkCondition>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<PlatformCondition>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_identifier: Option<UserIdentifierCondition>,
}

/// Application include/exclude lists.
///
/// `None` leaves the list untouched on the server; `Some(vec![])` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppCondition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<Vec<String>>,
}

/// Network zone condition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkCondition {
    /// `ANYWHERE`, `ZONE`, `ON_NETWORK` or `OFF_NETWORK`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<Vec<String>>,
}

/// Platform condition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformCondition {
    #[serde(default)]
    pub include: Option<Vec<PlatformInclude>>,
}

/// A single platform the rule applies to.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlatformInclude {
    /// `ANY`, `MOBILE` or `DESKTOP`.
    #[serde(rename = "type", default)]
    pub kind: String,

    #[serde(default)]
    pub os: Option<PlatformOs>,
}

/// Operating system matcher of a platform entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlatformOs {
    /// `ANY`, `IOS`, `WINDOWS`, `ANDROID`, `OTHER` or `OSX`.
    #[serde(rename = "type", default)]
    pub kind: String,

    /// Free-form expression, only meaningful for `OTHER`.
    #[serde(default)]
    pub expression: String,
}

/// User identifier condition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentifierCondition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,

    /// `IDENTIFIER` or `ATTRIBUTE`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patterns: Option<Vec<UserIdentifierPattern>>,
}

/// Pattern matched against the user identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdentifierPattern {
    /// `SUFFIX`, `EQUALS`, `STARTS_WITH`, `CONTAINS` or `EXPRESSION`.
    #[serde(default)]
    pub match_type: String,

    #[serde(default)]
    pub value: String,
}

/// Actions block of an IdP discovery rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleActions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idp: Option<IdpAction>,
}

/// Identity providers users are routed to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdpAction {
    #[serde(default)]
    pub providers: Vec<IdpProvider>,
}

/// Reference to an identity provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdpProvider {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl IdpDiscoveryRule {
    /// Returns the identifier if the server assigned a non-empty one.
    #[must_use]
    pub fn rule_id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_full_rule() {
        let value = json!({
            "id": "0pr1",
            "type": "IDP_DISCOVERY",
            "name": "Route contractors",
            "status": "ACTIVE",
            "priority": 2,
            "system": false,
            "conditions": {
                "app": {"include": ["0oa1"], "exclude": []},
                "network": {"connection": "ZONE", "include": ["nzo1"]},
                "platform": {"include": [{"type": "MOBILE", "os": {"type": "IOS"}}]},
                "userIdentifier": {
                    "type": "IDENTIFIER",
                    "patterns": [{"matchType": "SUFFIX", "value": "example.com"}]
                }
            },
            "actions": {"idp": {"providers": [{"type": "SAML2", "id": "0oa9"}]}}
        });

        let rule: IdpDiscoveryRule = serde_json::from_value(value).unwrap();
        assert_eq!(rule.rule_id(), Some("0pr1"));
        assert_eq!(rule.priority, Some(2));

        let conditions = rule.conditions.unwrap();
        let platform = conditions.platform.unwrap().include.unwrap();
        assert_eq!(platform[0].kind, "MOBILE");
        assert_eq!(platform[0].os.as_ref().unwrap().expression, "");
        let patterns = conditions.user_identifier.unwrap().patterns.unwrap();
        assert_eq!(patterns[0].match_type, "SUFFIX");
    }

    #[test]
    fn test_decode_null_sections() {
        let value = json!({
            "id": "0pr2",
            "conditions": {"platform": null, "userIdentifier": {"patterns": null}},
            "actions": null
        });

        let rule: IdpDiscoveryRule = serde_json::from_value(value).unwrap();
        let conditions = rule.conditions.unwrap();
        assert!(conditions.platform.is_none());
        assert!(conditions.user_identifier.unwrap().patterns.is_none());
        assert!(rule.actions.is_none());
    }

    #[test]
    fn test_empty_collection_is_serialized() {
        let conditions = RuleConditions {
            app: Some(AppCondition {
                include: Some(vec![]),
                exclude: None,
            }),
            ..Default::default()
        };

        let value = serde_json::to_value(&conditions).unwrap();
        assert_eq!(value, json!({"app": {"include": []}}));
    }

    #[test]
    fn test_empty_id_is_not_an_id() {
        let rule = IdpDiscoveryRule {
            id: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(rule.rule_id(), None);
    }
}
