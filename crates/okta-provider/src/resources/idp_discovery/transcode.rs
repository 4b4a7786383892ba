//! Conversion between flat state and the nested API rule.
//!
//! [`build`] and [`flatten`] are pure and total. For any state produced by
//! `flatten`, `flatten(&build(&state))` yields the same state again.

use std::collections::BTreeSet;

use okta_client::models::{
    AppCondition, IDP_DISCOVERY, IdpAction, IdpDiscoveryRule, IdpProvider, NetworkCondition,
    PlatformCondition, PlatformInclude, PlatformOs, RuleActions, RuleConditions,
    UserIdentifierCondition, UserIdentifierPattern,
};

use super::schema::*;
use crate::state::{FieldValue, FlatState, Primitive, Record};

/// Builds the API payload for a rule from its flat state.
#[must_use]
pub fn build(state: &FlatState) -> IdpDiscoveryRule {
    IdpDiscoveryRule {
        id: None,
        kind: Some(IDP_DISCOVERY.to_string()),
        name: non_empty(state.get_str(NAME)),
        status: non_empty(state.get_str(STATUS)),
        priority: state.get_int(PRIORITY),
        system: None,
        conditions: Some(RuleConditions {
            app: build_app(state),
            network: build_network(state),
            platform: Some(PlatformCondition {
                include: Some(build_platforms(state)),
            }),
            user_identifier: build_user_identifier(state),
        }),
        actions: Some(RuleActions {
            idp: Some(IdpAction {
                providers: vec![IdpProvider {
                    kind: non_empty(state.get_str(IDP_TYPE)),
                    id: non_empty(state.get_str(IDP_ID)),
                }],
            }),
        }),
    }
}

/// Flattens an API rule into the fields it determines.
///
/// Every collection field is present in the result, empty when the payload
/// has nothing for it. `policyid` is not part of the payload and is left
/// out.
#[must_use]
pub fn flatten(rule: &IdpDiscoveryRule) -> FlatState {
    let conditions = rule.conditions.clone().unwrap_or_default();
    let app = conditions.app.unwrap_or_default();
    let network = conditions.network.unwrap_or_default();
    let user_identifier = conditions.user_identifier.unwrap_or_default();
    let provider = rule
        .actions
        .as_ref()
        .and_then(|actions| actions.idp.as_ref())
        .and_then(|idp| idp.providers.first())
        .cloned()
        .unwrap_or_default();

    let mut state = FlatState::new(&SCHEMA);
    state.put(NAME, text(rule.name.as_deref()));
    state.put(STATUS, text(rule.status.as_deref()));
    if let Some(priority) = rule.priority {
        state.put(PRIORITY, FieldValue::Scalar(Primitive::Int(priority)));
    }
    state.put(IDP_TYPE, text(provider.kind.as_deref()));
    state.put(IDP_ID, text(provider.id.as_deref()));

    state.put(APP_INCLUDE, FieldValue::string_set(app.include.unwrap_or_default()));
    state.put(APP_EXCLUDE, FieldValue::string_set(app.exclude.unwrap_or_default()));

    state.put(NETWORK_CONNECTION, text(network.connection.as_deref()));
    state.put(
        NETWORK_INCLUDES,
        FieldValue::string_list(network.include.unwrap_or_default()),
    );
    state.put(
        NETWORK_EXCLUDES,
        FieldValue::string_list(network.exclude.unwrap_or_default()),
    );

    let platforms = conditions
        .platform
        .and_then(|platform| platform.include)
        .unwrap_or_default();
    state.put(PLATFORM_INCLUDE, flatten_platforms(&platforms));

    state.put(USER_IDENTIFIER_TYPE, text(user_identifier.kind.as_deref()));
    state.put(
        USER_IDENTIFIER_ATTRIBUTE,
        text(user_identifier.attribute.as_deref()),
    );
    state.put(
        USER_IDENTIFIER_PATTERNS,
        flatten_patterns(&user_identifier.patterns.unwrap_or_default()),
    );

    state
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

fn text(value: Option<&str>) -> FieldValue {
    FieldValue::Scalar(Primitive::from(value.unwrap_or("")))
}

fn or_any(value: &str) -> String {
    let value = if value.is_empty() { ANY } else { value };
    value.to_string()
}

fn strings<'a>(items: impl IntoIterator<Item = &'a Primitive>) -> Vec<String> {
    items.into_iter().map(ToString::to_string).collect()
}

fn build_app(state: &FlatState) -> Option<AppCondition> {
    let include = state.get_set(APP_INCLUDE).map(|items| strings(items));
    let exclude = state.get_set(APP_EXCLUDE).map(|items| strings(items));
    (include.is_some() || exclude.is_some()).then_some(AppCondition { include, exclude })
}

fn build_network(state: &FlatState) -> Option<NetworkCondition> {
    let condition = NetworkCondition {
        connection: non_empty(state.get_str(NETWORK_CONNECTION)),
        include: state.get_list(NETWORK_INCLUDES).map(|items| strings(items)),
        exclude: state.get_list(NETWORK_EXCLUDES).map(|items| strings(items)),
    };
    (condition != NetworkCondition::default()).then_some(condition)
}

fn build_platforms(state: &FlatState) -> Vec<PlatformInclude> {
    state
        .get_records(PLATFORM_INCLUDE)
        .into_iter()
        .flatten()
        .map(|record| PlatformInclude {
            kind: or_any(record.get_str(PLATFORM_TYPE)),
            os: Some(PlatformOs {
                kind: or_any(record.get_str(OS_TYPE)),
                expression: record.get_str(OS_EXPRESSION).to_string(),
            }),
        })
        .collect()
}

fn build_user_identifier(state: &FlatState) -> Option<UserIdentifierCondition> {
    let condition = UserIdentifierCondition {
        attribute: non_empty(state.get_str(USER_IDENTIFIER_ATTRIBUTE)),
        kind: non_empty(state.get_str(USER_IDENTIFIER_TYPE)),
        patterns: state.get_records(USER_IDENTIFIER_PATTERNS).map(|records| {
            records
                .iter()
                .map(|record| UserIdentifierPattern {
                    match_type: record.get_str(MATCH_TYPE).to_string(),
                    value: record.get_str(VALUE).to_string(),
                })
                .collect()
        }),
    };
    (condition != UserIdentifierCondition::default()).then_some(condition)
}

fn flatten_platforms(platforms: &[PlatformInclude]) -> FieldValue {
    let records: BTreeSet<Record> = platforms
        .iter()
        .map(|platform| {
            let os = platform.os.clone().unwrap_or_default();
            Record::new()
                .with(PLATFORM_TYPE, or_any(&platform.kind))
                .with(OS_TYPE, or_any(&os.kind))
                .with(OS_EXPRESSION, os.expression)
        })
        .collect();
    FieldValue::RecordSet(records)
}

fn flatten_patterns(patterns: &[UserIdentifierPattern]) -> FieldValue {
    FieldValue::records(patterns.iter().map(|pattern| {
        Record::new()
            .with(MATCH_TYPE, pattern.match_type.as_str())
            .with(VALUE, pattern.value.as_str())
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config(doc: serde_json::Value) -> FlatState {
        FlatState::from_config(&SCHEMA, &doc).unwrap()
    }

    fn without_policy(mut state: FlatState) -> FlatState {
        state.remove(POLICY_ID);
        state
    }

    fn assert_round_trip(rule: IdpDiscoveryRule) {
        let first = flatten(&rule);
        let second = flatten(&build(&first));
        assert_eq!(first, second);
    }

    fn full_state() -> FlatState {
        config(json!({
            "policyid": "00p1",
            "name": "Route contractors",
            "status": "INACTIVE",
            "priority": 2,
            "network_connection": "ZONE",
            "network_includes": ["nzo2", "nzo1"],
            "network_excludes": [],
            "idp_id": "0oa9",
            "idp_type": "SAML2",
            "app_include": ["0oa1", "0oa2"],
            "app_exclude": [],
            "platform_include": [
                {"type": "MOBILE", "os_type": "IOS"},
                {"type": "DESKTOP", "os_type": "OTHER", "os_expression": "device.os == 'BeOS'"}
            ],
            "user_identifier_type": "ATTRIBUTE",
            "user_identifier_attribute": "login",
            "user_identifier_patterns": [
                {"match_type": "SUFFIX", "value": "contractor.example.com"},
                {"match_type": "EQUALS", "value": "ops@example.com"}
            ]
        }))
    }

    #[test]
    fn test_build_mobile_ios_with_empty_app_include() {
        let state = config(json!({
            "policyid": "00p1",
            "name": "r1",
            "status": "ACTIVE",
            "app_include": [],
            "platform_include": [{"type": "MOBILE", "os_type": "IOS"}]
        }));

        let rule = build(&state);
        let conditions = rule.conditions.clone().unwrap();
        assert_eq!(conditions.app.unwrap().include, Some(vec![]));
        assert_eq!(
            conditions.platform.unwrap().include,
            Some(vec![PlatformInclude {
                kind: "MOBILE".into(),
                os: Some(PlatformOs {
                    kind: "IOS".into(),
                    expression: String::new(),
                }),
            }])
        );

        let value = serde_json::to_value(&rule).unwrap();
        assert_eq!(value["conditions"]["app"], json!({"include": []}));
        assert_eq!(
            value["conditions"]["platform"],
            json!({"include": [{"type": "MOBILE", "os": {"type": "IOS", "expression": ""}}]})
        );
    }

    #[test]
    fn test_build_absent_app_include_is_omitted() {
        let rule = build(&config(json!({"policyid": "00p1", "name": "r1"})));
        let value = serde_json::to_value(&rule).unwrap();

        assert!(value["conditions"].get("app").is_none());
        assert_eq!(value["conditions"]["platform"], json!({"include": []}));
        assert!(value["conditions"].get("userIdentifier").is_none());
    }

    #[test]
    fn test_build_scalars_and_defaults() {
        let rule = build(&config(json!({"policyid": "00p1", "name": "r1"})));

        assert_eq!(rule.kind.as_deref(), Some(IDP_DISCOVERY));
        assert_eq!(rule.name.as_deref(), Some("r1"));
        assert_eq!(rule.status.as_deref(), Some("ACTIVE"));
        assert_eq!(rule.priority, None);
        assert_eq!(
            rule.conditions.unwrap().network.unwrap().connection.as_deref(),
            Some("ANYWHERE")
        );
        assert_eq!(
            rule.actions.unwrap().idp.unwrap().providers,
            vec![IdpProvider {
                kind: Some("OKTA".into()),
                id: None,
            }]
        );
    }

    #[test]
    fn test_build_omits_empty_strings() {
        let mut state = config(json!({"policyid": "00p1", "name": "r1"}));
        state.set(USER_IDENTIFIER_TYPE, "").unwrap();
        state.set(IDP_TYPE, "").unwrap();

        let value = serde_json::to_value(build(&state)).unwrap();
        assert!(value["conditions"].get("userIdentifier").is_none());
        assert_eq!(value["actions"]["idp"]["providers"], json!([{}]));
    }

    #[test]
    fn test_build_keeps_network_order() {
        let rule = build(&full_state());
        let network = rule.conditions.unwrap().network.unwrap();
        assert_eq!(network.include, Some(vec!["nzo2".into(), "nzo1".into()]));
        assert_eq!(network.exclude, Some(vec![]));
    }

    #[test]
    fn test_flatten_tolerates_missing_sections() {
        let state = flatten(&IdpDiscoveryRule {
            id: Some("0pr1".into()),
            name: Some("r1".into()),
            ..Default::default()
        });

        assert_eq!(state.get_str(NAME), Some("r1"));
        assert_eq!(state.get_str(STATUS), Some(""));
        assert_eq!(state.get_int(PRIORITY), None);
        assert_eq!(state.get_set(APP_INCLUDE).map(BTreeSet::len), Some(0));
        assert_eq!(state.get_set(APP_EXCLUDE).map(BTreeSet::len), Some(0));
        assert_eq!(state.get_list(NETWORK_INCLUDES).map(<[_]>::len), Some(0));
        assert_eq!(state.get_records(PLATFORM_INCLUDE).map(BTreeSet::len), Some(0));
        assert_eq!(
            state.get_records(USER_IDENTIFIER_PATTERNS).map(BTreeSet::len),
            Some(0)
        );
        assert!(!state.contains(POLICY_ID));
    }

    #[test]
    fn test_flatten_returns_computed_platforms() {
        let rule: IdpDiscoveryRule = serde_json::from_value(json!({
            "id": "0pr1",
            "conditions": {
                "platform": {"include": [
                    {"type": "MOBILE", "os": {"type": "ANDROID"}},
                    {"type": "DESKTOP"}
                ]}
            }
        }))
        .unwrap();

        let platforms = flatten(&rule).get_records(PLATFORM_INCLUDE).unwrap().clone();
        let expected: BTreeSet<Record> = [
            Record::new()
                .with(PLATFORM_TYPE, "MOBILE")
                .with(OS_TYPE, "ANDROID")
                .with(OS_EXPRESSION, ""),
            Record::new()
                .with(PLATFORM_TYPE, "DESKTOP")
                .with(OS_TYPE, "ANY")
                .with(OS_EXPRESSION, ""),
        ]
        .into_iter()
        .collect();
        assert_eq!(platforms, expected);
    }

    #[test]
    fn test_flatten_build_round_trip_full_state() {
        let state = without_policy(full_state());
        assert_eq!(flatten(&build(&state)), state);
    }

    #[test]
    fn test_round_trip_from_api_payloads() {
        assert_round_trip(IdpDiscoveryRule::default());

        assert_round_trip(
            serde_json::from_value(json!({
                "id": "0pr1",
                "type": "IDP_DISCOVERY",
                "name": "Default Rule",
                "status": "ACTIVE",
                "priority": 99,
                "system": true,
                "conditions": {
                    "network": {"connection": "ANYWHERE"},
                    "platform": null
                },
                "actions": {"idp": {"providers": [{"type": "OKTA"}]}}
            }))
            .unwrap(),
        );

        assert_round_trip(
            serde_json::from_value(json!({
                "id": "0pr2",
                "name": "r2",
                "conditions": {
                    "app": {"include": ["0oa1"]},
                    "platform": {"include": [{"type": "", "os": {"type": "OTHER", "expression": "x"}}]},
                    "userIdentifier": {"type": "IDENTIFIER", "patterns": [{"matchType": "CONTAINS", "value": "ext"}]}
                }
            }))
            .unwrap(),
        );
    }

    #[test]
    fn test_round_trip_preserves_empty_vs_populated() {
        let populated = flatten(&build(&without_policy(full_state())));
        assert_eq!(populated.get_set(APP_INCLUDE).map(BTreeSet::len), Some(2));
        assert_eq!(populated.get_set(APP_EXCLUDE).map(BTreeSet::len), Some(0));
    }
}
