//! Field table for `okta_policy_rule_idp_discovery`.

use crate::schema::{FieldSchema, Kind, RecordField, ResourceSchema, Shape};

pub const TYPE_NAME: &str = "okta_policy_rule_idp_discovery";

pub const POLICY_ID: &str = "policyid";
pub const NAME: &str = "name";
pub const STATUS: &str = "status";
pub const PRIORITY: &str = "priority";
pub const NETWORK_CONNECTION: &str = "network_connection";
pub const NETWORK_INCLUDES: &str = "network_includes";
pub const NETWORK_EXCLUDES: &str = "network_excludes";
pub const IDP_ID: &str = "idp_id";
pub const IDP_TYPE: &str = "idp_type";
pub const APP_INCLUDE: &str = "app_include";
pub const APP_EXCLUDE: &str = "app_exclude";
pub const PLATFORM_INCLUDE: &str = "platform_include";
pub const USER_IDENTIFIER_TYPE: &str = "user_identifier_type";
pub const USER_IDENTIFIER_ATTRIBUTE: &str = "user_identifier_attribute";
pub const USER_IDENTIFIER_PATTERNS: &str = "user_identifier_patterns";

// Record members of `platform_include`.
pub const PLATFORM_TYPE: &str = "type";
pub const OS_TYPE: &str = "os_type";
pub const OS_EXPRESSION: &str = "os_expression";

// Record members of `user_identifier_patterns`.
pub const MATCH_TYPE: &str = "match_type";
pub const VALUE: &str = "value";

pub const ANY: &str = "ANY";
pub const DEFAULT_IDP_TYPE: &str = "OKTA";

pub const STATUSES: &[&str] = &["ACTIVE", "INACTIVE"];
pub const NETWORK_CONNECTIONS: &[&str] = &["ANYWHERE", "ZONE", "ON_NETWORK", "OFF_NETWORK"];
pub const PLATFORM_TYPES: &[&str] = &["ANY", "MOBILE", "DESKTOP"];
pub const OS_TYPES: &[&str] = &["ANY", "IOS", "WINDOWS", "ANDROID", "OTHER", "OSX"];
pub const USER_IDENTIFIER_TYPES: &[&str] = &["IDENTIFIER", "ATTRIBUTE", ""];
pub const MATCH_TYPES: &[&str] = &["SUFFIX", "EQUALS", "STARTS_WITH", "CONTAINS", "EXPRESSION", ""];

const PLATFORM_MEMBERS: &[RecordField] = &[
    RecordField::new(PLATFORM_TYPE)
        .with_default(ANY)
        .one_of(PLATFORM_TYPES),
    RecordField::new(OS_TYPE).with_default(ANY).one_of(OS_TYPES),
    RecordField::new(OS_EXPRESSION),
];

const PATTERN_MEMBERS: &[RecordField] = &[
    RecordField::new(MATCH_TYPE).one_of(MATCH_TYPES),
    RecordField::new(VALUE),
];

const STRING: Shape = Shape::Scalar(Kind::String);

pub static SCHEMA: ResourceSchema = ResourceSchema {
    type_name: TYPE_NAME,
    fields: &[
        FieldSchema::new(POLICY_ID, STRING, "Policy ID").required(),
        FieldSchema::new(NAME, STRING, "Policy Rule Name").required(),
        FieldSchema::new(STATUS, STRING, "Policy Rule Status: ACTIVE or INACTIVE.")
            .with_default("ACTIVE")
            .one_of(STATUSES),
        FieldSchema::new(
            PRIORITY,
            Shape::Scalar(Kind::Int),
            "Policy Rule Priority, this attribute can be set to a valid priority. \
             To avoid endless diff situation we error if an invalid priority is provided.",
        ),
        FieldSchema::new(NETWORK_CONNECTION, STRING, "Network selection mode")
            .with_default("ANYWHERE")
            .one_of(NETWORK_CONNECTIONS),
        FieldSchema::new(
            NETWORK_INCLUDES,
            Shape::List(Kind::String),
            "The network zones to include. Conflicts with network_excludes.",
        ),
        FieldSchema::new(
            NETWORK_EXCLUDES,
            Shape::List(Kind::String),
            "The network zones to exclude. Conflicts with network_includes.",
        ),
        FieldSchema::new(IDP_ID, STRING, "Identity provider to route matching users to"),
        FieldSchema::new(IDP_TYPE, STRING, "Type of the identity provider")
            .with_default(DEFAULT_IDP_TYPE),
        FieldSchema::new(APP_INCLUDE, Shape::Set(Kind::String), "Applications to include"),
        FieldSchema::new(APP_EXCLUDE, Shape::Set(Kind::String), "Applications to exclude"),
        FieldSchema::new(
            PLATFORM_INCLUDE,
            Shape::RecordSet(PLATFORM_MEMBERS),
            "Platforms the rule applies to",
        ),
        FieldSchema::new(USER_IDENTIFIER_TYPE, STRING, "IDENTIFIER or ATTRIBUTE")
            .one_of(USER_IDENTIFIER_TYPES),
        FieldSchema::new(
            USER_IDENTIFIER_ATTRIBUTE,
            STRING,
            "Profile attribute matched when user_identifier_type is ATTRIBUTE",
        ),
        FieldSchema::new(
            USER_IDENTIFIER_PATTERNS,
            Shape::RecordSet(PATTERN_MEMBERS),
            "Patterns matched against the user identifier",
        ),
    ],
};
