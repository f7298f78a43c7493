use crate::constants::{EVENTS_ENDPOINT, SUBSCRIBE_ENDPOINT};
use crate::subscribe::error::SubscribeError;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// What the endpoint answers to the sidecar's `GET /dapr/subscribe` probe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionDescriptor {
    #[serde(rename = "pubsubname")]
    pub pubsub_name: String,
    pub topic: String,
    pub route: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

impl SubscriptionDescriptor {
    /// Non-empty routing rules replace the default events route with their JSON text.
    pub fn new(
        pubsub_name: impl Into<String>,
        topic: impl Into<String>,
        metadata: Map<String, Value>,
        routes: Option<&RoutingRules>,
    ) -> Result<Self, SubscribeError> {
        let route = match routes.filter(|rules| !rules.is_empty()) {
            Some(rules) => rules.to_route()?,
            None => EVENTS_ENDPOINT.to_string(),
        };

        Ok(Self {
            pubsub_name: pubsub_name.into(),
            topic: topic.into(),
            route,
            metadata,
        })
    }
}

/// User supplied routing rules, kept as the exact JSON they were given in.
///
/// ```json
/// {"rules": [{"match": "event.type == 'widget'", "path": "/widgets"}], "default": "/products"}
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RoutingRules(Value);

impl RoutingRules {
    pub fn new(rules: Value) -> Self {
        Self(rules)
    }

    pub fn parse(text: &str) -> Result<Self, SubscribeError> {
        serde_json::from_str(text)
            .map(Self)
            .map_err(SubscribeError::Routes)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        match &self.0 {
            Value::Null => true,
            Value::Object(map) => map.is_empty(),
            Value::Array(items) => items.is_empty(),
            Value::String(text) => text.is_empty(),
            _ => false,
        }
    }

    pub fn to_route(&self) -> Result<String, SubscribeError> {
        serde_json::to_string(&self.0).map_err(SubscribeError::Routes)
    }

    /// Literal paths named by the rules (`rules[].path` and `default`), in order of appearance.
    pub fn paths(&self) -> Vec<String> {
        let rule_paths = self
            .0
            .get("rules")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(|rule| rule.get("path").and_then(Value::as_str));
        let default_path = self.0.get("default").and_then(Value::as_str);

        rule_paths
            .chain(default_path)
            .filter(|path| is_literal_route(path))
            .map(str::to_string)
            .unique()
            .collect()
    }
}

/// Routes the events handler is mounted on: the default events route, then any rule paths.
pub fn event_routes(routes: Option<&RoutingRules>) -> Vec<String> {
    std::iter::once(EVENTS_ENDPOINT.to_string())
        .chain(routes.map(RoutingRules::paths).unwrap_or_default())
        .filter(|path| path != SUBSCRIBE_ENDPOINT)
        .unique()
        .collect()
}

/// A plain `/a/b` path the router can mount without treating parts of it as captures.
fn is_literal_route(path: &str) -> bool {
    path.starts_with('/')
        && !path.contains(|c| c == '{' || c == '}')
        && path
            .split('/')
            .all(|segment| !segment.starts_with(':') && !segment.starts_with('*'))
}

/// Parses `--metadata`; it has to be a JSON object.
pub fn parse_metadata(text: &str) -> Result<Map<String, Value>, SubscribeError> {
    match serde_json::from_str(text) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(SubscribeError::Metadata(format!(
            "expected a JSON object, got {}",
            other
        ))),
        Err(e) => Err(SubscribeError::Metadata(e.to_string())),
    }
}
