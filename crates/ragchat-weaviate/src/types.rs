// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Weaviate REST and GraphQL payloads.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Body of `POST /v1/graphql`.
#[derive(Debug, Clone, Serialize)]
pub struct GraphQlRequest {
    pub query: String,
}

impl GraphQlRequest {
    /// `Get` query returning `text` and certainty of the `limit` objects of
    /// `class_name` nearest to `vector`.
    ///
    /// Callers must pass finite components and a valid GraphQL identifier.
    pub fn near_vector(class_name: &str, vector: &[f32], limit: usize) -> Self {
        let components = vector
            .iter()
            .map(f32::to_string)
            .collect::<Vec<_>>()
            .join(",");
        Self {
            query: format!(
                "{{ Get {{ {class_name}(nearVector: {{vector: [{components}]}}, limit: {limit}) {{ text _additional {{ certainty }} }} }} }}"
            ),
        }
    }
}

/// Response of `POST /v1/graphql`.
///
/// `data.Get` maps the class name to its hits; the shape is left loose so a
/// missing class can be detected instead of failing deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GraphQlResponse {
    #[serde(default)]
    pub data: Option<GraphQlData>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GraphQlData {
    #[serde(rename = "Get", default)]
    pub get: Option<HashMap<String, Option<Vec<serde_json::Value>>>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlError {
    #[serde(default)]
    pub message: String,
}

/// One hit of a `nearVector` query.
#[derive(Debug, Clone, Deserialize)]
pub struct Hit {
    pub text: String,
    #[serde(rename = "_additional", default)]
    pub additional: Option<Additional>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Additional {
    #[serde(default)]
    pub certainty: Option<f64>,
}

/// Body of `POST /v1/objects`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateObject<'a> {
    pub class: &'a str,
    pub id: String,
    pub properties: ObjectProperties<'a>,
    pub vector: &'a [f32],
}

#[derive(Debug, Clone, Serialize)]
pub struct ObjectProperties<'a> {
    pub text: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn near_vector_query_shape() {
        let req = GraphQlRequest::near_vector("Document", &[0.5, -1.0, 0.25], 3);
        assert_eq!(
            req.query,
            "{ Get { Document(nearVector: {vector: [0.5,-1,0.25]}, limit: 3) { text _additional { certainty } } } }"
        );
    }

    #[test]
    fn hits_parse_with_certainty() {
        let resp: GraphQlResponse = serde_json::from_value(serde_json::json!({
            "data": {"Get": {"Document": [
                {"text": "a", "_additional": {"certainty": 0.91}},
                {"text": "b", "_additional": {"certainty": null}}
            ]}}
        }))
        .unwrap();
        let hits = resp.data.unwrap().get.unwrap().remove("Document").unwrap().unwrap();
        let first: Hit = serde_json::from_value(hits[0].clone()).unwrap();
        assert_eq!(first.text, "a");
        assert_eq!(first.additional.unwrap().certainty, Some(0.91));
    }

    #[test]
    fn errors_parse_without_data() {
        let resp: GraphQlResponse = serde_json::from_value(serde_json::json!({
            "errors": [{"message": "Cannot query field \"Docs\""}]
        }))
        .unwrap();
        assert!(resp.data.is_none());
        assert_eq!(resp.errors.len(), 1);
    }
}
