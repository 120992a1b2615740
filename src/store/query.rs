//! DQL request building and response decoding for the field lookup.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::error::{StoreError, StoreResult};

/// Name of the GraphQL variable carrying the match value.
pub const LOOKUP_VARIABLE: &str = "$a";

/// Request body for `POST /query`.
#[derive(Debug, Serialize)]
pub struct QueryRequest<'a> {
    pub query: String,
    pub variables: HashMap<&'static str, &'a str>,
}

impl<'a> QueryRequest<'a> {
    /// Builds the lookup of any node whose `field` equals `value`.
    ///
    /// `namespace` and `field` are spliced into the query text and must be
    /// plain identifiers; `value` travels as a variable and is never spliced.
    pub fn lookup(
        namespace: &str,
        field: &str,
        value: &'a str,
        filter_by_type: bool,
    ) -> StoreResult<Self> {
        validate_identifier(namespace)?;
        validate_identifier(field)?;

        let type_filter = if filter_by_type {
            format!(" @filter(type({namespace}))")
        } else {
            String::new()
        };

        let query = format!(
            "query all({LOOKUP_VARIABLE}: string) {{ all(func: eq({field}, {LOOKUP_VARIABLE}), first: 1){type_filter} {{ uid }} }}"
        );

        let mut variables = HashMap::with_capacity(1);
        variables.insert(LOOKUP_VARIABLE, value);

        Ok(Self { query, variables })
    }
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    data: Option<LookupData>,
    #[serde(default)]
    errors: Vec<ServerError>,
}

#[derive(Debug, Deserialize)]
struct LookupData {
    #[serde(default)]
    all: Vec<UidNode>,
}

#[derive(Debug, Deserialize)]
struct UidNode {
    uid: String,
}

#[derive(Debug, Deserialize)]
struct ServerError {
    message: String,
}

/// Extracts the first matching uid from a `/query` response body.
pub fn parse_lookup_response(body: &[u8]) -> StoreResult<Option<String>> {
    let response: QueryResponse =
        serde_json::from_slice(body).map_err(|e| StoreError::Decode {
            message: e.to_string(),
        })?;

    if !response.errors.is_empty() {
        let message = response
            .errors
            .into_iter()
            .map(|e| e.message)
            .collect::<Vec<_>>()
            .join("; ");
        return Err(StoreError::Query { message });
    }

    let data = response.data.ok_or_else(|| StoreError::Decode {
        message: "response has neither data nor errors".to_string(),
    })?;

    Ok(data.all.into_iter().next().map(|node| node.uid))
}

/// Accepts names usable as DQL predicates and types.
pub fn validate_identifier(name: &str) -> StoreResult<()> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.');

    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidIdentifier {
            name: name.to_string(),
        })
    }
}
