// ABOUTME: Maps a resolved Value onto the external wire representation

use crate::error::EngineError;
use crate::value::Value;
use serde::{Deserialize, Serialize};

/// The outward-facing response of a `Query` call (§6).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ExternalValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResolveResponse {
    pub fn ok(value: ExternalValue) -> Self {
        ResolveResponse {
            result: Some(value),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        ResolveResponse {
            result: None,
            error: Some(message.into()),
        }
    }

    /// Builds a response from a `Query` result, mapping the success value
    /// and collapsing any mapping failure into an error response — a
    /// mapping error still aborts without a partial result (§7), it simply
    /// surfaces through the same `{ error }` channel as every other error.
    pub fn from_query_result(result: Result<Value, EngineError>) -> Self {
        match result.and_then(|v| to_external(&v)) {
            Ok(external) => ResolveResponse::ok(external),
            Err(e) => ResolveResponse::err(e.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExternalKind {
    Boolean,
    Number,
    String,
    List,
    Record,
    Lambda,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalValue {
    pub kind: ExternalKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boolean_value: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub string_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_value: Option<ExternalList>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_value: Option<ExternalRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lambda_value: Option<ExternalLambda>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalList {
    pub elements: Vec<ExternalValue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalRecord {
    pub properties: Vec<ExternalProperty>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalProperty {
    pub name: String,
    pub value: ExternalValue,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalLambda {
    pub free_variables: Vec<String>,
}

fn empty(kind: ExternalKind) -> ExternalValue {
    ExternalValue {
        kind,
        boolean_value: None,
        number_value: None,
        string_value: None,
        list_value: None,
        record_value: None,
        lambda_value: None,
    }
}

/// Maps the final `Value` to the external tagged record (§4.H). A top-level
/// `Function`, `Application`, or unresolved `Variable` value is a mapping
/// error — resolution should have reduced anything reachable to one of the
/// six supported outgoing kinds.
pub fn to_external(value: &Value) -> Result<ExternalValue, EngineError> {
    match value {
        Value::Boolean(b) => Ok(ExternalValue {
            boolean_value: Some(*b),
            ..empty(ExternalKind::Boolean)
        }),
        Value::Number(n) => Ok(ExternalValue {
            number_value: Some(*n),
            ..empty(ExternalKind::Number)
        }),
        Value::String(s) => Ok(ExternalValue {
            string_value: Some(s.clone()),
            ..empty(ExternalKind::String)
        }),
        Value::List(elements) => {
            let mapped = elements
                .iter()
                .map(to_external)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(ExternalValue {
                list_value: Some(ExternalList { elements: mapped }),
                ..empty(ExternalKind::List)
            })
        }
        Value::Record(props) => {
            let mut properties = Vec::with_capacity(props.len());
            for (name, val) in props {
                properties.push(ExternalProperty {
                    name: name.clone(),
                    value: to_external(val)?,
                });
            }
            Ok(ExternalValue {
                record_value: Some(ExternalRecord { properties }),
                ..empty(ExternalKind::Record)
            })
        }
        Value::Lambda { free_variables, .. } => Ok(ExternalValue {
            lambda_value: Some(ExternalLambda {
                free_variables: free_variables.clone(),
            }),
            ..empty(ExternalKind::Lambda)
        }),
        other => Err(EngineError::UnmappableResult {
            kind: other.kind().to_string(),
        }),
    }
}
