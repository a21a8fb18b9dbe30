//! Wire types for the gateway's `/v2/pipeline` endpoint.
//!
//! A pipeline is a list of stream requests executed in order on one
//! server-side connection. Values travel as typed cells
//! (`{"type":"text","value":"..."}`); 64-bit integers are sent as strings so
//! they survive JSON number precision.

use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use serde::{Deserialize, Serialize};

/// Blobs are sent unpadded and accepted with or without padding
const BLOB_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &base64::alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

// ============================================================================
// Values
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WireValue", into = "WireValue")]
pub enum SqlValue {
    Null,
    Integer(i64),
    Float(f64),
    Text(String),
    Blob(Vec<u8>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum WireInteger {
    Text(String),
    Number(i64),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum WireValue {
    Null,
    Integer { value: WireInteger },
    Float { value: f64 },
    Text { value: String },
    Blob { base64: String },
}

impl TryFrom<WireValue> for SqlValue {
    type Error = String;

    fn try_from(wire: WireValue) -> Result<Self, Self::Error> {
        Ok(match wire {
            WireValue::Null => SqlValue::Null,
            WireValue::Integer { value: WireInteger::Number(n) } => SqlValue::Integer(n),
            WireValue::Integer { value: WireInteger::Text(s) } => SqlValue::Integer(
                s.parse()
                    .map_err(|e| format!("invalid integer cell {:?}: {}", s, e))?,
            ),
            WireValue::Float { value } => SqlValue::Float(value),
            WireValue::Text { value } => SqlValue::Text(value),
            WireValue::Blob { base64 } => SqlValue::Blob(
                BLOB_ENGINE
                    .decode(base64.as_bytes())
                    .map_err(|e| format!("invalid blob cell: {}", e))?,
            ),
        })
    }
}

impl From<SqlValue> for WireValue {
    fn from(value: SqlValue) -> Self {
        match value {
            SqlValue::Null => WireValue::Null,
            SqlValue::Integer(n) => WireValue::Integer {
                value: WireInteger::Text(n.to_string()),
            },
            SqlValue::Float(value) => WireValue::Float { value },
            SqlValue::Text(value) => WireValue::Text { value },
            SqlValue::Blob(bytes) => WireValue::Blob {
                base64: BLOB_ENGINE.encode(bytes),
            },
        }
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<&String> for SqlValue {
    fn from(value: &String) -> Self {
        SqlValue::Text(value.clone())
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Integer(value)
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        SqlValue::Float(value)
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        SqlValue::Integer(value as i64)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(SqlValue::Null)
    }
}

// ============================================================================
// Requests
// ============================================================================

/// One SQL statement with positional (`?`) arguments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    pub sql: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<SqlValue>,
}

impl Statement {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, value: impl Into<SqlValue>) -> Self {
        self.args.push(value.into());
        self
    }

    pub fn with_args(mut self, args: Vec<SqlValue>) -> Self {
        self.args = args;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BatchCond {
    Ok { step: usize },
    Error { step: usize },
    Not { cond: Box<BatchCond> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchStep {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<BatchCond>,
    pub stmt: Statement,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Batch {
    pub steps: Vec<BatchStep>,
}

impl Batch {
    /// Wraps statements in BEGIN/COMMIT, each step gated on the previous one.
    /// A trailing ROLLBACK runs when the COMMIT step did not succeed.
    pub fn transaction(statements: Vec<Statement>) -> Self {
        let mut steps = Vec::with_capacity(statements.len() + 3);
        steps.push(BatchStep {
            condition: None,
            stmt: Statement::new("BEGIN"),
        });
        for stmt in statements {
            let previous = steps.len() - 1;
            steps.push(BatchStep {
                condition: Some(BatchCond::Ok { step: previous }),
                stmt,
            });
        }
        let commit = steps.len();
        steps.push(BatchStep {
            condition: Some(BatchCond::Ok { step: commit - 1 }),
            stmt: Statement::new("COMMIT"),
        });
        steps.push(BatchStep {
            condition: Some(BatchCond::Not {
                cond: Box::new(BatchCond::Ok { step: commit }),
            }),
            stmt: Statement::new("ROLLBACK"),
        });
        Self { steps }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StreamRequest {
    Execute { stmt: Statement },
    Batch { batch: Batch },
    Close,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baton: Option<String>,
    pub requests: Vec<StreamRequest>,
}

impl PipelineRequest {
    /// Independent statements followed by a close
    pub fn execute(statements: Vec<Statement>) -> Self {
        let mut requests: Vec<StreamRequest> = statements
            .into_iter()
            .map(|stmt| StreamRequest::Execute { stmt })
            .collect();
        requests.push(StreamRequest::Close);
        Self {
            baton: None,
            requests,
        }
    }

    pub fn transaction(statements: Vec<Statement>) -> Self {
        Self {
            baton: None,
            requests: vec![
                StreamRequest::Batch {
                    batch: Batch::transaction(statements),
                },
                StreamRequest::Close,
            ],
        }
    }

    /// Every statement in the pipeline, in send order
    pub fn statements(&self) -> Vec<&Statement> {
        self.requests
            .iter()
            .flat_map(|request| match request {
                StreamRequest::Execute { stmt } => vec![stmt],
                StreamRequest::Batch { batch } => batch.steps.iter().map(|s| &s.stmt).collect(),
                StreamRequest::Close => vec![],
            })
            .collect()
    }
}

// ============================================================================
// Responses
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtocolError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Column {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub decltype: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StmtResult {
    #[serde(default)]
    pub cols: Vec<Column>,
    #[serde(default)]
    pub rows: Vec<Vec<SqlValue>>,
    #[serde(default)]
    pub affected_row_count: u64,
    #[serde(default)]
    pub last_insert_rowid: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BatchResult {
    #[serde(default)]
    pub step_results: Vec<Option<StmtResult>>,
    #[serde(default)]
    pub step_errors: Vec<Option<ProtocolError>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StreamResponse {
    Execute { result: StmtResult },
    Batch { result: BatchResult },
    Close,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StreamResult {
    Ok { response: StreamResponse },
    Error { error: ProtocolError },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineResponse {
    #[serde(default)]
    pub baton: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    pub results: Vec<StreamResult>,
}

impl PipelineResponse {
    /// A successful response for plain executes, followed by the close acknowledgement
    pub fn from_results(results: Vec<StmtResult>) -> Self {
        let mut stream: Vec<StreamResult> = results
            .into_iter()
            .map(|result| StreamResult::Ok {
                response: StreamResponse::Execute { result },
            })
            .collect();
        stream.push(StreamResult::Ok {
            response: StreamResponse::Close,
        });
        Self {
            baton: None,
            base_url: None,
            results: stream,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_integer_cells_are_sent_as_strings() {
        let stmt = Statement::new("SELECT * FROM inventory WHERE quantity > ?").arg(9_007_199_254_740_993i64);
        let json = serde_json::to_value(&stmt).unwrap();
        assert_eq!(
            json["args"][0],
            json!({"type": "integer", "value": "9007199254740993"})
        );
    }

    #[test]
    fn test_cells_decode_from_gateway_shapes() {
        let cells: Vec<SqlValue> = serde_json::from_value(json!([
            {"type": "null"},
            {"type": "integer", "value": "42"},
            {"type": "integer", "value": 7},
            {"type": "float", "value": 19.5},
            {"type": "text", "value": "Mug"},
            {"type": "blob", "base64": "aGk="},
            {"type": "blob", "base64": "aGk"}
        ]))
        .unwrap();

        assert_eq!(
            cells,
            vec![
                SqlValue::Null,
                SqlValue::Integer(42),
                SqlValue::Integer(7),
                SqlValue::Float(19.5),
                SqlValue::Text("Mug".to_string()),
                SqlValue::Blob(b"hi".to_vec()),
                SqlValue::Blob(b"hi".to_vec()),
            ]
        );
    }

    #[test]
    fn test_bad_integer_cell_is_rejected() {
        let result = serde_json::from_value::<SqlValue>(json!({"type": "integer", "value": "12a"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_execute_pipeline_ends_with_close() {
        let request = PipelineRequest::execute(vec![Statement::new("SELECT 1")]);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            json!({
                "requests": [
                    {"type": "execute", "stmt": {"sql": "SELECT 1"}},
                    {"type": "close"}
                ]
            })
        );
    }

    #[test]
    fn test_transaction_chains_conditions_and_rolls_back_on_failed_commit() {
        let batch = Batch::transaction(vec![
            Statement::new("DELETE FROM inventory WHERE product_id = ?").arg("p1"),
            Statement::new("DELETE FROM products WHERE id = ?").arg("p1"),
        ]);
        let sqls: Vec<&str> = batch.steps.iter().map(|s| s.stmt.sql.as_str()).collect();
        assert_eq!(
            sqls,
            vec![
                "BEGIN",
                "DELETE FROM inventory WHERE product_id = ?",
                "DELETE FROM products WHERE id = ?",
                "COMMIT",
                "ROLLBACK"
            ]
        );
        assert_eq!(batch.steps[0].condition, None);
        assert_eq!(batch.steps[1].condition, Some(BatchCond::Ok { step: 0 }));
        assert_eq!(batch.steps[3].condition, Some(BatchCond::Ok { step: 2 }));
        assert_eq!(
            batch.steps[4].condition,
            Some(BatchCond::Not {
                cond: Box::new(BatchCond::Ok { step: 3 })
            })
        );

        let json = serde_json::to_value(&batch.steps[4]).unwrap();
        assert_eq!(
            json["condition"],
            json!({"type": "not", "cond": {"type": "ok", "step": 3}})
        );
    }

    #[test]
    fn test_response_parses_nested_rows() {
        let body = json!({
            "baton": null,
            "base_url": null,
            "results": [
                {
                    "type": "ok",
                    "response": {
                        "type": "execute",
                        "result": {
                            "cols": [{"name": "id", "decltype": "TEXT"}, {"name": "price", "decltype": "REAL"}],
                            "rows": [[{"type": "text", "value": "p1"}, {"type": "float", "value": 12.5}]],
                            "affected_row_count": 0,
                            "last_insert_rowid": null,
                            "replication_index": "3"
                        }
                    }
                },
                {"type": "error", "error": {"message": "no such table: foo", "code": "SQLITE_ERROR"}},
                {"type": "ok", "response": {"type": "close"}}
            ]
        });
        let response: PipelineResponse = serde_json::from_value(body).unwrap();
        assert_eq!(response.results.len(), 3);
        match &response.results[0] {
            StreamResult::Ok {
                response: StreamResponse::Execute { result },
            } => {
                assert_eq!(result.cols[1].name.as_deref(), Some("price"));
                assert_eq!(result.rows[0][1], SqlValue::Float(12.5));
            }
            other => panic!("unexpected first result: {:?}", other),
        }
        assert!(matches!(response.results[1], StreamResult::Error { .. }));
    }
}
