use std::time::Duration;

use crate::turso::client::SqlTransport;
use crate::turso::error::DatabaseError;
use crate::turso::protocol::{
    PipelineRequest, PipelineResponse, Statement, StreamResponse, StreamResult,
};
use crate::turso::row::QueryResult;

/// Fixed exponential backoff: attempt `n` (1-based) waits `base_delay * 2^(n-1)` before the next try
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// No waiting between attempts
    pub fn immediate(max_attempts: u32) -> Self {
        Self::new(max_attempts, Duration::ZERO)
    }

    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.base_delay.saturating_mul(1u32 << exponent)
    }
}

/// Entry point for every query against a tenant database
#[derive(Debug, Clone)]
pub struct DatabaseService<T> {
    transport: T,
    retry: RetryPolicy,
}

impl<T: SqlTransport> DatabaseService<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    async fn send_with_retry(
        &self,
        request: &PipelineRequest,
    ) -> Result<PipelineResponse, DatabaseError> {
        let mut attempt = 1;
        loop {
            match self.transport.send(request).await {
                Ok(response) => return Ok(response),
                Err(e) if e.is_transient() && attempt < self.retry.max_attempts => {
                    let delay = self.retry.delay_for_attempt(attempt);
                    log::warn!(
                        "query attempt {}/{} failed: {}; retrying in {:?}",
                        attempt,
                        self.retry.max_attempts,
                        e,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    pub async fn execute_query(&self, statement: Statement) -> Result<QueryResult, DatabaseError> {
        self.execute_batch(vec![statement])
            .await?
            .pop()
            .ok_or(DatabaseError::MissingResult(0))
    }

    /// Independent statements in one round trip; a failing statement does not stop the others
    /// on the server, but its error is returned here.
    pub async fn execute_batch(
        &self,
        statements: Vec<Statement>,
    ) -> Result<Vec<QueryResult>, DatabaseError> {
        let count = statements.len();
        for stmt in &statements {
            log::debug!("sql: {}", stmt.sql);
        }
        let response = self
            .send_with_retry(&PipelineRequest::execute(statements))
            .await?;

        let mut results = response.results.into_iter();
        (0..count)
            .map(|i| match results.next() {
                Some(StreamResult::Ok {
                    response: StreamResponse::Execute { result },
                }) => Ok(QueryResult::from(result)),
                Some(StreamResult::Error { error }) => Err(DatabaseError::Sql {
                    message: error.message,
                    code: error.code,
                }),
                Some(StreamResult::Ok { response }) => Err(DatabaseError::Decode(format!(
                    "expected execute response for statement {}, got {:?}",
                    i, response
                ))),
                None => Err(DatabaseError::MissingResult(i)),
            })
            .collect()
    }

    /// All-or-nothing execution; returns one result per input statement
    pub async fn execute_transaction(
        &self,
        statements: Vec<Statement>,
    ) -> Result<Vec<QueryResult>, DatabaseError> {
        let count = statements.len();
        log::debug!("transaction with {} statements", count);
        for stmt in &statements {
            log::debug!("sql: {}", stmt.sql);
        }
        let response = self
            .send_with_retry(&PipelineRequest::transaction(statements))
            .await?;

        let batch = match response.results.into_iter().next() {
            Some(StreamResult::Ok {
                response: StreamResponse::Batch { result },
            }) => result,
            Some(StreamResult::Error { error }) => {
                return Err(DatabaseError::Sql {
                    message: error.message,
                    code: error.code,
                })
            }
            Some(StreamResult::Ok { response }) => {
                return Err(DatabaseError::Decode(format!(
                    "expected batch response, got {:?}",
                    response
                )))
            }
            None => return Err(DatabaseError::MissingResult(0)),
        };

        if let Some(error) = batch.step_errors.into_iter().flatten().next() {
            return Err(DatabaseError::Sql {
                message: error.message,
                code: error.code,
            });
        }

        // step 0 is BEGIN; user statements occupy 1..=count
        let mut steps = batch.step_results.into_iter().skip(1);
        (0..count)
            .map(|i| match steps.next() {
                Some(Some(result)) => Ok(QueryResult::from(result)),
                _ => Err(DatabaseError::MissingResult(i)),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::turso::protocol::{BatchResult, ProtocolError, SqlValue, StmtResult, StreamRequest};
    use parking_lot::Mutex;
    use std::collections::VecDeque;

    /// Replays queued responses and records what was sent
    #[derive(Default)]
    struct ScriptedTransport {
        responses: Mutex<VecDeque<Result<PipelineResponse, DatabaseError>>>,
        sent: Mutex<Vec<PipelineRequest>>,
    }

    impl ScriptedTransport {
        fn push(&self, response: Result<PipelineResponse, DatabaseError>) {
            self.responses.lock().push_back(response);
        }

        fn sent_count(&self) -> usize {
            self.sent.lock().len()
        }
    }

    #[async_trait::async_trait]
    impl SqlTransport for ScriptedTransport {
        async fn send(&self, request: &PipelineRequest) -> Result<PipelineResponse, DatabaseError> {
            self.sent.lock().push(request.clone());
            self.responses
                .lock()
                .pop_front()
                .unwrap_or_else(|| Err(DatabaseError::Transport("no scripted response".into())))
        }
    }

    fn one_row(value: &str) -> StmtResult {
        StmtResult {
            cols: vec![crate::turso::protocol::Column {
                name: Some("name".into()),
                decltype: None,
            }],
            rows: vec![vec![SqlValue::Text(value.into())]],
            ..Default::default()
        }
    }

    fn service(transport: ScriptedTransport) -> DatabaseService<ScriptedTransport> {
        DatabaseService::new(transport).with_retry(RetryPolicy::immediate(3))
    }

    #[test]
    fn test_backoff_doubles_each_attempt() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(1000));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(2000));
        assert_eq!(policy.delay_for_attempt(3), Duration::from_millis(4000));
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).max_attempts, 1);
    }

    #[tokio::test]
    async fn test_query_returns_decoded_rows() {
        let transport = ScriptedTransport::default();
        transport.push(Ok(PipelineResponse::from_results(vec![one_row("Shoes")])));
        let db = service(transport);

        let result = db
            .execute_query(Statement::new("SELECT name FROM categories"))
            .await
            .unwrap();
        assert_eq!(result.rows.len(), 1);
        assert_eq!(result.first().unwrap().text("name").unwrap(), "Shoes");
    }

    #[tokio::test]
    async fn test_transient_failures_are_retried_until_success() {
        let transport = ScriptedTransport::default();
        transport.push(Err(DatabaseError::Transport("connection reset".into())));
        transport.push(Err(DatabaseError::Status { status: 502, body: "bad gateway".into() }));
        transport.push(Ok(PipelineResponse::from_results(vec![one_row("ok")])));
        let db = service(transport);

        let result = db.execute_query(Statement::new("SELECT 1")).await;
        assert!(result.is_ok());
        assert_eq!(db.transport().sent_count(), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let transport = ScriptedTransport::default();
        for _ in 0..5 {
            transport.push(Err(DatabaseError::Transport("down".into())));
        }
        let db = service(transport);

        let err = db.execute_query(Statement::new("SELECT 1")).await.unwrap_err();
        assert!(matches!(err, DatabaseError::Transport(_)));
        assert_eq!(db.transport().sent_count(), 3);
    }

    #[tokio::test]
    async fn test_permanent_failures_are_not_retried() {
        let transport = ScriptedTransport::default();
        transport.push(Err(DatabaseError::Status { status: 401, body: "unauthorized".into() }));
        let db = service(transport);

        let err = db.execute_query(Statement::new("SELECT 1")).await.unwrap_err();
        assert!(matches!(err, DatabaseError::Status { status: 401, .. }));
        assert_eq!(db.transport().sent_count(), 1);
    }

    #[tokio::test]
    async fn test_statement_error_surfaces_as_sql_error() {
        let transport = ScriptedTransport::default();
        transport.push(Ok(PipelineResponse {
            baton: None,
            base_url: None,
            results: vec![
                StreamResult::Error {
                    error: ProtocolError {
                        message: "no such table: widgets".into(),
                        code: Some("SQLITE_ERROR".into()),
                    },
                },
                StreamResult::Ok { response: StreamResponse::Close },
            ],
        }));
        let db = service(transport);

        let err = db
            .execute_query(Statement::new("SELECT * FROM widgets"))
            .await
            .unwrap_err();
        match err {
            DatabaseError::Sql { message, code } => {
                assert_eq!(message, "no such table: widgets");
                assert_eq!(code.as_deref(), Some("SQLITE_ERROR"));
            }
            other => panic!("expected sql error, got {:?}", other),
        }
        assert_eq!(db.transport().sent_count(), 1);
    }

    #[tokio::test]
    async fn test_transaction_sends_one_batch_and_maps_step_results() {
        let transport = ScriptedTransport::default();
        transport.push(Ok(PipelineResponse {
            baton: None,
            base_url: None,
            results: vec![
                StreamResult::Ok {
                    response: StreamResponse::Batch {
                        result: BatchResult {
                            step_results: vec![
                                Some(StmtResult::default()),
                                Some(StmtResult { affected_row_count: 2, ..Default::default() }),
                                Some(StmtResult { affected_row_count: 1, ..Default::default() }),
                                Some(StmtResult::default()),
                                None,
                            ],
                            step_errors: vec![None, None, None, None, None],
                        },
                    },
                },
                StreamResult::Ok { response: StreamResponse::Close },
            ],
        }));
        let db = service(transport);

        let results = db
            .execute_transaction(vec![
                Statement::new("DELETE FROM inventory WHERE product_id = ?").arg("p1"),
                Statement::new("DELETE FROM products WHERE id = ?").arg("p1"),
            ])
            .await
            .unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].affected_row_count, 2);
        assert_eq!(results[1].affected_row_count, 1);

        let sent = db.transport().sent.lock();
        assert_eq!(sent.len(), 1);
        assert!(matches!(sent[0].requests[0], StreamRequest::Batch { .. }));
    }

    #[tokio::test]
    async fn test_transaction_step_error_fails_the_whole_call() {
        let transport = ScriptedTransport::default();
        transport.push(Ok(PipelineResponse {
            baton: None,
            base_url: None,
            results: vec![StreamResult::Ok {
                response: StreamResponse::Batch {
                    result: BatchResult {
                        step_results: vec![Some(StmtResult::default()), None, None, None, Some(StmtResult::default())],
                        step_errors: vec![
                            None,
                            Some(ProtocolError {
                                message: "UNIQUE constraint failed: inventory.sku".into(),
                                code: None,
                            }),
                            None,
                            None,
                            None,
                        ],
                    },
                },
            }],
        }));
        let db = service(transport);

        let err = db
            .execute_transaction(vec![
                Statement::new("INSERT INTO inventory (id, sku) VALUES (?, ?)").arg("i1").arg("A"),
                Statement::new("INSERT INTO inventory (id, sku) VALUES (?, ?)").arg("i2").arg("A"),
            ])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("UNIQUE constraint failed"));
    }
}
