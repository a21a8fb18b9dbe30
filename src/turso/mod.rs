//! Client for the hosted SQL-over-HTTP gateway.

pub mod client;
pub mod error;
pub mod protocol;
pub mod row;
pub mod service;
pub mod sql;

pub use client::*;
pub use error::*;
pub use protocol::{PipelineRequest, PipelineResponse, SqlValue, Statement, StmtResult};
pub use row::*;
pub use service::*;
