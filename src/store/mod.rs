pub mod credential_cache;
pub mod kv;
pub mod rows;
pub mod schema;
pub mod traits;
pub mod turso;

pub use credential_cache::*;
pub use kv::*;
pub use traits::*;
pub use turso::*;
