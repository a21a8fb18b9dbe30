pub mod attribute;
pub mod common;
pub mod credentials;
pub mod inventory;
pub mod product;
pub mod store;
pub mod taxonomy;

pub use attribute::*;
pub use common::*;
pub use credentials::*;
pub use inventory::*;
pub use product::*;
pub use store::*;
pub use taxonomy::*;
