pub mod client;
pub mod common;
pub mod server;

pub use common::messages::{OperationKind, Request};
pub use server::store::ClientStore;
