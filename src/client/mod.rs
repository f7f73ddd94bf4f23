//! # Client Components
//!
//! The client publishes one typed request per invocation:
//!
//! - [`requester::Requester`] serializes the request payload
//! - [`requester::Publisher`] is the minimal delivery interface
//! - [`requester::TcpPublisher`] delivers the payload over framed TCP

pub mod requester;

pub use requester::{ClientConfig, Publisher, Requester, TcpPublisher};
