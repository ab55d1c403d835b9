//! REST plumbing for the portal backend: the response envelope and a thin
//! bearer-token HTTP client. Resource CRUD screens are not part of this crate.

pub mod client;
pub mod envelope;

pub use client::ApiClient;
pub use envelope::{Envelope, TokenData};
