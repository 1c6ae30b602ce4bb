//! # Portico Test
//!
//! In-memory HTTP testing for Portico services. Requests go through the
//! whole dispatch pipeline without binding a port.
//!
//! - [`TestClient`] wraps a built [`App`](portico_server::App)
//! - [`TestRequestBuilder`] sets headers, cookies, query parameters and
//!   JSON, form or [`Multipart`] bodies
//! - [`TestResponse`] reads bodies and offers chained assertions
//!
//! ## Example
//!
//! ```ignore
//! use portico_test::TestClient;
//! use serde_json::json;
//!
//! #[tokio::test]
//! async fn test_sign_up() {
//!     let client = TestClient::from_service(service());
//!
//!     client
//!         .post("/api/users")
//!         .json(&json!({"username": "ab"}))
//!         .send()
//!         .await
//!         .assert_validation_error("json:username");
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/portico-test/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod error;
mod multipart;
mod request;
mod response;

pub use client::{TestClient, TestClientRequest};
pub use error::TestError;
pub use multipart::Multipart;
pub use request::{TestRequest, TestRequestBuilder};
pub use response::TestResponse;
