//! OKX v5 REST API client

pub mod client;
pub mod messages;
pub mod signing;

pub use client::OkxRestClient;
