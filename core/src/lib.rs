//! Synchronous client for the Warren cloud REST API.
//!
//! # Overview
//! A `RequestConfig` describes one call (method, path, query, body); an
//! `ApiClient` authenticates it with the `apikey` header, executes it over a
//! pluggable `Transport` and returns a `ClientResponse` carrying the raw
//! body and an optional `ApiError`. Resource clients (locations, object
//! storage, block storage, VPC networks, floating IPs) are thin layers over
//! that contract.
//!
//! # Design
//! - `ApiClient` is immutable; rotating the key yields a new client.
//! - Request construction is plain data (`HttpRequest`) and fully validated
//!   before the transport is called, so cancelled contexts and bad method
//!   tokens never reach the network. Cancelling a context while its request
//!   is in flight ends the call with `ApiError::Transport`.
//! - Status codes of 400 and above are failures; the body is kept.
//! - Nothing is read from the environment unless the host asks for it via
//!   `ClientConfig::from_env` or `ApiClient::from_env`.

pub mod block_storage;
pub mod client;
pub mod config;
pub mod context;
pub mod error;
pub mod floating_ip;
pub mod http;
pub mod location;
pub mod object_storage;
pub mod request;
pub mod transport;
pub mod types;
pub mod vpc;
pub mod warren;

pub use block_storage::BlockStorageClient;
pub use client::{ApiClient, ClientResponse};
pub use config::ClientConfig;
pub use context::Context;
pub use error::{ApiError, ErrorKind};
pub use floating_ip::FloatingIpClient;
pub use http::{HttpMethod, HttpRequest, HttpResponse, Values};
pub use location::LocationClient;
pub use object_storage::ObjectStorageClient;
pub use request::{RequestBody, RequestConfig};
pub use transport::{Transport, UreqTransport};
pub use types::{Bucket, CreateDisk, Disk, FloatingIp, Location, Network, S3Credential, S3UserInfo, SourceImageType};
pub use vpc::VpcClient;
pub use warren::Warren;
