//! incident.io provider plugin.
//!
//! This crate serves incident.io configuration (catalog types and entries,
//! custom fields, incident roles, severities and statuses) as resources an
//! infrastructure-as-code host can create, read, update, delete and import.
//!
//! # Overview
//!
//! - **API client** ([`client`]): typed calls to the incident.io REST API
//! - **Resources** ([`resources`]): one adapter per resource type, mapping
//!   host state to API bodies and back
//! - **Provider** ([`IncidentProvider`]): configuration and dispatch to the
//!   adapters
//! - **Schema, plan and validation** ([`schema`], [`plan`], [`validation`]):
//!   how resources are described to the host and how changes are computed
//! - **Server** ([`serve`]): the gRPC plugin server and handshake
//! - **Logging** ([`logging`]): `tracing` output on stderr
//!
//! # Handshake Protocol
//!
//! The host launches the plugin with `TF_PLUGIN_MAGIC_COOKIE` set. The plugin
//! binds a loopback port and prints one line on stdout:
//!
//! ```text
//! 1|1|tcp|127.0.0.1:50051|grpc
//! ```
//!
//! Format: `<core version>|<protocol version>|tcp|<address>|grpc`
//!
//! # Provider Protocol
//!
//! - **GetMetadata** / **GetSchema**: resource type names and their schemas
//! - **ValidateProviderConfig** / **Configure**: endpoint and API key
//! - **Stop**: shutdown
//! - **ValidateResourceConfig**, **UpgradeResourceState**, **Plan**
//! - **Create** / **Read** / **Update** / **Delete**
//! - **ImportResourceState**: seeds a state holding only the id
//! - **ValidateDataSourceConfig** / **ReadDataSource**: no data sources are
//!   served; both report an unknown type

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod plan;
pub mod provider;
pub mod resources;
pub mod schema;
pub mod server;
pub mod testing;
pub mod types;
pub mod validation;

#[allow(missing_docs)]
#[allow(clippy::all)]
pub mod generated;

pub use client::{ApiError, Client};
pub use config::{ProviderConfig, ResolvedConfig};
pub use error::ProviderError;
pub use logging::{init_logging, try_init_logging};
pub use provider::IncidentProvider;
pub use schema::ProviderSchema;
pub use server::{
    serve, serve_on_listener, serve_with_options, ProviderService, ServeOptions,
};
pub use types::{
    AttributeChange, ImportedResource, PlanResult, ProviderMetadata, CORE_PROTOCOL_VERSION,
    PROTOCOL_VERSION,
};
pub use validation::{is_valid, validate, validate_result};

pub use async_trait::async_trait;
pub use serde_json;
