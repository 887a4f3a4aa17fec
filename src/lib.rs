//! Rust SDK for the BitBuffet API.
//!
//! BitBuffet turns web pages into either structured data matching a schema you
//! supply, or clean markdown.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use bitbuffet::{Client, ExtractArgs, ExtractConfig, ExtractionResult, TypedSchema};
//! use schemars::JsonSchema;
//! use serde::Deserialize;
//!
//! #[derive(Debug, Deserialize, JsonSchema)]
//! struct Recipe {
//!     title: String,
//!     author: String,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), bitbuffet::Error> {
//!     let client = Client::builder("your-api-key").build()?;
//!
//!     let args = ExtractArgs::schema(TypedSchema::<Recipe>::new())
//!         .with_config(ExtractConfig::default().prompt("Only the main recipe"));
//!
//!     if let ExtractionResult::Structured(recipe) =
//!         client.extract("https://example.com/recipe", args).await?
//!     {
//!         println!("{:?}", recipe);
//!     }
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod request;
mod schema;
mod transport;
mod types;
mod version;

pub use client::{Client, ClientBuilder};
pub use error::{BoxError, Error, Result, Violation};
pub use schema::{NoSchema, RawSchema, SchemaDescriptor, TypedSchema};
pub use transport::{HttpResponse, ReqwestTransport, Transport};
pub use types::*;
pub use version::{build_user_agent, API_VERSION, DEFAULT_BASE_URL, SDK_VERSION};
