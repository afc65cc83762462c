//! Async client for the RockAuto parts catalog.
//!
//! Vehicle lookup (make, year, model, engine), part categories and listings,
//! parts search, tools, order status and the signed-in account pages, all
//! scraped from the site's HTML and its catalog AJAX endpoint.

#[macro_use]
mod macros;

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod extract;
pub mod models;
pub mod pages;
pub mod session;

pub use cache::{CacheStats, CatalogCache, ClearedCounts};
pub use client::{RockAutoClient, Vehicle};
pub use config::{CacheConfig, CacheUpdate, ClientConfig, HeaderProfile, OrderDataLimits};
pub use error::{ClientError, Result};
pub use session::{AuthenticationStatus, HttpResponse, ReqwestTransport, Transport};
