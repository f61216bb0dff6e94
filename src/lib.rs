//! Client library for the TVMaze REST API (<https://api.tvmaze.com>).
//!
//! [`client::TvMazeClient`] turns endpoint calls into HTTP GETs through an
//! injected [`transport::HttpTransport`] and maps the JSON bodies into the
//! types in [`domain`] via the pure functions in [`factory`]. Every client
//! operation is async with a `_blocking` twin.

pub mod client;
pub mod domain;
pub mod factory;
pub mod transport;

pub use client::{ApiError, TvMazeClient};
pub use factory::FactoryError;
pub use transport::{HttpResponse, HttpTransport, IsahcTransport, TransportError};
