//! Shared photo stream: phones upload via presigned URLs, a passive viewer
//! (e.g. a TV) shows the stream, and the server brokers storage access while
//! pushing change notifications to watching sessions. The server never
//! transits image bytes and never persists photo metadata of its own — every
//! listing is a live query against the storage backend.

pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod viewer;
