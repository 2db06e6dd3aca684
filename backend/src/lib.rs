//! Image Gateway: authenticated batch uploads to S3-compatible storage with
//! ready-to-paste public links

#![deny(clippy::all, dead_code)]
#![warn(clippy::pedantic, clippy::nursery)]

pub mod gallery;
pub mod middleware;
pub mod object_store;
pub mod public_url;
pub mod routes;
pub mod server;
pub mod session;
pub mod storage_key;
pub mod types;
