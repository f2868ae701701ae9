// ─── Downloader ───
// Byte transport plus the hash-verified content store built on it.

pub mod client;
pub mod hash;
pub mod store;

pub use client::{Fetcher, HttpFetcher};
pub use hash::{ExpectedHash, HashAlgorithm};
pub use store::{ContentStore, Direction};
