//! Remote pinning service clients.
//!
//! Each client performs a single HTTP attempt per call:
//! - `web3storage`: bearer-token upload, subdomain gateway
//! - `pinata`: key/secret header upload, generic gateway
//! - `infura`: IPFS `/add` API, Infura gateway
//! - `local`: IPFS `/add` API on a daemon, generic gateway

pub mod http;
pub mod ipfs_api;
pub mod pinata;
pub mod web3storage;

pub use http::PinningHttp;
pub use ipfs_api::{create_daemon_provider, create_infura_provider, IpfsApiProvider};
pub use pinata::{create_pinata_provider, PinataProvider};
pub use web3storage::{create_web3storage_provider, Web3StorageProvider};
