//! statekv test - shared test utilities.
//!
//! Mock engine factories and configuration fixtures used as a
//! dev-dependency by the statekv crates.
//!
//! # Usage
//!
//! ```rust,ignore
//! use statekv_storage::{StateStorage, StorageFactory};
//! use statekv_test::{RecordingEngineFactory, test_config};
//!
//! #[tokio::test]
//! async fn test_shared_instance() {
//!     let engines = RecordingEngineFactory::new();
//!     let factory = StorageFactory::new(engines.clone());
//!
//!     factory.create(Some(test_config("app"))).set_item("k", "v").await.unwrap();
//!     factory.create(Some(test_config("app"))).get_item("k").await.unwrap();
//!
//!     assert_eq!(engines.call_count(), 1);
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod fixtures;
pub mod mocks;

pub use fixtures::*;
pub use mocks::*;
