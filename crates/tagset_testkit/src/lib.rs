//! # Tagset Testkit
//!
//! Test utilities for tagset.
//!
//! This crate provides:
//! - Sample records and temporary record files
//! - Property-based test generators using proptest
//! - Golden records pinning the wire format and dump output
//! - Hex-encoded wire vectors shared with other implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tagset_testkit::prelude::*;
//!
//! proptest! {
//!     #[test]
//!     fn survives_the_wire(record in record_strategy(3)) {
//!         let bytes = tagset_codec::to_wire(&record).unwrap();
//!         prop_assert_eq!(tagset_codec::from_wire(&bytes).unwrap(), record);
//!     }
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod golden;
pub mod vectors;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::golden::*;
    pub use crate::vectors::*;
    pub use proptest::prelude::*;
}

pub use fixtures::*;
pub use generators::*;
pub use golden::*;
pub use vectors::*;
