//! Storage and persistence layer.
//!
//! # Responsibility
//! - Define the local key/value storage contract and its backends.
//! - Persist the dataset document through that contract.
//!
//! # Invariants
//! - The dataset is always read and written as one whole document.
//! - Content problems in storage degrade to an empty dataset; only import
//!   surfaces a JSON error.

pub mod dataset_repo;
pub mod kv_repo;
