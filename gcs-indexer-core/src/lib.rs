#![doc = "gcs-indexer-core: core logic library for gcs-indexer."]

//! This crate turns crawled documents into search-index items and submits them
//! through an injected backend client. It holds the data model, the contracts
//! the writer depends on, and the writer itself. Transport, configuration file
//! parsing and the CLI live in the `gcs-indexer` crate.
//!
//! # Usage
//! Construct a [`writer::CloudSearchIndexWriter`] with a [`contract::Helper`]
//! implementation, then drive it through the [`contract::IndexWriter`] trait.

pub mod acl;
pub mod config;
pub mod content;
pub mod contract;
pub mod document;
pub mod error;
pub mod item;
pub mod item_builder;
pub mod schema;
pub mod structured_data;
pub mod writer;
