//! Browser (`wasm32`) implementations of [`platform_host`] service contracts.
//!
//! Every adapter compiles on native targets too, where it degrades to an inert fallback, so the
//! desktop runtime can be built and tested off the browser.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

/// Compile-time host-strategy selection and service bundle construction.
pub mod adapters;
pub mod frame;
pub mod storage;
pub mod viewport;

pub use adapters::{build_host_services, selected_host_strategy};
pub use frame::AnimationFrameScheduler;
pub use storage::local_records::WebRecordStore;
pub use viewport::WebViewport;
