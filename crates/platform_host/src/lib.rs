//! Typed host-domain contracts shared by the desktop runtime and browser adapters.
//!
//! This crate is the API-first boundary for platform services: durable record storage, the live
//! viewport query, rendering-frame scheduling, and clock helpers. Concrete browser adapters live
//! in `platform_host_web`.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod frame;
pub mod host;
pub mod storage;
pub mod time;
pub mod viewport;

pub use frame::{FrameCallback, FrameHandle, FrameScheduler, ManualFrameScheduler};
pub use host::{HostServices, HostStrategy};
pub use storage::records::{
    load_record_with, save_record_with, MemoryRecordStore, NoopRecordStore, RecordEnvelope,
    RecordStore, RecordStoreFuture, RECORD_SCHEMA_VERSION,
};
pub use time::unix_time_ms_now;
pub use viewport::{FixedViewport, ViewportProvider, ViewportSize, FALLBACK_VIEWPORT};
