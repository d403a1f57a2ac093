//! Domain logic for the claimdesk annotation service.
//!
//! Everything in this crate is free of I/O: dataset items, the annotator
//! roster, the dataset cursor, the two-step label state machine, annotation
//! records and the progress projection. File and network concerns live in
//! `claimdesk-store` and `claimdesk-cloud`.

pub mod annotator;
pub mod cursor;
pub mod error;
pub mod guidelines;
pub mod item;
pub mod labeling;
pub mod mirror;
pub mod pilot;
pub mod progress;
pub mod record;
pub mod session;
pub mod storage;
pub mod types;
