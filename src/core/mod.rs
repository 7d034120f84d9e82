//! Core layer - stream versioning.
//!
//! - [`VersionEnvelope`] - Header read first from every stream
//! - [`EncodingRevision`] - Container layout revisions

mod envelope;

pub use envelope::{is_text_stream, EncodingRevision, VersionEnvelope, ENVELOPE_ELEMENT};
