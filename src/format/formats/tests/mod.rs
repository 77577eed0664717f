//! Unit tests for map document format implementations.
//!
//! These tests verify decoding of hand-written documents, rejection of
//! malformed input, and round-trip conversions.
