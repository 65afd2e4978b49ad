//! Integration tests for the triage pipeline.
//!
//! External tools are replaced by in-process collectors or canned runners
//! unless a test says otherwise.

mod collectors;
mod malformed;
mod pipeline;
