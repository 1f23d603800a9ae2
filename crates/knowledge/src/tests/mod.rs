//! Store-level tests for the knowledge base.

mod retrieval;
mod support;
