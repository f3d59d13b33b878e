//! Integration tests for parameter extraction and label substitution


// Label substitution
mod substitute_tests;
