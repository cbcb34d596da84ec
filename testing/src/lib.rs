//! Testing utilities for front-guess reducers.
//!
//! This crate provides a fluent Given-When-Then harness for exercising
//! reducers without a live transport or credential store, plus assertion
//! helpers for effect lists.

pub mod reducer_test;

pub use reducer_test::{assertions, ReducerTest};
