//! Flowkit Core Types and Definitions
//!
//! This crate provides the foundational types for the flowkit animation
//! engine. It includes:
//!
//! - **Config**: The validated diagram definition tree ([`config`] module)
//! - **Values**: Runtime scalar values for the expression language ([`value::Value`])
//! - **Geometry**: Basic geometric types ([`geometry`] module)
//! - **Draw**: The drawing-backend boundary ([`draw::Surface`])
//!
//! The crate performs no I/O: parsing lives in `flowkit-parser` and execution
//! in `flowkit`.

pub mod config;
pub mod draw;
pub mod geometry;
pub mod value;
