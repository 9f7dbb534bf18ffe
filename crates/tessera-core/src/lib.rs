//! Tessera Core
//!
//! Shared utilities for the Tessera sprite renderer: logging setup, puffin
//! profiling, fast hash collections, math types and culling geometry.

pub mod alloc;
pub mod geometry;
pub mod logging;
pub mod math;
pub mod profiling;
