//! Stencil Core Types and Definitions
//!
//! This crate provides the foundational types shared by every Stencil stage:
//!
//! - **Geometry**: Canonical artboard-relative geometry and the normalizer ([`geometry`] module)
//! - **Elements**: The extracted element tree ([`element`] module)
//! - **Semantic**: Type keys and detection tags ([`semantic`] module)
//! - **Identity**: Stable and sequential element ids ([`identity`] module)
//! - **Variables**: The flattened variable record ([`variable`] module)

pub mod element;
pub mod geometry;
pub mod identity;
pub mod semantic;
pub mod variable;
