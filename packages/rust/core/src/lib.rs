//! Core pipeline for fieldpress.
//!
//! This crate ties the record source, field mapper, relationship
//! resolver, field transformer, and output renderer into the one-shot
//! `publish` workflow.

pub mod mapper;
pub mod pipeline;
pub mod renderer;
pub mod resolver;
