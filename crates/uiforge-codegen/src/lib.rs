//! uiforge component generation.
//!
//! Turns component descriptors into frontend source files and keeps
//! hand-written edits alive across regeneration via marked safe
//! regions. Rendering is pluggable through `TemplateEngine`; the crate
//! ships a Vue single-file-component engine.

pub mod engine;
pub mod merge;
pub mod pipeline;
pub mod vue;

pub use engine::{ComponentGenerator, GenerateError, TemplateEngine};
pub use merge::{MergeError, replace_safe_regions};
pub use pipeline::{ArtifactFailure, PipelineError, RegenerationReport, Regenerator};
pub use vue::VueEngine;
