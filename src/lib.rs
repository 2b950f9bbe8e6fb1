//! Stepscan core library.
//!
//! Extracts step implementations from Kotlin sources: functions annotated
//! with a step marker such as `@Step("Say <greeting> to <name>")`. Each
//! declared text becomes a [`step::StepRegistryEntry`] in a shared
//! [`registry::StepRegistry`], keyed by its canonical signature.
//!
//! The pipeline for one file is [`parser`] → [`annotations`] → [`decode`] →
//! [`builder`] → [`registry`]; [`scanner`] ties it together.

pub mod annotations;
pub mod ast;
pub mod builder;
pub mod cli;
pub mod config;
pub mod decode;
pub mod parser;
pub mod position;
pub mod registry;
pub mod render;
pub mod runner;
pub mod scanner;
pub mod step;
