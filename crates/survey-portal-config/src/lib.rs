// crates/survey-portal-config/src/lib.rs
// ============================================================================
// Module: Survey Portal Config Library
// Description: Canonical config model, validation, and example generation.
// Purpose: Single source of truth for survey-portal.toml semantics.
// Dependencies: survey-portal-core, serde, toml, url
// ============================================================================

//! ## Overview
//! `survey-portal-config` defines the configuration model for the access gate
//! service. Loading is strict and fail-closed: a config that would let the
//! gate lock users out of the login page, or point the identity client at a
//! malformed URL, is rejected before anything starts.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod examples;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
pub use examples::config_toml_example;
