//! Schema ID constants for JSON output contracts.
//!
//! All logport JSON outputs include a `schema_id` field that references
//! the corresponding schema. These constants define the canonical schema URLs.
//!
//! ## URI Structure
//!
//! ```text
//! https://schemas.logport.dev/<module>/<topic>/<version>/<filename>
//! ```
//!
//! Where:
//! - `module` = `logport` (source repository)
//! - `topic` = feature area (e.g., `discovery`)
//! - `version` = SemVer (e.g., `v1.0.0`)
//! - `filename` = schema file with `.schema.json` suffix
//!
//! ## Validation Strategy
//!
//! logport does NOT perform runtime JSON schema validation (too heavy).
//! Instead:
//! - Input validation: `serde(deny_unknown_fields)` + manual range checks
//! - Schema ID verification: Unit tests against SSOT

/// Schema ID for port snapshot JSON output (v1.0.0).
///
/// This schema defines the structure of `logport find --json` and
/// `logport scan --json` output.
///
/// Schema location: `schemas/discovery/v1.0.0/port-snapshot.schema.json`
pub const PORT_SNAPSHOT_V1: &str =
    "https://schemas.logport.dev/logport/discovery/v1.0.0/port-snapshot.schema.json";

// ============================================================================
// Schema Host Constants
// ============================================================================

/// Base URL for logport schemas.
pub const SCHEMA_HOST: &str = "https://schemas.logport.dev";

/// Module name for logport in schema URIs.
pub const SCHEMA_MODULE: &str = "logport";
