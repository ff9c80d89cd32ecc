//! SellerLag Runner: pipeline orchestration and artifact export.
//!
//! This crate builds on `sellerlag-core` to provide:
//! - A single entry point running base -> exposure -> outcome -> scan
//! - Loading the input relations from the configured data directory
//! - CSV, JSON manifest and Markdown report artifacts per run

pub mod export;
pub mod runner;

pub use export::{
    export_base_csv, export_profiles_csv, export_scan_csv, generate_report, import_manifest,
    load_artifacts, save_artifacts, RunManifest,
};
pub use runner::{run_analysis, run_from_config, AnalysisResult, PipelineCounts, RunError};
