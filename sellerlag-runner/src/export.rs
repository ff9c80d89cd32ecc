//! Reporting and export: JSON, CSV, and Markdown artifact generation.
//!
//! Three export formats for an analysis run:
//! - **JSON**: run manifest (config, dataset hash, funnel counts, scan) with schema versioning
//! - **CSV**: base table, merged seller profiles, and threshold scan
//! - **Markdown**: report with the scan table and a text chart of `loss_days`
//!
//! Undefined `loss_days` values are written as empty CSV cells and `null` in JSON.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use sellerlag_core::config::AnalysisConfig;
use sellerlag_core::{OrderSellerTable, SellerProfile, ThresholdScanRecord};

use crate::runner::{AnalysisResult, PipelineCounts, SCHEMA_VERSION};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Width of the longest bar in the Markdown chart.
const CHART_WIDTH: usize = 40;

// ─── JSON export ────────────────────────────────────────────────────

/// Summary of a run persisted as `manifest.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub config: AnalysisConfig,
    pub dataset_hash: String,
    pub counts: PipelineCounts,
    pub scan: Vec<ThresholdScanRecord>,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl RunManifest {
    pub fn from_result(result: &AnalysisResult) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            config: result.config.clone(),
            dataset_hash: result.dataset_hash.clone(),
            counts: result.counts.clone(),
            scan: result.scan.clone(),
        }
    }
}

pub fn export_manifest(result: &AnalysisResult) -> Result<String> {
    serde_json::to_string_pretty(&RunManifest::from_result(result))
        .context("failed to serialize run manifest to JSON")
}

/// Deserialize a manifest, rejecting unknown schema versions.
pub fn import_manifest(json: &str) -> Result<RunManifest> {
    let manifest: RunManifest =
        serde_json::from_str(json).context("failed to deserialize run manifest from JSON")?;
    if manifest.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            manifest.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(manifest)
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Export the threshold scan. Columns: t, loss_days, n_hi, n_lo
pub fn export_scan_csv(scan: &[ThresholdScanRecord]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["t", "loss_days", "n_hi", "n_lo"])?;
    for row in scan {
        wtr.write_record([
            &row.t.to_string(),
            &row.loss_days.map(|v| format!("{v:.4}")).unwrap_or_default(),
            &row.n_hi.to_string(),
            &row.n_lo.to_string(),
        ])?;
    }
    finish(wtr)
}

/// Export merged seller profiles (exposure + outcome), one row per seller.
pub fn export_profiles_csv(profiles: &[SellerProfile]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "seller_id",
        "early_orders",
        "early_k_date",
        "early_max_late",
        "early_p95_late",
        "early_severe7_rate",
        "remaining_orders",
        "remaining_active_days",
        "K",
    ])?;
    for p in profiles {
        wtr.write_record([
            &p.seller_id,
            &p.early_orders.to_string(),
            &p.early_k_date.format(TIMESTAMP_FORMAT).to_string(),
            &p.early_max_late.to_string(),
            &format!("{:.4}", p.early_p95_late),
            &format!("{:.4}", p.early_severe7_rate),
            &p.remaining_orders.to_string(),
            &p.remaining_active_days.to_string(),
            &p.k.to_string(),
        ])?;
    }
    finish(wtr)
}

/// Export the order-seller base table.
pub fn export_base_csv(base: &OrderSellerTable) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "order_id",
        "seller_id",
        "order_purchase_timestamp",
        "order_estimated_delivery_date",
        "order_delivered_customer_date",
        "delivery_delay_days",
        "late_days",
    ])?;
    for r in base.rows() {
        wtr.write_record([
            &r.order_id,
            &r.seller_id,
            &r.order_purchase_timestamp.format(TIMESTAMP_FORMAT).to_string(),
            &r.order_estimated_delivery_date.format(TIMESTAMP_FORMAT).to_string(),
            &r.order_delivered_customer_date.format(TIMESTAMP_FORMAT).to_string(),
            &r.delivery_delay_days.to_string(),
            &r.late_days.to_string(),
        ])?;
    }
    finish(wtr)
}

fn finish(wtr: csv::Writer<Vec<u8>>) -> Result<String> {
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the full artifact set for a run.
///
/// Creates a directory named `scan_{timestamp}/` under `output_dir`
/// containing:
/// - `manifest.json`: config, dataset hash, funnel counts, scan
/// - `base.csv`: eligible order-seller rows
/// - `sellers.csv`: merged exposure + outcome per seller
/// - `scan.csv`: threshold scan
/// - `report.md`: Markdown report
///
/// Returns the path to the created directory.
pub fn save_artifacts(result: &AnalysisResult, output_dir: &Path) -> Result<PathBuf> {
    let dirname = format!("scan_{}", chrono::Local::now().format("%Y%m%d_%H%M%S"));
    let run_dir = output_dir.join(dirname);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    write(&run_dir.join("manifest.json"), &export_manifest(result)?)?;
    write(&run_dir.join("base.csv"), &export_base_csv(&result.base)?)?;
    write(&run_dir.join("sellers.csv"), &export_profiles_csv(&result.profiles)?)?;
    write(&run_dir.join("scan.csv"), &export_scan_csv(&result.scan)?)?;
    write(&run_dir.join("report.md"), &generate_report(result))?;

    log::info!("artifacts written to {}", run_dir.display());
    Ok(run_dir)
}

fn write(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}

/// Load a manifest from an artifact directory. Rejects unknown schema versions.
pub fn load_artifacts(dir: &Path) -> Result<RunManifest> {
    let manifest_path = dir.join("manifest.json");
    let json = std::fs::read_to_string(&manifest_path)
        .with_context(|| format!("failed to read {}", manifest_path.display()))?;
    import_manifest(&json)
}

// ─── Markdown reports ───────────────────────────────────────────────

/// Generate a Markdown report for a run.
pub fn generate_report(result: &AnalysisResult) -> String {
    let cfg = &result.config;
    let c = &result.counts;
    let mut md = String::with_capacity(4096);

    md.push_str("# Early Delay Threshold Scan\n\n");

    md.push_str("## Metadata\n\n");
    md.push_str("| Field | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Early window (K) | {} orders |\n", cfg.k_early_orders));
    md.push_str(&format!("| Delay column | {} |\n", cfg.delay_column));
    md.push_str(&format!("| Outcome column | {} |\n", cfg.outcome_column));
    md.push_str(&format!(
        "| Thresholds | {}..={} days |\n",
        cfg.threshold_t_start, cfg.threshold_t_end
    ));
    md.push_str(&format!("| Only delivered | {} |\n", cfg.only_delivered));
    md.push_str(&format!("| Late days clipped at zero | {} |\n", cfg.late_days_clip_at_zero));
    md.push_str(&format!("| Dataset Hash | {} |\n", result.dataset_hash));
    md.push('\n');

    md.push_str("## Pipeline\n\n");
    md.push_str("| Stage | Rows | Sellers |\n");
    md.push_str("| --- | --- | --- |\n");
    md.push_str(&format!("| Orders loaded | {} | |\n", c.orders));
    md.push_str(&format!("| Order items loaded | {} | |\n", c.items));
    md.push_str(&format!("| Order-seller base | {} | {} |\n", c.base_rows, c.base_sellers));
    md.push_str(&format!(
        "| >= {} orders per seller | {} | {} |\n",
        cfg.min_delivered_orders_per_seller, c.eligible_rows, c.eligible_sellers
    ));
    md.push_str(&format!("| Exactly K early orders | | {} |\n", c.exposed_sellers));
    md.push_str(&format!(
        "| No orders after early window | | {} |\n",
        c.sellers_without_remaining
    ));
    md.push('\n');

    md.push_str("## Threshold Scan\n\n");
    md.push_str("| t | loss_days | n_hi | n_lo | note |\n");
    md.push_str("| --- | --- | --- | --- | --- |\n");
    for row in &result.scan {
        let loss = row
            .loss_days
            .map(|v| format!("{v:.2}"))
            .unwrap_or_else(|| "undefined".into());
        let note = if row.is_low_sample(cfg.min_group_size) {
            format!("group < {}", cfg.min_group_size)
        } else {
            String::new()
        };
        md.push_str(&format!(
            "| {} | {} | {} | {} | {} |\n",
            row.t, loss, row.n_hi, row.n_lo, note
        ));
    }
    md.push('\n');

    md.push_str("## Median Loss by Threshold\n\n");
    md.push_str("```text\n");
    md.push_str(&render_chart(&result.scan));
    md.push_str("```\n");

    md
}

/// Horizontal bar chart of `loss_days` per threshold, labelled with the
/// value rounded half to even. Undefined points are skipped.
pub fn render_chart(scan: &[ThresholdScanRecord]) -> String {
    let max_abs = scan
        .iter()
        .filter_map(|r| r.loss_days)
        .fold(0.0_f64, |acc, v| acc.max(v.abs()));

    let mut out = String::new();
    for row in scan {
        let Some(loss) = row.loss_days else {
            continue;
        };
        let len = if max_abs > 0.0 {
            ((loss.abs() / max_abs) * CHART_WIDTH as f64).round() as usize
        } else {
            0
        };
        let glyph = if loss < 0.0 { "-" } else { "#" };
        out.push_str(&format!(
            "t={:>3} | {} {}\n",
            row.t,
            glyph.repeat(len),
            loss.round_ties_even() as i64
        ));
    }
    if out.is_empty() {
        out.push_str("(no defined points)\n");
    }
    out
}
