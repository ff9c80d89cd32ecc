use std::fmt::Write as _;
use std::path::Path;

use proptest::prelude::*;
use sellerlag_core::AnalysisConfig;
use sellerlag_runner::{
    export_scan_csv, generate_report, load_artifacts, run_analysis, run_from_config,
    save_artifacts,
};

const ORDERS_HEADER: &str = "order_id,customer_id,order_status,order_purchase_timestamp,order_approved_at,order_delivered_carrier_date,order_delivered_customer_date,order_estimated_delivery_date";
const ITEMS_HEADER: &str =
    "order_id,order_item_id,product_id,seller_id,shipping_limit_date,price,freight_value";

/// Write an Olist-shaped dataset: `sellers` sellers with `n` orders each,
/// one per day. Seller i is late by `i * 3` days on its second order.
fn write_fixture(dir: &Path, sellers: usize, n: usize) {
    let mut orders = String::from(ORDERS_HEADER);
    let mut items = String::from(ITEMS_HEADER);
    orders.push('\n');
    items.push('\n');
    for s in 0..sellers {
        for i in 0..n {
            let id = format!("s{s}o{i:02}");
            let purchase = format!("2017-03-{:02} 08:15:00", i + 1);
            let estimated = format!("2017-04-{:02} 00:00:00", i + 1);
            let late = if i == 1 { s * 3 } else { 0 };
            let delivered = format!("2017-04-{:02} 17:40:00", i + 1 + late);
            // the last seller has an undelivered trailing order
            let status = if s + 1 == sellers && i + 1 == n { "shipped" } else { "delivered" };
            let delivered = if status == "shipped" { String::new() } else { delivered };
            writeln!(
                orders,
                "{id},c{s}{i},{status},{purchase},{purchase},{purchase},{delivered},{estimated}"
            )
            .unwrap();
            writeln!(items, "{id},1,p{i},seller{s},{purchase},10.00,2.50").unwrap();
            if i % 4 == 0 {
                // second item of the same order from the same seller
                writeln!(items, "{id},2,p{i}b,seller{s},{purchase},3.00,1.00").unwrap();
            }
        }
    }
    std::fs::write(dir.join("olist_orders_dataset.csv"), orders).unwrap();
    std::fs::write(dir.join("olist_order_items_dataset.csv"), items).unwrap();
}

fn config(dir: &Path) -> AnalysisConfig {
    AnalysisConfig {
        data_dir: dir.to_path_buf(),
        min_delivered_orders_per_seller: 5,
        k_early_orders: 3,
        threshold_t_start: 1,
        threshold_t_end: 8,
        min_group_size: 2,
        ..AnalysisConfig::default()
    }
}

#[test]
fn run_from_config_reads_olist_layout() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path(), 4, 10);
    let result = run_from_config(&config(dir.path())).unwrap();

    assert_eq!(result.counts.orders, 40);
    // duplicate items collapse, undelivered order is dropped
    assert_eq!(result.counts.base_rows, 39);
    assert_eq!(result.counts.eligible_sellers, 4);
    assert_eq!(result.exposure.len(), 4);
    assert!(result.exposure.iter().all(|e| e.early_orders == 3));

    let max_late: Vec<_> = result.exposure.iter().map(|e| e.early_max_late).collect();
    assert_eq!(max_late, vec![0, 3, 6, 9]);

    // every seller: 7 remaining orders over 6 days, except the last with 6 over 5
    let remaining: Vec<_> = result
        .outcome
        .iter()
        .map(|o| (o.remaining_orders, o.remaining_active_days))
        .collect();
    assert_eq!(remaining, vec![(7, 6), (7, 6), (7, 6), (6, 5)]);

    let t4 = result.scan.iter().find(|r| r.t == 4).unwrap();
    assert_eq!((t4.n_lo, t4.n_hi), (2, 2));
    assert_eq!(t4.loss_days, Some(0.5));
    let t8 = result.scan.iter().find(|r| r.t == 8).unwrap();
    assert_eq!((t8.n_lo, t8.n_hi), (3, 1));
}

#[test]
fn save_and_load_artifacts() {
    let data = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write_fixture(data.path(), 3, 8);
    let result = run_from_config(&config(data.path())).unwrap();

    let run_dir = save_artifacts(&result, out.path()).unwrap();
    for name in ["manifest.json", "base.csv", "sellers.csv", "scan.csv", "report.md"] {
        assert!(run_dir.join(name).exists(), "missing {name}");
    }

    let manifest = load_artifacts(&run_dir).unwrap();
    assert_eq!(manifest.scan, result.scan);
    assert_eq!(manifest.counts, result.counts);
    assert_eq!(manifest.dataset_hash, result.dataset_hash);
    assert_eq!(manifest.config, result.config);

    let scan_csv = std::fs::read_to_string(run_dir.join("scan.csv")).unwrap();
    assert_eq!(scan_csv.lines().count(), 1 + result.scan.len());
}

#[test]
fn report_flags_small_groups() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path(), 4, 10);
    let mut cfg = config(dir.path());
    cfg.min_group_size = 3;
    let result = run_from_config(&cfg).unwrap();

    let report = generate_report(&result);
    assert!(report.contains("# Early Delay Threshold Scan"));
    assert!(report.contains("group < 3"));
    assert!(report.contains("| 4 | 0.50 | 2 | 2 | group < 3 |"));
    assert!(report.contains(&result.dataset_hash));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Identical inputs give byte-identical scan exports.
    #[test]
    fn exports_are_reproducible(sellers in 1usize..6, n in 3usize..15, k in 1usize..4) {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path(), sellers, n);
        let cfg = AnalysisConfig {
            k_early_orders: k,
            min_delivered_orders_per_seller: 0,
            ..config(dir.path())
        };
        let (orders, items) = sellerlag_core::data::load_orders_items(&cfg).unwrap();
        let a = run_analysis(&orders, &items, &cfg);
        let b = run_analysis(&orders, &items, &cfg);
        prop_assert_eq!(&a, &b);
        prop_assert_eq!(export_scan_csv(&a.scan).unwrap(), export_scan_csv(&b.scan).unwrap());
    }
}
