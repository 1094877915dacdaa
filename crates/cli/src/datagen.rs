//! `stocklens gen` — seeded synthetic raw extracts with deliberate defects.
//!
//! Output reproduces byte-for-byte for a given seed, so generated
//! datasets can serve as shared test fixtures. Defect rows are appended
//! after the clean rows: a negative quantity, an over-limit quantity, a
//! recoverable one-character identifier typo, an unrecoverable unknown
//! identifier, and an exact duplicate (store, product, date) pair.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::CliError;

pub struct GenOptions {
    pub out_dir: PathBuf,
    pub seed: u64,
    pub products: usize,
    pub stores: usize,
    pub snapshots: usize,
    pub restocks: usize,
    pub damages: usize,
}

const CATEGORIES: [&str; 4] = ["Electronics", "Clothing", "Home", "Toys"];

const WORDS: [&str; 16] = [
    "anchor", "breeze", "cedar", "dune", "ember", "fjord", "garnet", "harbor",
    "ivory", "juniper", "krypton", "lumen", "meadow", "nimbus", "opal", "pewter",
];

const CITIES: [&str; 10] = [
    "Springfield", "Riverton", "Oakdale", "Fairview", "Milltown",
    "Lakeside", "Granville", "Ashford", "Brookfield", "Kingsport",
];

fn date_str(rng: &mut StdRng) -> String {
    let day = rng.gen_range(1..=28);
    NaiveDate::from_ymd_opt(2024, 1, day)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "2024-01-01".to_string())
}

fn pick<'a>(rng: &mut StdRng, items: &'a [String]) -> &'a str {
    &items[rng.gen_range(0..items.len())]
}

fn csv_writer(path: &Path) -> Result<csv::Writer<std::fs::File>, CliError> {
    csv::Writer::from_path(path)
        .map_err(|e| CliError::runtime(format!("cannot write {}: {e}", path.display())))
}

fn finish(mut writer: csv::Writer<std::fs::File>, path: &Path) -> Result<(), CliError> {
    writer
        .flush()
        .map_err(|e| CliError::runtime(format!("cannot write {}: {e}", path.display())))
}

fn write_row<I, T>(writer: &mut csv::Writer<std::fs::File>, row: I) -> Result<(), CliError>
where
    I: IntoIterator<Item = T>,
    T: AsRef<[u8]>,
{
    writer
        .write_record(row)
        .map_err(|e| CliError::runtime(e.to_string()))
}

fn write_products(
    path: &Path,
    rng: &mut StdRng,
    count: usize,
) -> Result<Vec<String>, CliError> {
    let mut writer = csv_writer(path)?;
    write_row(&mut writer, ["product_id", "product_name", "category", "unit_price"])?;

    let mut ids = Vec::with_capacity(count);
    for i in 0..count {
        let id = format!("P{i:04}");
        let category = CATEGORIES[rng.gen_range(0..CATEGORIES.len())];
        let word = WORDS[rng.gen_range(0..WORDS.len())];
        let cents: u32 = rng.gen_range(1000..=50000);
        write_row(
            &mut writer,
            [
                id.clone(),
                format!("{word} {category}"),
                category.to_string(),
                format!("{}.{:02}", cents / 100, cents % 100),
            ],
        )?;
        ids.push(id);
    }
    finish(writer, path)?;
    Ok(ids)
}

fn write_stores(path: &Path, rng: &mut StdRng, count: usize) -> Result<Vec<String>, CliError> {
    let mut writer = csv_writer(path)?;
    write_row(&mut writer, ["store_id", "store_name", "city"])?;

    let mut ids = Vec::with_capacity(count);
    for i in 0..count {
        let id = format!("S{i:03}");
        let city = CITIES[rng.gen_range(0..CITIES.len())];
        write_row(&mut writer, [id.clone(), format!("{city} Store"), city.to_string()])?;
        ids.push(id);
    }
    finish(writer, path)?;
    Ok(ids)
}

fn write_snapshots(
    path: &Path,
    rng: &mut StdRng,
    count: usize,
    products: &[String],
    stores: &[String],
) -> Result<(), CliError> {
    let mut writer = csv_writer(path)?;
    write_row(&mut writer, ["date", "store_id", "product_id", "quantity"])?;

    for _ in 0..count {
        let qty: i64 = rng.gen_range(0..=500);
        write_row(
            &mut writer,
            [
                date_str(rng),
                pick(rng, stores).to_string(),
                pick(rng, products).to_string(),
                qty.to_string(),
            ],
        )?;
    }

    // Seeded defects, appended after the clean rows.
    let store = stores[0].clone();

    // Negative stock
    write_row(
        &mut writer,
        ["2024-01-15".into(), store.clone(), products[0].clone(), "-10".to_string()],
    )?;

    // Over-limit stock
    write_row(
        &mut writer,
        ["2024-01-16".into(), store.clone(), products[0].clone(), "1500".to_string()],
    )?;

    // Recoverable typo: one zero swapped for the letter O.
    let victim = &products[5.min(products.len() - 1)];
    let typo = victim.replacen('0', "O", 1);
    write_row(&mut writer, ["2024-01-17".into(), store.clone(), typo, "50".to_string()])?;

    // Unrecoverable identifier
    write_row(
        &mut writer,
        ["2024-01-18".into(), store.clone(), "ZZZ999".to_string(), "5".to_string()],
    )?;

    // Exact duplicate pair
    for qty in ["40", "45"] {
        write_row(
            &mut writer,
            ["2024-01-19".into(), store.clone(), products[1.min(products.len() - 1)].clone(), qty.to_string()],
        )?;
    }

    finish(writer, path)
}

fn write_events(
    path: &Path,
    rng: &mut StdRng,
    count: usize,
    date_column: &str,
    qty_column: &str,
    qty_range: std::ops::RangeInclusive<i64>,
    products: &[String],
    stores: &[String],
    defect: Option<&str>,
) -> Result<(), CliError> {
    let mut writer = csv_writer(path)?;
    write_row(&mut writer, [date_column, "store_id", "product_id", qty_column])?;

    for _ in 0..count {
        let qty: i64 = rng.gen_range(qty_range.clone());
        write_row(
            &mut writer,
            [
                date_str(rng),
                pick(rng, stores).to_string(),
                pick(rng, products).to_string(),
                qty.to_string(),
            ],
        )?;
    }

    if let Some(bad_qty) = defect {
        write_row(
            &mut writer,
            [
                "2024-01-20".to_string(),
                stores[0].clone(),
                products[0].clone(),
                bad_qty.to_string(),
            ],
        )?;
    }

    finish(writer, path)
}

pub fn cmd_gen(opts: GenOptions) -> Result<(), CliError> {
    if opts.products == 0 || opts.stores == 0 {
        return Err(CliError::args("--products and --stores must be at least 1"));
    }

    std::fs::create_dir_all(&opts.out_dir).map_err(|e| {
        CliError::runtime(format!("cannot create {}: {e}", opts.out_dir.display()))
    })?;

    let mut rng = StdRng::seed_from_u64(opts.seed);

    let products = write_products(&opts.out_dir.join("products.csv"), &mut rng, opts.products)?;
    let stores = write_stores(&opts.out_dir.join("stores.csv"), &mut rng, opts.stores)?;

    write_snapshots(
        &opts.out_dir.join("inventory_snapshot_1.csv"),
        &mut rng,
        opts.snapshots,
        &products,
        &stores,
    )?;
    write_events(
        &opts.out_dir.join("restock_events_1.csv"),
        &mut rng,
        opts.restocks,
        "event_date",
        "restock_qty",
        1..=200,
        &products,
        &stores,
        Some("-5"),
    )?;
    write_events(
        &opts.out_dir.join("damaged_log_1.csv"),
        &mut rng,
        opts.damages,
        "date",
        "damaged_qty",
        1..=50,
        &products,
        &stores,
        None,
    )?;

    eprintln!(
        "generated {} products, {} stores, {} snapshot rows (+6 defect rows), {} restocks, {} damage rows in {}",
        opts.products,
        opts.stores,
        opts.snapshots,
        opts.restocks,
        opts.damages,
        opts.out_dir.display(),
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(out_dir: PathBuf, seed: u64) -> GenOptions {
        GenOptions {
            out_dir,
            seed,
            products: 10,
            stores: 3,
            snapshots: 20,
            restocks: 5,
            damages: 5,
        }
    }

    #[test]
    fn generates_all_files_with_defects() {
        let dir = tempfile::tempdir().unwrap();
        cmd_gen(options(dir.path().to_path_buf(), 42)).unwrap();

        let products =
            std::fs::read_to_string(dir.path().join("products.csv")).unwrap();
        assert_eq!(products.lines().count(), 11); // header + 10
        assert!(products.starts_with("product_id,product_name,category,unit_price"));

        let snapshots =
            std::fs::read_to_string(dir.path().join("inventory_snapshot_1.csv")).unwrap();
        assert_eq!(snapshots.lines().count(), 1 + 20 + 6);
        assert!(snapshots.contains(",-10"));
        assert!(snapshots.contains(",1500"));
        assert!(snapshots.contains("ZZZ999"));
        assert!(snapshots.contains("PO005")); // P0005 with one zero swapped

        let restocks =
            std::fs::read_to_string(dir.path().join("restock_events_1.csv")).unwrap();
        assert!(restocks.starts_with("event_date,store_id,product_id,restock_qty"));
        assert!(restocks.contains(",-5"));
    }

    #[test]
    fn same_seed_reproduces_identical_files() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        cmd_gen(options(a.path().to_path_buf(), 7)).unwrap();
        cmd_gen(options(b.path().to_path_buf(), 7)).unwrap();

        for file in [
            "products.csv",
            "stores.csv",
            "inventory_snapshot_1.csv",
            "restock_events_1.csv",
            "damaged_log_1.csv",
        ] {
            let left = std::fs::read_to_string(a.path().join(file)).unwrap();
            let right = std::fs::read_to_string(b.path().join(file)).unwrap();
            assert_eq!(left, right, "{file} differs between identical seeds");
        }
    }

    #[test]
    fn rejects_zero_products() {
        let dir = tempfile::tempdir().unwrap();
        let mut opts = options(dir.path().to_path_buf(), 1);
        opts.products = 0;
        assert!(cmd_gen(opts).is_err());
    }
}
