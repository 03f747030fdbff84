//! Deterministic advertising-style fixtures.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

pub const HEADER: &str = "Daily Time Spent on Site,Age,Area Income,Daily Internet Usage,\
Ad Topic Line,City,Male,Country,Timestamp,Clicked on Ad";

/// Render `rows` advertising records as CSV text.
pub fn advertising_csv(rows: usize, seed: u64) -> String {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut out = String::from(HEADER);
    out.push('\n');

    for i in 0..rows {
        let time: f64 = 32.0 + 60.0 * rng.r#gen::<f64>();
        let age: i64 = rng.gen_range(19..61);
        let income: f64 = 14000.0 + 65000.0 * rng.r#gen::<f64>();
        let usage: f64 = 104.0 + 165.0 * rng.r#gen::<f64>();
        let male: i64 = rng.gen_range(0..2);
        let noise: f64 = rng.gen_range(-0.5..0.5);
        let score = -(time - 65.0) / 15.0 - (usage - 180.0) / 40.0 + (age as f64 - 36.0) / 10.0 + noise;
        let clicked = i64::from(score > 0.0);

        writeln!(
            out,
            "{:.2},{},{:.2},{:.2},\"Topic {}, line\",City{},{},Country{},2016-03-{:02} 21:{:02}:00,{}",
            time,
            age,
            income,
            usage,
            i % 17,
            i % 31,
            male,
            i % 11,
            1 + i % 28,
            i % 60,
            clicked
        )
        .unwrap();
    }
    out
}

/// Write a fixture file named `advertising.csv` into `dir`.
pub fn write_advertising_csv(dir: &Path, rows: usize) -> PathBuf {
    let path = dir.join("advertising.csv");
    std::fs::write(&path, advertising_csv(rows, 7)).unwrap();
    path
}
