//! Writes a synthetic applicant table as Parquet and CSV.
//!
//! Usage: `generate_sample [rows] [output_dir]` (defaults: 5000, `data`).

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

const EMPLOYMENT_SENTINEL_DAYS: i64 = 365_243;

const GENDERS: &[(&str, f64)] = &[("F", 0.66), ("M", 0.34)];
const CONTRACTS: &[(&str, f64)] = &[("Cash loans", 0.9), ("Revolving loans", 0.1)];
const EDUCATION: &[(&str, f64)] = &[
    ("Secondary / secondary special", 0.71),
    ("Higher education", 0.24),
    ("Incomplete higher", 0.03),
    ("Lower secondary", 0.015),
    ("Academic degree", 0.005),
];
const FAMILY: &[(&str, f64)] = &[
    ("Married", 0.64),
    ("Single / not married", 0.15),
    ("Civil marriage", 0.1),
    ("Separated", 0.06),
    ("Widow", 0.05),
];
const HOUSING: &[(&str, f64)] = &[
    ("House / apartment", 0.89),
    ("With parents", 0.05),
    ("Municipal apartment", 0.03),
    ("Rented apartment", 0.02),
    ("Office apartment", 0.01),
];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }

    /// Pick from (value, weight) pairs.
    fn weighted<'a>(&mut self, choices: &[(&'a str, f64)]) -> &'a str {
        let total: f64 = choices.iter().map(|(_, w)| w).sum();
        let mut roll = self.next_f64() * total;
        for &(value, weight) in choices {
            if roll < weight {
                return value;
            }
            roll -= weight;
        }
        choices.last().map_or("", |(value, _)| *value)
    }
}

#[derive(Default)]
struct Columns {
    id: Vec<i64>,
    target: Vec<i64>,
    contract: Vec<&'static str>,
    gender: Vec<&'static str>,
    income: Vec<f64>,
    credit: Vec<f64>,
    annuity: Vec<f64>,
    education: Vec<&'static str>,
    family: Vec<&'static str>,
    housing: Vec<&'static str>,
    days_birth: Vec<i64>,
    days_employed: Vec<i64>,
}

fn round_to(value: f64, step: f64) -> f64 {
    (value / step).round() * step
}

fn generate(rows: usize, rng: &mut SimpleRng) -> Columns {
    let mut cols = Columns::default();
    for i in 0..rows {
        let gender = rng.weighted(GENDERS);
        let contract = rng.weighted(CONTRACTS);
        let education = rng.weighted(EDUCATION);
        let family = rng.weighted(FAMILY);
        let housing = rng.weighted(HOUSING);

        let age_years = rng.uniform(21.0, 69.0);
        let income = round_to(rng.gauss(11.8, 0.5).exp().max(25_650.0), 225.0);
        let credit = round_to(income * rng.uniform(1.0, 6.0), 450.0);
        let annuity = round_to(credit * rng.uniform(0.03, 0.08), 4.5);

        // Pensioners carry the "not employed" placeholder.
        let days_employed = if age_years > 60.0 && rng.next_f64() < 0.8 {
            EMPLOYMENT_SENTINEL_DAYS
        } else {
            let max_years = (age_years - 18.0).max(0.5);
            -(rng.uniform(0.1, max_years.min(40.0)) * 365.0) as i64
        };

        let mut risk = 0.05;
        if gender == "M" {
            risk += 0.03;
        }
        if matches!(education, "Lower secondary" | "Secondary / secondary special") {
            risk += 0.03;
        }
        if matches!(housing, "Rented apartment" | "With parents" | "Municipal apartment") {
            risk += 0.04;
        }
        if age_years < 30.0 {
            risk += 0.03;
        }
        if credit / income > 4.0 {
            risk += 0.02;
        }
        let target = i64::from(rng.next_f64() < risk);

        cols.id.push(100_002 + i as i64);
        cols.target.push(target);
        cols.contract.push(contract);
        cols.gender.push(gender);
        cols.income.push(income);
        cols.credit.push(credit);
        cols.annuity.push(annuity);
        cols.education.push(education);
        cols.family.push(family);
        cols.housing.push(housing);
        cols.days_birth.push(-(age_years * 365.0) as i64);
        cols.days_employed.push(days_employed);
    }
    cols
}

fn to_batch(cols: &Columns) -> Result<RecordBatch> {
    let strings = |values: &[&'static str]| -> ArrayRef { Arc::new(StringArray::from(values.to_vec())) };

    let schema = Arc::new(Schema::new(vec![
        Field::new("SK_ID_CURR", DataType::Int64, false),
        Field::new("TARGET", DataType::Int64, false),
        Field::new("NAME_CONTRACT_TYPE", DataType::Utf8, false),
        Field::new("CODE_GENDER", DataType::Utf8, false),
        Field::new("AMT_INCOME_TOTAL", DataType::Float64, false),
        Field::new("AMT_CREDIT", DataType::Float64, false),
        Field::new("AMT_ANNUITY", DataType::Float64, false),
        Field::new("NAME_EDUCATION_TYPE", DataType::Utf8, false),
        Field::new("NAME_FAMILY_STATUS", DataType::Utf8, false),
        Field::new("NAME_HOUSING_TYPE", DataType::Utf8, false),
        Field::new("DAYS_BIRTH", DataType::Int64, false),
        Field::new("DAYS_EMPLOYED", DataType::Int64, false),
    ]));

    let arrays: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from(cols.id.clone())),
        Arc::new(Int64Array::from(cols.target.clone())),
        strings(&cols.contract),
        strings(&cols.gender),
        Arc::new(Float64Array::from(cols.income.clone())),
        Arc::new(Float64Array::from(cols.credit.clone())),
        Arc::new(Float64Array::from(cols.annuity.clone())),
        strings(&cols.education),
        strings(&cols.family),
        strings(&cols.housing),
        Arc::new(Int64Array::from(cols.days_birth.clone())),
        Arc::new(Int64Array::from(cols.days_employed.clone())),
    ];

    RecordBatch::try_new(schema, arrays).context("building record batch")
}

fn write_parquet(batch: &RecordBatch, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None)?;
    writer.write(batch)?;
    writer.close()?;
    Ok(())
}

fn write_csv(batch: &RecordBatch, cols: &Columns, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    let schema = batch.schema();
    writer.write_record(schema.fields().iter().map(|f| f.name().as_str()))?;
    for i in 0..cols.id.len() {
        writer.write_record([
            cols.id[i].to_string(),
            cols.target[i].to_string(),
            cols.contract[i].to_string(),
            cols.gender[i].to_string(),
            cols.income[i].to_string(),
            cols.credit[i].to_string(),
            cols.annuity[i].to_string(),
            cols.education[i].to_string(),
            cols.family[i].to_string(),
            cols.housing[i].to_string(),
            cols.days_birth[i].to_string(),
            cols.days_employed[i].to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let rows: usize = match args.next() {
        Some(n) => n.parse().with_context(|| format!("invalid row count {n:?}"))?,
        None => 5_000,
    };
    let out_dir = PathBuf::from(args.next().unwrap_or_else(|| "data".to_string()));
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    let mut rng = SimpleRng::new(42);
    let cols = generate(rows, &mut rng);
    let batch = to_batch(&cols)?;

    let parquet_path = out_dir.join("sample_applicants.parquet");
    let csv_path = out_dir.join("sample_applicants.csv");
    write_parquet(&batch, &parquet_path)?;
    write_csv(&batch, &cols, &csv_path)?;

    let defaults = cols.target.iter().filter(|&&t| t == 1).count();
    println!(
        "Wrote {rows} applicants ({defaults} defaults) to {} and {}",
        parquet_path.display(),
        csv_path.display()
    );
    Ok(())
}
