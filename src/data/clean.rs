use crate::config::DashboardConfig;

use super::error::{DataError, Result};
use super::loader::RawTable;
use super::model::{Applicant, CategoricalAttribute, CellValue};

pub const ID_COLUMN: &str = "SK_ID_CURR";
pub const TARGET_COLUMN: &str = "TARGET";
pub const INCOME_COLUMN: &str = "AMT_INCOME_TOTAL";
pub const CREDIT_COLUMN: &str = "AMT_CREDIT";
pub const ANNUITY_COLUMN: &str = "AMT_ANNUITY";
pub const DAYS_BIRTH_COLUMN: &str = "DAYS_BIRTH";
pub const DAYS_EMPLOYED_COLUMN: &str = "DAYS_EMPLOYED";

/// Raw columns every source must provide.
pub fn required_columns() -> Vec<&'static str> {
    let mut columns = vec![TARGET_COLUMN];
    columns.extend(CategoricalAttribute::ALL.iter().map(|a| a.column()));
    columns.extend([
        INCOME_COLUMN,
        CREDIT_COLUMN,
        ANNUITY_COLUMN,
        DAYS_BIRTH_COLUMN,
        DAYS_EMPLOYED_COLUMN,
    ]);
    columns
}

// ---------------------------------------------------------------------------
// Day-count conversions
// ---------------------------------------------------------------------------

/// Employment status derived from `DAYS_EMPLOYED`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Employment {
    Active(f64),
    NotEmployed,
}

impl Employment {
    pub fn years(self) -> f64 {
        match self {
            Employment::Active(years) => years,
            Employment::NotEmployed => 0.0,
        }
    }
}

/// Fixed transformations from raw day counts to years.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Derivation {
    pub days_per_year: f64,
    pub employment_sentinel_days: Option<f64>,
    pub max_employment_years: f64,
}

impl From<&DashboardConfig> for Derivation {
    fn from(config: &DashboardConfig) -> Self {
        Self {
            days_per_year: config.days_per_year,
            employment_sentinel_days: config.employment_sentinel_days,
            max_employment_years: config.max_employment_years,
        }
    }
}

impl Derivation {
    /// `None` when the birth offset does not describe a positive age.
    pub fn age_years(&self, days_birth: f64) -> Option<f64> {
        let years = days_birth.abs() / self.days_per_year;
        (years.is_finite() && years > 0.0).then_some(years)
    }

    /// Active employment is stored as a non-positive day offset. Positive
    /// offsets, the configured sentinel and implausible magnitudes all mean
    /// "not employed".
    pub fn employment(&self, days_employed: f64) -> Employment {
        if self.employment_sentinel_days == Some(days_employed) || days_employed > 0.0 {
            return Employment::NotEmployed;
        }
        let years = days_employed.abs() / self.days_per_year;
        if years > self.max_employment_years {
            Employment::NotEmployed
        } else {
            Employment::Active(years)
        }
    }
}

// ---------------------------------------------------------------------------
// Row cleaning
// ---------------------------------------------------------------------------

/// Outcome of [`clean_table`].
#[derive(Debug, Clone, PartialEq)]
pub struct Cleaned {
    pub records: Vec<Applicant>,
    /// Rows skipped for a missing attribute or a non-positive age.
    pub rows_dropped: usize,
    /// Rows whose employment was normalized to "not employed".
    pub employment_normalized: usize,
}

/// Positions of the projected columns inside a [`RawTable`] row.
struct ColumnIndex {
    id: Option<usize>,
    target: usize,
    categorical: [usize; 5],
    income: usize,
    credit: usize,
    annuity: usize,
    days_birth: usize,
    days_employed: usize,
}

impl ColumnIndex {
    fn resolve(table: &RawTable) -> Result<Self> {
        let find = |name: &str| {
            table
                .column_index(name)
                .ok_or_else(|| DataError::MissingColumn(name.to_string()))
        };
        let mut categorical = [0; 5];
        for (slot, attr) in categorical.iter_mut().zip(CategoricalAttribute::ALL) {
            *slot = find(attr.column())?;
        }
        Ok(Self {
            id: table.column_index(ID_COLUMN),
            target: find(TARGET_COLUMN)?,
            categorical,
            income: find(INCOME_COLUMN)?,
            credit: find(CREDIT_COLUMN)?,
            annuity: find(ANNUITY_COLUMN)?,
            days_birth: find(DAYS_BIRTH_COLUMN)?,
            days_employed: find(DAYS_EMPLOYED_COLUMN)?,
        })
    }

    fn required(&self) -> impl Iterator<Item = usize> + '_ {
        [
            self.target,
            self.income,
            self.credit,
            self.annuity,
            self.days_birth,
            self.days_employed,
        ]
        .into_iter()
        .chain(self.categorical)
    }
}

/// Turn the projected raw table into applicants with derived attributes.
pub fn clean_table(table: &RawTable, derivation: &Derivation) -> Result<Cleaned> {
    let idx = ColumnIndex::resolve(table)?;
    let mut records = Vec::with_capacity(table.rows.len());
    let mut rows_dropped = 0;
    let mut employment_normalized = 0;

    for (row_no, row) in table.rows.iter().enumerate() {
        if idx.required().any(|i| row[i].is_missing()) {
            rows_dropped += 1;
            continue;
        }

        let number = |i: usize| -> Result<f64> {
            row[i]
                .as_f64()
                .filter(|v| v.is_finite())
                .ok_or_else(|| invalid(row_no, &table.columns[i], &row[i]))
        };
        let amount = |i: usize| -> Result<f64> {
            let value = number(i)?;
            if value < 0.0 {
                return Err(invalid(row_no, &table.columns[i], &row[i]));
            }
            Ok(value)
        };

        let target = match number(idx.target)? {
            t if t == 0.0 => 0,
            t if t == 1.0 => 1,
            _ => return Err(invalid(row_no, TARGET_COLUMN, &row[idx.target])),
        };

        let income_total = amount(idx.income)?;
        let credit_amount = amount(idx.credit)?;
        let annuity_amount = amount(idx.annuity)?;
        let days_employed = number(idx.days_employed)?;

        let Some(age_years) = derivation.age_years(number(idx.days_birth)?) else {
            log::debug!("Row {row_no}: dropping applicant with non-positive age");
            rows_dropped += 1;
            continue;
        };

        let employment = derivation.employment(days_employed);
        if employment == Employment::NotEmployed {
            employment_normalized += 1;
        }

        let id = idx
            .id
            .and_then(|i| row[i].as_f64())
            .map(|v| v as i64)
            .unwrap_or(row_no as i64);

        let [gender, education_type, family_status, housing_type, contract_type] =
            idx.categorical.map(|i| category(&row[i]));

        records.push(Applicant {
            id,
            target,
            gender,
            education_type,
            family_status,
            housing_type,
            contract_type,
            income_total,
            credit_amount,
            annuity_amount,
            age_years,
            employment_years: employment.years(),
        });
    }

    Ok(Cleaned {
        records,
        rows_dropped,
        employment_normalized,
    })
}

fn category(cell: &CellValue) -> String {
    match cell {
        CellValue::String(s) => s.trim().to_string(),
        other => other.to_string(),
    }
}

fn invalid(row: usize, column: &str, cell: &CellValue) -> DataError {
    DataError::InvalidValue {
        row,
        column: column.to_string(),
        value: cell.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn derivation() -> Derivation {
        Derivation::from(&DashboardConfig::default())
    }

    fn table(rows: Vec<Vec<CellValue>>) -> RawTable {
        let mut columns: Vec<String> = vec![ID_COLUMN.to_string()];
        columns.extend(required_columns().into_iter().map(String::from));
        RawTable { columns, rows }
    }

    /// Cells in `required_columns()` order, preceded by the id.
    fn row(id: i64, target: CellValue, annuity: CellValue, birth: f64, employed: f64) -> Vec<CellValue> {
        let s = |v: &str| CellValue::String(v.to_string());
        vec![
            CellValue::Integer(id),
            target,
            s("M"),
            s("Higher education"),
            s("Married"),
            s("House / apartment"),
            s("Cash loans"),
            CellValue::Float(100_000.0),
            CellValue::Float(250_000.0),
            annuity,
            CellValue::Float(birth),
            CellValue::Float(employed),
        ]
    }

    #[test]
    fn age_is_absolute_days_over_year_length() {
        let d = derivation();
        assert_eq!(d.age_years(-3650.0), Some(10.0));
        assert_eq!(d.age_years(3650.0), Some(10.0));
        assert_eq!(d.age_years(0.0), None);
    }

    #[test]
    fn employment_sentinel_and_positive_offsets_mean_not_employed() {
        let d = derivation();
        assert_eq!(d.employment(365_243.0), Employment::NotEmployed);
        assert_eq!(d.employment(12.0), Employment::NotEmployed);
        assert_eq!(d.employment(-730.0), Employment::Active(2.0));
        assert_eq!(d.employment(0.0), Employment::Active(0.0));
        // 70 years of employment is not plausible
        assert_eq!(d.employment(-365.0 * 70.0), Employment::NotEmployed);
        assert_eq!(Employment::NotEmployed.years(), 0.0);
    }

    #[test]
    fn custom_sentinel_is_honoured() {
        let d = Derivation {
            employment_sentinel_days: Some(-99_999.0),
            max_employment_years: 1_000.0,
            ..derivation()
        };
        assert_eq!(d.employment(-99_999.0), Employment::NotEmployed);
    }

    #[test]
    fn incomplete_rows_are_dropped_and_counted() {
        let t = table(vec![
            row(1, CellValue::Integer(0), CellValue::Float(9_000.0), -10_950.0, -365.0),
            row(2, CellValue::Integer(1), CellValue::Null, -10_950.0, -365.0),
            row(3, CellValue::Integer(1), CellValue::Float(9_000.0), 0.0, 365_243.0),
            row(4, CellValue::Integer(1), CellValue::Float(9_000.0), -14_600.0, 365_243.0),
        ]);
        let cleaned = clean_table(&t, &derivation()).unwrap();
        assert_eq!(cleaned.rows_dropped, 2);
        assert_eq!(cleaned.employment_normalized, 1);
        let ids: Vec<i64> = cleaned.records.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 4]);
        assert_eq!(cleaned.records[0].age_years, 30.0);
        assert_eq!(cleaned.records[0].employment_years, 1.0);
        assert_eq!(cleaned.records[1].employment_years, 0.0);
    }

    #[test]
    fn target_outside_binary_domain_is_corrupt() {
        let t = table(vec![row(
            7,
            CellValue::Integer(2),
            CellValue::Float(1.0),
            -10_000.0,
            -10.0,
        )]);
        let err = clean_table(&t, &derivation()).unwrap_err();
        assert!(matches!(err, DataError::InvalidValue { row: 0, ref column, .. } if column == TARGET_COLUMN));
    }

    #[test]
    fn text_in_numeric_column_is_corrupt() {
        let t = table(vec![row(
            7,
            CellValue::Integer(0),
            CellValue::String("lots".into()),
            -10_000.0,
            -10.0,
        )]);
        let err = clean_table(&t, &derivation()).unwrap_err();
        assert!(matches!(err, DataError::InvalidValue { ref column, .. } if column == ANNUITY_COLUMN));
    }

    #[test]
    fn negative_amount_is_corrupt() {
        let mut r = row(7, CellValue::Integer(0), CellValue::Float(1.0), -10_000.0, -10.0);
        r[8] = CellValue::Float(-250_000.0);
        let err = clean_table(&table(vec![r]), &derivation()).unwrap_err();
        assert!(matches!(err, DataError::InvalidValue { ref column, .. } if column == CREDIT_COLUMN));
    }

    #[test]
    fn infinite_number_is_corrupt() {
        let t = table(vec![row(
            7,
            CellValue::Integer(0),
            CellValue::Float(f64::INFINITY),
            -10_000.0,
            -10.0,
        )]);
        let err = clean_table(&t, &derivation()).unwrap_err();
        assert!(matches!(err, DataError::InvalidValue { ref column, .. } if column == ANNUITY_COLUMN));
    }

    #[test]
    fn corrupt_amount_is_rejected_even_when_age_is_unusable() {
        let mut r = row(7, CellValue::Integer(0), CellValue::Float(1.0), 0.0, -10.0);
        r[7] = CellValue::Float(-1.0);
        let err = clean_table(&table(vec![r]), &derivation()).unwrap_err();
        assert!(matches!(err, DataError::InvalidValue { row: 0, ref column, .. } if column == INCOME_COLUMN));
    }

    #[test]
    fn missing_column_is_reported_by_name() {
        let mut t = table(Vec::new());
        t.columns.retain(|c| c != DAYS_EMPLOYED_COLUMN);
        let err = clean_table(&t, &derivation()).unwrap_err();
        assert!(matches!(err, DataError::MissingColumn(c) if c == DAYS_EMPLOYED_COLUMN));
    }

    #[test]
    fn row_index_stands_in_for_missing_id_column() {
        let mut t = table(vec![
            row(0, CellValue::Integer(0), CellValue::Float(1.0), -10_000.0, -10.0),
            row(0, CellValue::Integer(0), CellValue::Float(1.0), -10_000.0, -10.0),
        ]);
        t.columns.remove(0);
        for r in &mut t.rows {
            r.remove(0);
        }
        let cleaned = clean_table(&t, &derivation()).unwrap();
        let ids: Vec<i64> = cleaned.records.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![0, 1]);
    }
}
