use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use super::error::DataError;

// ---------------------------------------------------------------------------
// CellValue – a single raw cell before cleaning
// ---------------------------------------------------------------------------

/// A dynamically-typed cell as read from CSV, JSON or Parquet.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// Interpret the value as an `f64`. Numeric text is accepted since JSON
    /// exports sometimes quote numbers.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Whether the cell carries no value at all.
    pub fn is_missing(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::String(s) => s.trim().is_empty(),
            CellValue::Float(v) => v.is_nan(),
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Attributes – the closed vocabulary filters and charts talk about
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NumericAttribute {
    IncomeTotal,
    CreditAmount,
    AnnuityAmount,
    AgeYears,
    EmploymentYears,
}

impl NumericAttribute {
    pub const ALL: [NumericAttribute; 5] = [
        NumericAttribute::IncomeTotal,
        NumericAttribute::CreditAmount,
        NumericAttribute::AnnuityAmount,
        NumericAttribute::AgeYears,
        NumericAttribute::EmploymentYears,
    ];

    pub fn key(self) -> &'static str {
        match self {
            NumericAttribute::IncomeTotal => "income_total",
            NumericAttribute::CreditAmount => "credit_amount",
            NumericAttribute::AnnuityAmount => "annuity_amount",
            NumericAttribute::AgeYears => "age_years",
            NumericAttribute::EmploymentYears => "employment_years",
        }
    }

    /// Column name in the cleaned table (derived columns have no raw name).
    pub fn column(self) -> &'static str {
        match self {
            NumericAttribute::IncomeTotal => "AMT_INCOME_TOTAL",
            NumericAttribute::CreditAmount => "AMT_CREDIT",
            NumericAttribute::AnnuityAmount => "AMT_ANNUITY",
            NumericAttribute::AgeYears => "AGE_YEARS",
            NumericAttribute::EmploymentYears => "EMPLOYMENT_YEARS",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            NumericAttribute::IncomeTotal => "Income",
            NumericAttribute::CreditAmount => "Credit",
            NumericAttribute::AnnuityAmount => "Annuity",
            NumericAttribute::AgeYears => "Age (years)",
            NumericAttribute::EmploymentYears => "Employment (years)",
        }
    }

    pub fn value(self, applicant: &Applicant) -> f64 {
        match self {
            NumericAttribute::IncomeTotal => applicant.income_total,
            NumericAttribute::CreditAmount => applicant.credit_amount,
            NumericAttribute::AnnuityAmount => applicant.annuity_amount,
            NumericAttribute::AgeYears => applicant.age_years,
            NumericAttribute::EmploymentYears => applicant.employment_years,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CategoricalAttribute {
    Gender,
    EducationType,
    FamilyStatus,
    HousingType,
    ContractType,
}

impl CategoricalAttribute {
    pub const ALL: [CategoricalAttribute; 5] = [
        CategoricalAttribute::Gender,
        CategoricalAttribute::EducationType,
        CategoricalAttribute::FamilyStatus,
        CategoricalAttribute::HousingType,
        CategoricalAttribute::ContractType,
    ];

    pub fn key(self) -> &'static str {
        match self {
            CategoricalAttribute::Gender => "gender",
            CategoricalAttribute::EducationType => "education_type",
            CategoricalAttribute::FamilyStatus => "family_status",
            CategoricalAttribute::HousingType => "housing_type",
            CategoricalAttribute::ContractType => "contract_type",
        }
    }

    pub fn column(self) -> &'static str {
        match self {
            CategoricalAttribute::Gender => "CODE_GENDER",
            CategoricalAttribute::EducationType => "NAME_EDUCATION_TYPE",
            CategoricalAttribute::FamilyStatus => "NAME_FAMILY_STATUS",
            CategoricalAttribute::HousingType => "NAME_HOUSING_TYPE",
            CategoricalAttribute::ContractType => "NAME_CONTRACT_TYPE",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CategoricalAttribute::Gender => "Gender",
            CategoricalAttribute::EducationType => "Education",
            CategoricalAttribute::FamilyStatus => "Family Status",
            CategoricalAttribute::HousingType => "Housing Type",
            CategoricalAttribute::ContractType => "Contract Type",
        }
    }

    pub fn value(self, applicant: &Applicant) -> &str {
        match self {
            CategoricalAttribute::Gender => &applicant.gender,
            CategoricalAttribute::EducationType => &applicant.education_type,
            CategoricalAttribute::FamilyStatus => &applicant.family_status,
            CategoricalAttribute::HousingType => &applicant.housing_type,
            CategoricalAttribute::ContractType => &applicant.contract_type,
        }
    }
}

/// Any attribute a filter can constrain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Attribute {
    Numeric(NumericAttribute),
    Categorical(CategoricalAttribute),
}

impl Attribute {
    pub fn key(self) -> &'static str {
        match self {
            Attribute::Numeric(a) => a.key(),
            Attribute::Categorical(a) => a.key(),
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Attribute {
    type Err = DataError;

    /// Accepts the snake-case key or the table column name, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        let numeric = NumericAttribute::ALL
            .into_iter()
            .find(|a| a.key().eq_ignore_ascii_case(name) || a.column().eq_ignore_ascii_case(name))
            .map(Attribute::Numeric);
        let categorical = || {
            CategoricalAttribute::ALL
                .into_iter()
                .find(|a| {
                    a.key().eq_ignore_ascii_case(name) || a.column().eq_ignore_ascii_case(name)
                })
                .map(Attribute::Categorical)
        };
        numeric
            .or_else(categorical)
            .ok_or_else(|| DataError::UnknownAttribute(name.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Applicant – one row of the cleaned table
// ---------------------------------------------------------------------------

/// One loan application after cleaning. Every field is present and finite.
#[derive(Debug, Clone, PartialEq)]
pub struct Applicant {
    /// `SK_ID_CURR` when the source has it, otherwise the source row index.
    pub id: i64,
    /// 1 = default, 0 = repaid.
    pub target: u8,
    pub gender: String,
    pub education_type: String,
    pub family_status: String,
    pub housing_type: String,
    pub contract_type: String,
    pub income_total: f64,
    pub credit_amount: f64,
    pub annuity_amount: f64,
    pub age_years: f64,
    pub employment_years: f64,
}

impl Applicant {
    pub fn is_default(&self) -> bool {
        self.target == 1
    }
}

// ---------------------------------------------------------------------------
// NumericRange – inclusive [min, max]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericRange {
    pub min: f64,
    pub max: f64,
}

impl NumericRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Smallest range covering all values, `None` for an empty input.
    pub fn spanning(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        values.into_iter().fold(None, |acc, v| match acc {
            None => Some(Self::new(v, v)),
            Some(r) => Some(Self::new(r.min.min(v), r.max.max(v))),
        })
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Whether `self` admits everything `bounds` does.
    pub fn covers(&self, bounds: &NumericRange) -> bool {
        self.min <= bounds.min && self.max >= bounds.max
    }

    /// The overlap of two ranges, `None` when they are disjoint.
    pub fn intersection(&self, other: &NumericRange) -> Option<Self> {
        let min = self.min.max(other.min);
        let max = self.max.min(other.max);
        (min <= max).then(|| Self::new(min, max))
    }

    /// Restrict the range to `bounds`, keeping `min <= max`.
    pub fn clamped_to(&self, bounds: &NumericRange) -> Self {
        let min = self.min.clamp(bounds.min, bounds.max);
        let max = self.max.clamp(min, bounds.max);
        Self::new(min, max)
    }
}

// ---------------------------------------------------------------------------
// CreditDataset – the cleaned table
// ---------------------------------------------------------------------------

/// The cleaned applicant table with pre-computed column indices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreditDataset {
    /// All applicants (rows), in source order.
    pub records: Vec<Applicant>,
    /// For each categorical attribute the sorted set of distinct values.
    pub categories: BTreeMap<CategoricalAttribute, BTreeSet<String>>,
    /// For each numeric attribute the live `[min, max]`. Absent when empty.
    pub bounds: BTreeMap<NumericAttribute, NumericRange>,
}

impl CreditDataset {
    /// Build column indices from the cleaned records.
    pub fn from_records(records: Vec<Applicant>) -> Self {
        let categories = CategoricalAttribute::ALL
            .into_iter()
            .map(|attr| {
                let values = records
                    .iter()
                    .map(|r| attr.value(r).to_string())
                    .collect::<BTreeSet<_>>();
                (attr, values)
            })
            .collect();

        let bounds = NumericAttribute::ALL
            .into_iter()
            .filter_map(|attr| {
                NumericRange::spanning(records.iter().map(|r| attr.value(r)))
                    .map(|range| (attr, range))
            })
            .collect();

        CreditDataset {
            records,
            categories,
            bounds,
        }
    }

    /// Number of applicants.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn defaulters(&self) -> impl Iterator<Item = &Applicant> {
        self.records.iter().filter(|r| r.is_default())
    }
}
