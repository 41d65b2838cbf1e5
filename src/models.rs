use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::InputError;

/// A field drawn from a fixed set of labels.
pub trait Categorical: Sized + Copy + 'static {
    const VARIANTS: &'static [Self];

    fn label(self) -> &'static str;

    fn parse(field: &'static str, value: &str) -> Result<Self, InputError> {
        Self::VARIANTS
            .iter()
            .copied()
            .find(|variant| variant.label() == value)
            .ok_or_else(|| InputError::InvalidCategory {
                field,
                value: value.to_string(),
                expected: Self::VARIANTS
                    .iter()
                    .map(|variant| variant.label())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Female,
    Male,
}

impl Categorical for Gender {
    const VARIANTS: &'static [Self] = &[Gender::Male, Gender::Female];

    fn label(self) -> &'static str {
        match self {
            Gender::Female => "Female",
            Gender::Male => "Male",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YesNo {
    No,
    Yes,
}

impl Categorical for YesNo {
    const VARIANTS: &'static [Self] = &[YesNo::Yes, YesNo::No];

    fn label(self) -> &'static str {
        match self {
            YesNo::No => "No",
            YesNo::Yes => "Yes",
        }
    }
}

/// Add-on services that only exist for customers with internet access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InternetDependent {
    NoInternetService,
    Yes,
    No,
}

impl Categorical for InternetDependent {
    const VARIANTS: &'static [Self] = &[
        InternetDependent::Yes,
        InternetDependent::No,
        InternetDependent::NoInternetService,
    ];

    fn label(self) -> &'static str {
        match self {
            InternetDependent::NoInternetService => "No internet service",
            InternetDependent::Yes => "Yes",
            InternetDependent::No => "No",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MultipleLines {
    NoPhoneService,
    No,
    Yes,
}

impl Categorical for MultipleLines {
    const VARIANTS: &'static [Self] = &[
        MultipleLines::Yes,
        MultipleLines::No,
        MultipleLines::NoPhoneService,
    ];

    fn label(self) -> &'static str {
        match self {
            MultipleLines::NoPhoneService => "No phone service",
            MultipleLines::No => "No",
            MultipleLines::Yes => "Yes",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InternetService {
    Dsl,
    FiberOptic,
    No,
}

impl Categorical for InternetService {
    const VARIANTS: &'static [Self] = &[
        InternetService::Dsl,
        InternetService::FiberOptic,
        InternetService::No,
    ];

    fn label(self) -> &'static str {
        match self {
            InternetService::Dsl => "DSL",
            InternetService::FiberOptic => "Fiber optic",
            InternetService::No => "No",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contract {
    MonthToMonth,
    OneYear,
    TwoYear,
}

impl Categorical for Contract {
    const VARIANTS: &'static [Self] = &[
        Contract::MonthToMonth,
        Contract::OneYear,
        Contract::TwoYear,
    ];

    fn label(self) -> &'static str {
        match self {
            Contract::MonthToMonth => "Month-to-Month",
            Contract::OneYear => "One Year",
            Contract::TwoYear => "Two Year",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMethod {
    ElectronicCheck,
    MailedCheck,
    BankTransfer,
    CreditCard,
}

impl Categorical for PaymentMethod {
    const VARIANTS: &'static [Self] = &[
        PaymentMethod::ElectronicCheck,
        PaymentMethod::MailedCheck,
        PaymentMethod::BankTransfer,
        PaymentMethod::CreditCard,
    ];

    fn label(self) -> &'static str {
        match self {
            PaymentMethod::ElectronicCheck => "Electronic check",
            PaymentMethod::MailedCheck => "Mailed check",
            PaymentMethod::BankTransfer => "Bank transfer (automatic)",
            PaymentMethod::CreditCard => "Credit card (automatic)",
        }
    }
}

/// Form state as typed in by the user, before any category is checked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerForm {
    pub gender: String,
    #[serde(rename = "SeniorCitizen")]
    pub senior_citizen: i64,
    #[serde(rename = "Partner")]
    pub partner: String,
    #[serde(rename = "Dependents")]
    pub dependents: String,
    pub tenure: i64,
    #[serde(rename = "PhoneService")]
    pub phone_service: String,
    #[serde(rename = "MultipleLines")]
    pub multiple_lines: String,
    #[serde(rename = "InternetService")]
    pub internet_service: String,
    #[serde(rename = "OnlineSecurity")]
    pub online_security: String,
    #[serde(rename = "OnlineBackup")]
    pub online_backup: String,
    #[serde(rename = "DeviceProtection")]
    pub device_protection: String,
    #[serde(rename = "TechSupport")]
    pub tech_support: String,
    #[serde(rename = "StreamingTV")]
    pub streaming_tv: String,
    #[serde(rename = "StreamingMovies")]
    pub streaming_movies: String,
    #[serde(rename = "Contract")]
    pub contract: String,
    #[serde(rename = "PaperlessBilling")]
    pub paperless_billing: String,
    #[serde(rename = "PaymentMethod")]
    pub payment_method: String,
    #[serde(rename = "MonthlyCharges")]
    pub monthly_charges: f64,
    #[serde(rename = "TotalCharges")]
    pub total_charges: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawCustomerRecord {
    pub gender: Gender,
    pub senior_citizen: u8,
    pub partner: YesNo,
    pub dependents: YesNo,
    pub tenure: u32,
    pub phone_service: YesNo,
    pub multiple_lines: MultipleLines,
    pub internet_service: InternetService,
    pub online_security: InternetDependent,
    pub online_backup: InternetDependent,
    pub device_protection: InternetDependent,
    pub tech_support: InternetDependent,
    pub streaming_tv: InternetDependent,
    pub streaming_movies: InternetDependent,
    pub contract: Contract,
    pub paperless_billing: YesNo,
    pub payment_method: PaymentMethod,
    pub monthly_charges: f64,
    pub total_charges: f64,
}

fn bounded(field: &'static str, value: f64, min: f64, max: f64) -> Result<f64, InputError> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(InputError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}

impl TryFrom<&CustomerForm> for RawCustomerRecord {
    type Error = InputError;

    fn try_from(form: &CustomerForm) -> Result<Self, Self::Error> {
        let senior_citizen = bounded("SeniorCitizen", form.senior_citizen as f64, 0.0, 1.0)?;
        let tenure = bounded("tenure", form.tenure as f64, 0.0, 100.0)?;

        Ok(Self {
            gender: Gender::parse("gender", &form.gender)?,
            senior_citizen: senior_citizen as u8,
            partner: YesNo::parse("Partner", &form.partner)?,
            dependents: YesNo::parse("Dependents", &form.dependents)?,
            tenure: tenure as u32,
            phone_service: YesNo::parse("PhoneService", &form.phone_service)?,
            multiple_lines: MultipleLines::parse("MultipleLines", &form.multiple_lines)?,
            internet_service: InternetService::parse("InternetService", &form.internet_service)?,
            online_security: InternetDependent::parse("OnlineSecurity", &form.online_security)?,
            online_backup: InternetDependent::parse("OnlineBackup", &form.online_backup)?,
            device_protection: InternetDependent::parse(
                "DeviceProtection",
                &form.device_protection,
            )?,
            tech_support: InternetDependent::parse("TechSupport", &form.tech_support)?,
            streaming_tv: InternetDependent::parse("StreamingTV", &form.streaming_tv)?,
            streaming_movies: InternetDependent::parse("StreamingMovies", &form.streaming_movies)?,
            contract: Contract::parse("Contract", &form.contract)?,
            paperless_billing: YesNo::parse("PaperlessBilling", &form.paperless_billing)?,
            payment_method: PaymentMethod::parse("PaymentMethod", &form.payment_method)?,
            monthly_charges: bounded("MonthlyCharges", form.monthly_charges, 0.0, 1000.0)?,
            total_charges: bounded("TotalCharges", form.total_charges, 0.0, 10000.0)?,
        })
    }
}

pub const FEATURE_COUNT: usize = 20;

/// Model input. Position identifies the feature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EncodedFeatureVector(pub [f64; FEATURE_COUNT]);

impl EncodedFeatureVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictionResult {
    Churn,
    Stay,
}

impl PredictionResult {
    pub fn headline(self) -> &'static str {
        match self {
            PredictionResult::Churn => "Customer is likely to churn",
            PredictionResult::Stay => "Customer is likely to stay",
        }
    }

    pub fn advice(self) -> &'static str {
        match self {
            PredictionResult::Churn => {
                "Consider contacting the customer or offering incentives to retain them."
            }
            PredictionResult::Stay => "No immediate action required.",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PredictionOutcome {
    pub request_id: Uuid,
    pub predicted_at: DateTime<Utc>,
    pub prediction: PredictionResult,
    pub message: &'static str,
    pub advice: &'static str,
    pub features: EncodedFeatureVector,
}

/// One row of the historical churn dataset. Unused columns are skipped.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChurnRecord {
    #[serde(rename = "Churn")]
    pub churn: String,
    #[serde(rename = "Contract")]
    pub contract: String,
    #[serde(rename = "InternetService")]
    pub internet_service: String,
    #[serde(rename = "MonthlyCharges")]
    pub monthly_charges: f64,
    pub tenure: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChurnShare {
    pub label: String,
    pub count: usize,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupChurnCount {
    pub group: String,
    pub churned: usize,
    pub retained: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoxStats {
    pub label: String,
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}
