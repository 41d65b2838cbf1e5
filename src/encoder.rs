use crate::models::{
    Contract, EncodedFeatureVector, Gender, InternetDependent, InternetService, MultipleLines,
    PaymentMethod, RawCustomerRecord, YesNo, FEATURE_COUNT,
};

/// Column names in model input order. The last slot is a constant pad.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "gender",
    "SeniorCitizen",
    "Partner",
    "Dependents",
    "tenure",
    "PhoneService",
    "MultipleLines",
    "InternetService",
    "OnlineSecurity",
    "OnlineBackup",
    "DeviceProtection",
    "TechSupport",
    "StreamingTV",
    "StreamingMovies",
    "Contract",
    "PaperlessBilling",
    "PaymentMethod",
    "MonthlyCharges",
    "TotalCharges",
    "placeholder",
];

const PLACEHOLDER: f64 = 0.0;

pub fn gender_code(value: Gender) -> f64 {
    match value {
        Gender::Female => 0.0,
        Gender::Male => 1.0,
    }
}

pub fn yes_no_code(value: YesNo) -> f64 {
    match value {
        YesNo::No => 0.0,
        YesNo::Yes => 1.0,
    }
}

pub fn internet_service_code(value: InternetService) -> f64 {
    match value {
        InternetService::Dsl => 0.0,
        InternetService::FiberOptic => 1.0,
        InternetService::No => 2.0,
    }
}

pub fn contract_code(value: Contract) -> f64 {
    match value {
        Contract::MonthToMonth => 0.0,
        Contract::OneYear => 1.0,
        Contract::TwoYear => 2.0,
    }
}

pub fn payment_method_code(value: PaymentMethod) -> f64 {
    match value {
        PaymentMethod::ElectronicCheck => 0.0,
        PaymentMethod::MailedCheck => 1.0,
        PaymentMethod::BankTransfer => 2.0,
        PaymentMethod::CreditCard => 3.0,
    }
}

/// "No internet service" is 0 and an explicit "No" is 2; the two must stay apart.
pub fn internet_dependent_code(value: InternetDependent) -> f64 {
    match value {
        InternetDependent::NoInternetService => 0.0,
        InternetDependent::Yes => 1.0,
        InternetDependent::No => 2.0,
    }
}

pub fn multiple_lines_code(value: MultipleLines) -> f64 {
    match value {
        MultipleLines::NoPhoneService => 0.0,
        MultipleLines::No => 1.0,
        MultipleLines::Yes => 2.0,
    }
}

pub fn encode(record: &RawCustomerRecord) -> EncodedFeatureVector {
    EncodedFeatureVector([
        gender_code(record.gender),
        f64::from(record.senior_citizen),
        yes_no_code(record.partner),
        yes_no_code(record.dependents),
        f64::from(record.tenure),
        yes_no_code(record.phone_service),
        multiple_lines_code(record.multiple_lines),
        internet_service_code(record.internet_service),
        internet_dependent_code(record.online_security),
        internet_dependent_code(record.online_backup),
        internet_dependent_code(record.device_protection),
        internet_dependent_code(record.tech_support),
        internet_dependent_code(record.streaming_tv),
        internet_dependent_code(record.streaming_movies),
        contract_code(record.contract),
        yes_no_code(record.paperless_billing),
        payment_method_code(record.payment_method),
        record.monthly_charges,
        record.total_charges,
        PLACEHOLDER,
    ])
}

/// Pairs every encoded value with its feature name, in model order.
pub fn explain(vector: &EncodedFeatureVector) -> Vec<(&'static str, f64)> {
    FEATURE_NAMES
        .iter()
        .copied()
        .zip(vector.0.iter().copied())
        .collect()
}
