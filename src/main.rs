use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use tracing::{debug, info, info_span};
use uuid::Uuid;

mod config;
mod context;
mod dataset;
mod encoder;
mod error;
mod inference;
mod model;
mod models;
mod report;

use config::Config;
use context::AppContext;
use inference::Classifier;
use models::{CustomerForm, PredictionOutcome, PredictionResult, RawCustomerRecord};

#[derive(Parser)]
#[command(name = "churn-predictor")]
#[command(about = "Customer churn prediction and churn insights dashboard", long_about = None)]
struct Cli {
    #[command(flatten)]
    config: Config,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Predict whether a customer is likely to churn
    Predict {
        #[command(flatten)]
        customer: CustomerInput,
        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the feature vector a customer encodes to
    Encode {
        #[command(flatten)]
        customer: CustomerInput,
        /// One line per feature with its position and name
        #[arg(long)]
        explain: bool,
    },
    /// Write the churn insights dashboard as markdown
    Dashboard {
        #[arg(long, default_value = "dashboard.md")]
        out: PathBuf,
    },
}

/// Customer details. Defaults mirror the prediction form.
#[derive(Debug, Args)]
struct CustomerInput {
    /// Read the customer from a JSON file instead of the flags below
    #[arg(long, conflicts_with_all = [
        "tenure", "monthly_charges", "total_charges", "senior_citizen", "gender",
        "partner", "dependents", "phone_service", "multiple_lines", "internet_service",
        "online_security", "online_backup", "device_protection", "tech_support",
        "streaming_tv", "streaming_movies", "contract", "paperless_billing", "payment_method",
    ])]
    record: Option<PathBuf>,
    #[arg(long, default_value_t = 12)]
    tenure: i64,
    #[arg(long, default_value_t = 70.0)]
    monthly_charges: f64,
    #[arg(long, default_value_t = 1500.0)]
    total_charges: f64,
    #[arg(long, default_value_t = 0)]
    senior_citizen: i64,
    #[arg(long, default_value = "Male")]
    gender: String,
    #[arg(long, default_value = "Yes")]
    partner: String,
    #[arg(long, default_value = "Yes")]
    dependents: String,
    #[arg(long, default_value = "Yes")]
    phone_service: String,
    #[arg(long, default_value = "Yes")]
    multiple_lines: String,
    #[arg(long, default_value = "DSL")]
    internet_service: String,
    #[arg(long, default_value = "Yes")]
    online_security: String,
    #[arg(long, default_value = "Yes")]
    online_backup: String,
    #[arg(long, default_value = "Yes")]
    device_protection: String,
    #[arg(long, default_value = "Yes")]
    tech_support: String,
    #[arg(long, default_value = "Yes")]
    streaming_tv: String,
    #[arg(long, default_value = "Yes")]
    streaming_movies: String,
    #[arg(long, default_value = "Month-to-Month")]
    contract: String,
    #[arg(long, default_value = "Yes")]
    paperless_billing: String,
    #[arg(long, default_value = "Electronic check")]
    payment_method: String,
}

impl CustomerInput {
    fn into_form(self) -> anyhow::Result<CustomerForm> {
        if let Some(path) = self.record {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read customer record {}", path.display()))?;
            return serde_json::from_str(&text)
                .with_context(|| format!("customer record {} is malformed", path.display()));
        }

        Ok(CustomerForm {
            gender: self.gender,
            senior_citizen: self.senior_citizen,
            partner: self.partner,
            dependents: self.dependents,
            tenure: self.tenure,
            phone_service: self.phone_service,
            multiple_lines: self.multiple_lines,
            internet_service: self.internet_service,
            online_security: self.online_security,
            online_backup: self.online_backup,
            device_protection: self.device_protection,
            tech_support: self.tech_support,
            streaming_tv: self.streaming_tv,
            streaming_movies: self.streaming_movies,
            contract: self.contract,
            paperless_billing: self.paperless_billing,
            payment_method: self.payment_method,
            monthly_charges: self.monthly_charges,
            total_charges: self.total_charges,
        })
    }
}

fn predict_customer(
    classifier: &dyn Classifier,
    form: &CustomerForm,
) -> anyhow::Result<PredictionOutcome> {
    let request_id = Uuid::new_v4();
    let _span = info_span!("predict", %request_id).entered();

    let record = RawCustomerRecord::try_from(form).context("invalid customer details")?;
    let features = encoder::encode(&record);
    debug!(features = ?features.as_slice(), "customer encoded");

    let prediction =
        inference::predict_churn(classifier, &features).context("prediction failed")?;
    info!(?prediction, "prediction complete");

    Ok(PredictionOutcome {
        request_id,
        predicted_at: Utc::now(),
        prediction,
        message: prediction.headline(),
        advice: prediction.advice(),
        features,
    })
}

fn render_outcome(outcome: &PredictionOutcome) -> String {
    let marker = match outcome.prediction {
        PredictionResult::Churn => "WARNING",
        PredictionResult::Stay => "OK",
    };
    format!("[{marker}] {}!\n{}\n", outcome.message, outcome.advice)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    cli.config.init_logging()?;

    match cli.command {
        Commands::Predict { customer, json } => {
            let context = AppContext::load(&cli.config).context("startup failed")?;
            let form = customer.into_form()?;
            let outcome = predict_customer(context.classifier(), &form)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                print!("{}", render_outcome(&outcome));
            }
        }
        Commands::Encode { customer, explain } => {
            let form = customer.into_form()?;
            let record = RawCustomerRecord::try_from(&form).context("invalid customer details")?;
            let features = encoder::encode(&record);

            if explain {
                for (position, (name, value)) in encoder::explain(&features).into_iter().enumerate()
                {
                    println!("{position:>2} {name:<17} {value}");
                }
            } else {
                println!("{}", serde_json::to_string(&features)?);
            }
        }
        Commands::Dashboard { out } => {
            let context = AppContext::load(&cli.config).context("startup failed")?;
            let source = cli.config.dataset_path.display().to_string();
            let dashboard = report::build_dashboard(context.dataset(), &source, Utc::now());
            std::fs::write(&out, dashboard)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Dashboard written to {}.", out.display());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{InferenceError, InputError};
    use crate::model::{DecisionTree, ModelArtifact, TreeNode};

    fn form_defaults() -> CustomerForm {
        let cli = Cli::try_parse_from(["churn-predictor", "encode"]).unwrap();
        match cli.command {
            Commands::Encode { customer, .. } => customer.into_form().unwrap(),
            _ => unreachable!(),
        }
    }

    /// Churns on month-to-month contracts, stays otherwise.
    fn contract_model() -> ModelArtifact {
        ModelArtifact::DecisionTree(DecisionTree {
            n_features: 20,
            root: TreeNode::Split {
                feature: 14,
                threshold: 0.5,
                left: Box::new(TreeNode::Leaf { class: 1 }),
                right: Box::new(TreeNode::Leaf { class: 0 }),
            },
        })
    }

    #[test]
    fn flag_defaults_match_the_form() {
        let form = form_defaults();
        assert_eq!(form.tenure, 12);
        assert_eq!(form.monthly_charges, 70.0);
        assert_eq!(form.total_charges, 1500.0);
        assert_eq!(form.senior_citizen, 0);
        assert_eq!(form.contract, "Month-to-Month");
        assert_eq!(form.multiple_lines, "Yes");
        assert!(RawCustomerRecord::try_from(&form).is_ok());
    }

    #[test]
    fn predicts_churn_for_month_to_month() {
        let outcome = predict_customer(&contract_model(), &form_defaults()).unwrap();
        assert_eq!(outcome.prediction, PredictionResult::Churn);
        assert_eq!(outcome.features.0[14], 0.0);
        assert_eq!(
            render_outcome(&outcome),
            "[WARNING] Customer is likely to churn!\n\
             Consider contacting the customer or offering incentives to retain them.\n"
        );
    }

    #[test]
    fn predicts_stay_for_two_year_contract() {
        let mut form = form_defaults();
        form.contract = "Two Year".to_string();
        let outcome = predict_customer(&contract_model(), &form).unwrap();
        assert_eq!(outcome.prediction, PredictionResult::Stay);
        assert_eq!(
            render_outcome(&outcome),
            "[OK] Customer is likely to stay!\nNo immediate action required.\n"
        );
    }

    #[test]
    fn invalid_category_is_reported_before_prediction() {
        let mut form = form_defaults();
        form.contract = "Quarterly".to_string();
        let err = predict_customer(&contract_model(), &form).unwrap_err();
        let input = err.downcast_ref::<InputError>().unwrap();
        assert!(matches!(
            input,
            InputError::InvalidCategory {
                field: "Contract",
                ..
            }
        ));
    }

    #[test]
    fn shape_mismatch_surfaces_as_error() {
        let model = ModelArtifact::DecisionTree(DecisionTree {
            n_features: 19,
            root: TreeNode::Leaf { class: 0 },
        });
        let err = predict_customer(&model, &form_defaults()).unwrap_err();
        assert_eq!(
            err.downcast_ref::<InferenceError>(),
            Some(&InferenceError::ShapeMismatch {
                expected: 19,
                actual: 20
            })
        );
    }

    #[test]
    fn outcome_serializes_lowercase_label() {
        let outcome = predict_customer(&contract_model(), &form_defaults()).unwrap();
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["prediction"], "churn");
        assert_eq!(json["features"].as_array().unwrap().len(), 20);
    }

    #[test]
    fn record_file_conflicts_with_field_flags() {
        let result = Cli::try_parse_from([
            "churn-predictor",
            "encode",
            "--record",
            "demos/customer.json",
            "--contract",
            "Two Year",
        ]);
        let err = result.err().unwrap();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn record_file_alone_is_accepted() {
        let cli =
            Cli::try_parse_from(["churn-predictor", "encode", "--record", "demos/customer.json"])
                .unwrap();
        match cli.command {
            Commands::Encode { customer, .. } => {
                assert_eq!(customer.record, Some(PathBuf::from("demos/customer.json")));
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn parses_field_flags() {
        let cli = Cli::try_parse_from([
            "churn-predictor",
            "predict",
            "--internet-service",
            "Fiber optic",
            "--payment-method",
            "Mailed check",
            "--tenure",
            "40",
            "--json",
        ])
        .unwrap();
        match cli.command {
            Commands::Predict { customer, json } => {
                assert!(json);
                let form = customer.into_form().unwrap();
                assert_eq!(form.internet_service, "Fiber optic");
                assert_eq!(form.payment_method, "Mailed check");
                assert_eq!(form.tenure, 40);
            }
            _ => unreachable!(),
        }
    }
}
