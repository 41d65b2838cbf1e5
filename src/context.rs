use tracing::info;

use crate::config::Config;
use crate::dataset;
use crate::error::ConfigError;
use crate::inference::Classifier;
use crate::model::{self, ModelArtifact};
use crate::models::ChurnRecord;

/// Model and dataset, loaded once at startup and only read afterwards.
pub struct AppContext {
    model: ModelArtifact,
    dataset: Vec<ChurnRecord>,
}

impl AppContext {
    pub fn load(config: &Config) -> Result<Self, ConfigError> {
        let model = model::load_model(&config.model_path)?;
        info!(
            path = %config.model_path.display(),
            kind = model.kind(),
            n_features = model.n_features(),
            "model loaded"
        );

        let dataset = dataset::load_dataset(&config.dataset_path)?;
        info!(
            path = %config.dataset_path.display(),
            rows = dataset.len(),
            "dataset loaded"
        );

        Ok(Self { model, dataset })
    }

    pub fn classifier(&self) -> &dyn Classifier {
        &self.model
    }

    pub fn dataset(&self) -> &[ChurnRecord] {
        &self.dataset
    }
}
