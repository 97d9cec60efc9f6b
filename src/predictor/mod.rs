use crate::config::Config;
use crate::model::Model;
use crate::registry::{FsModelRegistry, ModelUri};
use crate::schema::{PredictionInput, PredictionOutput};
use crate::{Error, Result};
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Holds the loaded model and shapes validated inputs into the row layout
/// it was trained on.
pub struct PredictorService {
    model: Option<Arc<dyn Model>>,
    model_uri: String,
    feature_order: Vec<String>,
}

// Manual impl because `dyn Model` has no `Debug` bound.
impl fmt::Debug for PredictorService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PredictorService")
            .field("model_loaded", &self.model.is_some())
            .field("model_uri", &self.model_uri)
            .field("feature_order", &self.feature_order)
            .finish()
    }
}

impl PredictorService {
    pub fn new(
        model: Option<Arc<dyn Model>>,
        model_uri: impl Into<String>,
        feature_order: Vec<String>,
    ) -> Self {
        Self {
            model,
            model_uri: model_uri.into(),
            feature_order,
        }
    }

    /// Loads the configured model from the registry and cross-checks the
    /// artifact's feature order against the configured one.
    pub async fn initialize(config: &Config) -> Result<Self> {
        let registry = FsModelRegistry::new(&config.model.registry_dir);
        let uri = ModelUri::new(&config.model.name, &config.model.stage);
        info!(
            "Loading model {} from registry at {}",
            uri, config.model.registry_dir
        );

        let pipeline = registry.load_model(&uri).await?;
        if pipeline.feature_names() != config.model.feature_order.as_slice() {
            return Err(Error::registry(format!(
                "artifact for {} was trained on features {:?} but the configured order is {:?}",
                uri,
                pipeline.feature_names(),
                config.model.feature_order
            )));
        }

        Ok(Self::new(
            Some(Arc::new(pipeline)),
            uri.to_string(),
            config.model.feature_order.clone(),
        ))
    }

    pub fn model_uri(&self) -> &str {
        &self.model_uri
    }

    /// Runs one prediction. The input is assumed validated; this only fails
    /// when no model is loaded or the model itself errors.
    pub fn predict(&self, input: &PredictionInput) -> Result<PredictionOutput> {
        let model = self.model.as_ref().ok_or(Error::ModelNotLoaded)?;

        let row = input.to_row(&self.feature_order)?;
        let predictions = model.predict(&row)?;
        let predicted_value = predictions
            .first()
            .copied()
            .ok_or_else(|| Error::prediction("model returned no value for the input row"))?;

        debug!("Predicted {} with {}", predicted_value, self.model_uri);
        Ok(PredictionOutput { predicted_value })
    }
}

/// Lazily initialized, shareable slot for the predictor service.
///
/// The first `get_or_init` loads the model; later calls reuse the same
/// instance until `reset` clears it. Concurrent first calls coalesce on the
/// write lock, so the model is loaded at most once per reset cycle.
pub struct PredictorCell {
    config: Config,
    slot: RwLock<Option<Arc<PredictorService>>>,
}

impl PredictorCell {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            slot: RwLock::new(None),
        }
    }

    /// Starts out already holding `service`. Tests use this to avoid a
    /// registry; `reset` falls back to loading from `config` as usual.
    pub fn with_service(config: Config, service: PredictorService) -> Self {
        Self {
            config,
            slot: RwLock::new(Some(Arc::new(service))),
        }
    }

    pub async fn get_or_init(&self) -> Result<Arc<PredictorService>> {
        {
            let slot = self.slot.read().await;
            if let Some(service) = slot.as_ref() {
                return Ok(Arc::clone(service));
            }
        }

        let mut slot = self.slot.write().await;
        // Another task may have initialized while we waited for the lock.
        if let Some(service) = slot.as_ref() {
            return Ok(Arc::clone(service));
        }

        let service = Arc::new(PredictorService::initialize(&self.config).await?);
        *slot = Some(Arc::clone(&service));
        Ok(service)
    }

    /// Drops the memoized service so the next `get_or_init` reloads.
    pub async fn reset(&self) {
        self.slot.write().await.take();
        debug!("Cleared memoized predictor service");
    }
}
