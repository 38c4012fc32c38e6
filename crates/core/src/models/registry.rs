//! Lazily loaded, process-wide cache of model artifacts.
//!
//! Each [`ArtifactName`] owns one async once-cell. The first caller for a name
//! performs the load; concurrent first callers wait on the same cell and
//! observe the same outcome. A failed load is cached too and never retried.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;

use super::artifact::{Classifier, Explainer, ModelArtifact, Regressor};
use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Artifact names and paths
// ---------------------------------------------------------------------------

/// Every artifact the service knows how to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactName {
    Bwd,
    Recommendation,
    CropRecommendation,
    YieldPrediction,
    AdvancedYield,
    ShapExplainer,
    SuccessModel,
}

impl ArtifactName {
    pub const ALL: [ArtifactName; 7] = [
        ArtifactName::Bwd,
        ArtifactName::Recommendation,
        ArtifactName::CropRecommendation,
        ArtifactName::YieldPrediction,
        ArtifactName::AdvancedYield,
        ArtifactName::ShapExplainer,
        ArtifactName::SuccessModel,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ArtifactName::Bwd => "bwd",
            ArtifactName::Recommendation => "recommendation",
            ArtifactName::CropRecommendation => "crop_recommendation",
            ArtifactName::YieldPrediction => "yield_prediction",
            ArtifactName::AdvancedYield => "advanced_yield",
            ArtifactName::ShapExplainer => "shap_explainer",
            ArtifactName::SuccessModel => "success_model",
        }
    }

    pub fn default_file_name(self) -> &'static str {
        match self {
            ArtifactName::Bwd => "bwd_model.json",
            ArtifactName::Recommendation => "recommendation_model.json",
            ArtifactName::CropRecommendation => "crop_recommendation_model.json",
            ArtifactName::YieldPrediction => "yield_prediction_model.json",
            ArtifactName::AdvancedYield => "advanced_yield_model.json",
            ArtifactName::ShapExplainer => "shap_explainer.json",
            ArtifactName::SuccessModel => "success_model.json",
        }
    }
}

/// Where each artifact lives on disk.
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    paths: HashMap<ArtifactName, PathBuf>,
}

impl ArtifactPaths {
    /// All artifacts under `dir`, using their default file names.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        let paths = ArtifactName::ALL
            .into_iter()
            .map(|name| (name, dir.join(name.default_file_name())))
            .collect();
        Self { paths }
    }

    /// Override the location of one artifact.
    pub fn with_path(mut self, name: ArtifactName, path: impl Into<PathBuf>) -> Self {
        self.paths.insert(name, path.into());
        self
    }

    pub fn get(&self, name: ArtifactName) -> Option<&Path> {
        self.paths.get(&name).map(PathBuf::as_path)
    }
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

/// Produces artifacts by name. The registry calls this at most once per name.
#[async_trait]
pub trait ArtifactSource: Send + Sync {
    async fn load(&self, name: ArtifactName) -> Result<ModelArtifact, String>;
}

/// Reads JSON artifacts from the filesystem.
pub struct FileArtifactSource {
    paths: ArtifactPaths,
}

impl FileArtifactSource {
    pub fn new(paths: ArtifactPaths) -> Self {
        Self { paths }
    }
}

#[async_trait]
impl ArtifactSource for FileArtifactSource {
    async fn load(&self, name: ArtifactName) -> Result<ModelArtifact, String> {
        let path = self
            .paths
            .get(name)
            .ok_or_else(|| "no path configured".to_string())?;
        let raw = tokio::fs::read(path)
            .await
            .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
        let artifact: ModelArtifact = serde_json::from_slice(&raw)
            .map_err(|e| format!("malformed artifact {}: {e}", path.display()))?;
        artifact.validate()?;
        Ok(artifact)
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

type LoadOutcome = Result<Arc<ModelArtifact>, String>;

pub struct ModelRegistry {
    source: Arc<dyn ArtifactSource>,
    cells: HashMap<ArtifactName, OnceCell<LoadOutcome>>,
}

impl ModelRegistry {
    pub fn new(source: Arc<dyn ArtifactSource>) -> Self {
        let cells = ArtifactName::ALL
            .into_iter()
            .map(|name| (name, OnceCell::new()))
            .collect();
        Self { source, cells }
    }

    /// Registry backed by JSON files at `paths`.
    pub fn from_paths(paths: ArtifactPaths) -> Self {
        Self::new(Arc::new(FileArtifactSource::new(paths)))
    }

    /// Resolve an artifact, loading it on first use.
    pub async fn get(&self, name: ArtifactName) -> Result<LoadedArtifact, CoreError> {
        let cell = self.cells.get(&name).ok_or_else(|| CoreError::ModelUnavailable {
            name: name.as_str(),
            reason: "not registered".into(),
        })?;

        let outcome = cell
            .get_or_init(|| async {
                match self.source.load(name).await {
                    Ok(artifact) => {
                        tracing::info!(model = name.as_str(), kind = artifact.kind(), "Model loaded");
                        Ok(Arc::new(artifact))
                    }
                    Err(reason) => {
                        tracing::error!(model = name.as_str(), %reason, "Model failed to load");
                        Err(reason)
                    }
                }
            })
            .await;

        match outcome {
            Ok(artifact) => Ok(LoadedArtifact {
                name,
                artifact: Arc::clone(artifact),
            }),
            Err(reason) => Err(CoreError::ModelUnavailable {
                name: name.as_str(),
                reason: reason.clone(),
            }),
        }
    }

    /// Attempt every load up front. Returns the names that failed.
    pub async fn warm_up(&self) -> Vec<ArtifactName> {
        let mut failed = Vec::new();
        for name in ArtifactName::ALL {
            if self.get(name).await.is_err() {
                failed.push(name);
            }
        }
        failed
    }
}

/// A cached artifact together with the name it was requested under.
#[derive(Debug, Clone)]
pub struct LoadedArtifact {
    name: ArtifactName,
    artifact: Arc<ModelArtifact>,
}

impl LoadedArtifact {
    pub fn classifier(&self) -> Result<&dyn Classifier, CoreError> {
        self.artifact
            .as_classifier()
            .ok_or_else(|| self.wrong_kind("a classifier"))
    }

    pub fn regressor(&self) -> Result<&dyn Regressor, CoreError> {
        self.artifact
            .as_regressor()
            .ok_or_else(|| self.wrong_kind("a regressor"))
    }

    pub fn explainer(&self) -> Result<&dyn Explainer, CoreError> {
        self.artifact
            .as_explainer()
            .ok_or_else(|| self.wrong_kind("an explainer"))
    }

    fn wrong_kind(&self, expected: &str) -> CoreError {
        CoreError::ModelUnavailable {
            name: self.name.as_str(),
            reason: format!("expected {expected}, found {}", self.artifact.kind()),
        }
    }
}
