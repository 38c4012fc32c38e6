pub mod artifact;
pub mod registry;

pub use artifact::{ClassLabel, Classifier, Explainer, ModelArtifact, Regressor};
pub use registry::{ArtifactName, ArtifactPaths, ArtifactSource, LoadedArtifact, ModelRegistry};
