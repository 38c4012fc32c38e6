//! Static agronomic reference material.
//!
//! The documents ship inside the binary as JSON and are parsed once into a
//! [`KnowledgeBase`] owned by the application state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

const EMBEDDED: &str = include_str!("../data/knowledge.json");

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropKnowledge {
    pub name: String,
    pub icon: String,
    /// Topic heading to bullet points.
    pub data: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommodityGuide {
    pub name: String,
    pub icon: String,
    pub description: String,
    pub sop: BTreeMap<String, Vec<String>>,
    pub business_analysis: BusinessAnalysis,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessAnalysis {
    pub title: String,
    pub assumptions: BTreeMap<String, String>,
    pub costs: Vec<CostItem>,
    pub yield_potential: Vec<YieldScenario>,
    pub revenue_scenarios: Vec<RevenueScenario>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostItem {
    pub item: String,
    pub amount: String,
    /// Rupiah.
    pub cost: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YieldScenario {
    pub scenario: String,
    pub total_yield_kg: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueScenario {
    pub price_level: String,
    pub price_per_kg: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhKnowledge {
    pub title: String,
    pub icon: String,
    pub sections: BTreeMap<String, PhSection>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhSection {
    pub title: String,
    pub content: Vec<String>,
}

/// A node of the symptom decision tree: either a question or a verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DiagnosticNode {
    Question {
        question: String,
        options: BTreeMap<String, DiagnosticNode>,
    },
    Diagnosis(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SprayingStrategy {
    pub name: String,
    pub description: String,
    pub cycles: Vec<SprayCycle>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SprayCycle {
    pub weeks: String,
    pub level: String,
    pub active_ingredient: String,
    pub irac_code: String,
    pub sop: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SprayingProtocol {
    pub title: String,
    pub steps: Vec<String>,
}

/// A pest's rotation strategy together with the general spraying protocol.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SprayingPlan {
    pub strategy: SprayingStrategy,
    pub protocol: SprayingProtocol,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegratedRecommendation {
    pub bibit: String,
    pub pemupukan: String,
    pub penyemprotan: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct IntegratedTable {
    /// Keyed by altitude class.
    bibit: BTreeMap<String, String>,
    /// Keyed by growth phase.
    pemupukan: BTreeMap<String, String>,
    /// Keyed by pest or disease.
    penyemprotan: BTreeMap<String, String>,
    fallback: IntegratedRecommendation,
}

// ---------------------------------------------------------------------------
// Knowledge base
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct KnowledgeBase {
    crops: BTreeMap<String, CropKnowledge>,
    guides: BTreeMap<String, CommodityGuide>,
    ph: PhKnowledge,
    diagnostic_tree: BTreeMap<String, DiagnosticNode>,
    spraying: BTreeMap<String, SprayingStrategy>,
    spraying_protocol: SprayingProtocol,
    integrated: IntegratedTable,
}

impl KnowledgeBase {
    /// The documents compiled into the binary.
    pub fn embedded() -> Result<Self, CoreError> {
        Self::from_json(EMBEDDED)
    }

    pub fn from_json(raw: &str) -> Result<Self, CoreError> {
        serde_json::from_str(raw)
            .map_err(|e| CoreError::Internal(format!("knowledge base is malformed: {e}")))
    }

    pub fn crop(&self, commodity: &str) -> Result<&CropKnowledge, CoreError> {
        self.crops
            .get(commodity)
            .ok_or_else(|| CoreError::not_found("CropKnowledge", commodity))
    }

    pub fn commodity_guide(&self, commodity: &str) -> Result<&CommodityGuide, CoreError> {
        self.guides
            .get(commodity)
            .ok_or_else(|| CoreError::not_found("CommodityGuide", commodity))
    }

    pub fn ph_knowledge(&self) -> &PhKnowledge {
        &self.ph
    }

    pub fn diagnostic_tree(&self) -> &BTreeMap<String, DiagnosticNode> {
        &self.diagnostic_tree
    }

    pub fn spraying_plan(&self, pest: &str) -> Result<SprayingPlan, CoreError> {
        if pest.trim().is_empty() {
            return Err(CoreError::Validation("pest is required".into()));
        }
        let strategy = self
            .spraying
            .get(pest)
            .ok_or_else(|| CoreError::not_found("SprayingStrategy", pest))?;
        Ok(SprayingPlan {
            strategy: strategy.clone(),
            protocol: self.spraying_protocol.clone(),
        })
    }

    /// Seed, fertilization and spraying advice for a site.
    ///
    /// Unknown or missing keys fall back to generic advice. Climate does not
    /// currently influence the result.
    pub fn integrated_recommendation(
        &self,
        altitude: Option<&str>,
        _climate: Option<&str>,
        phase: Option<&str>,
        problem: Option<&str>,
    ) -> IntegratedRecommendation {
        let table = &self.integrated;
        IntegratedRecommendation {
            bibit: pick(&table.bibit, altitude, &table.fallback.bibit),
            pemupukan: pick(&table.pemupukan, phase, &table.fallback.pemupukan),
            penyemprotan: pick(&table.penyemprotan, problem, &table.fallback.penyemprotan),
        }
    }
}

fn pick(map: &BTreeMap<String, String>, key: Option<&str>, fallback: &str) -> String {
    key.and_then(|k| map.get(k))
        .map_or_else(|| fallback.to_string(), String::clone)
}
