//! Fertilizer advice: pH-driven recommendation, per-area dosage and
//! nutrient-to-product conversion.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::models::Regressor;
use crate::numeric::checked_round2;

/// Below this soil pH the soil is treated as acidic.
pub const ACIDIC_PH_BELOW: f64 = 6.0;
/// Above this soil pH the soil is treated as alkaline.
pub const ALKALINE_PH_ABOVE: f64 = 7.2;

/// pH assumed by the dosage calculator when the caller gives none.
pub const DEFAULT_SOIL_PH: f64 = 7.0;

const SQM_PER_HECTARE: f64 = 10_000.0;

// ---------------------------------------------------------------------------
// Model-backed recommendation
// ---------------------------------------------------------------------------

/// Field observations fed to the recommendation model, in feature order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SoilConditions {
    pub ph_tanah: f64,
    pub skor_bwd: f64,
    pub kelembaban_tanah: f64,
    pub umur_tanaman_hari: f64,
}

impl SoilConditions {
    fn features(&self) -> [f64; 4] {
        [
            self.ph_tanah,
            self.skor_bwd,
            self.kelembaban_tanah,
            self.umur_tanaman_hari,
        ]
    }
}

/// Headline advice and warnings derived from soil pH alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhAdvice {
    pub headline: &'static str,
    pub warnings: Vec<&'static str>,
}

pub fn ph_advice(ph: f64) -> PhAdvice {
    if ph < ACIDIC_PH_BELOW {
        PhAdvice {
            headline: "Prioritaskan aplikasi Dolomit untuk menaikkan pH.",
            warnings: vec!["Peringatan: Ketersediaan Fosfor (P) sangat rendah pada pH asam."],
        }
    } else if ph > ALKALINE_PH_ABOVE {
        PhAdvice {
            headline: "Pertimbangkan aplikasi Belerang (Sulfur) untuk menurunkan pH.",
            warnings: vec![
                "Peringatan: Ketersediaan unsur mikro (Besi, Mangan, Seng) rendah pada pH basa.",
            ],
        }
    } else {
        PhAdvice {
            headline: "Kondisi pH tanah optimal. Lanjutkan dengan pemupukan berikut:",
            warnings: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NutrientDose {
    #[serde(rename = "Rekomendasi N (kg/ha)")]
    pub nitrogen: f64,
    #[serde(rename = "Rekomendasi P (kg/ha)")]
    pub phosphorus: f64,
    #[serde(rename = "Rekomendasi K (kg/ha)")]
    pub potassium: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FertilizerRecommendation {
    pub rekomendasi_utama: String,
    pub rekomendasi_pupuk_ml: NutrientDose,
    pub peringatan_penting: Vec<String>,
}

/// Combine pH advice with the model's N/P/K dose estimate.
pub fn recommend_fertilizer(
    conditions: &SoilConditions,
    model: &dyn Regressor,
) -> Result<FertilizerRecommendation, CoreError> {
    let advice = ph_advice(conditions.ph_tanah);
    let output = model.predict(&conditions.features())?;
    let &[n, p, k] = output.as_slice() else {
        return Err(CoreError::ModelUnavailable {
            name: "recommendation",
            reason: format!("expected 3 outputs, got {}", output.len()),
        });
    };

    Ok(FertilizerRecommendation {
        rekomendasi_utama: advice.headline.to_string(),
        rekomendasi_pupuk_ml: NutrientDose {
            nitrogen: checked_round2(n)?,
            phosphorus: checked_round2(p)?,
            potassium: checked_round2(k)?,
        },
        peringatan_penting: advice.warnings.into_iter().map(String::from).collect(),
    })
}

// ---------------------------------------------------------------------------
// Dosage calculator
// ---------------------------------------------------------------------------

/// Per-hectare dosage guidance for one commodity.
#[derive(Debug, Clone, Copy)]
pub struct CommodityDosage {
    pub key: &'static str,
    pub name: &'static str,
    pub anorganik_kg_ha: &'static [(&'static str, f64)],
    pub organik_ton_ha: &'static [(&'static str, f64)],
    pub dolomit_ton_ha_asam: f64,
}

pub const DOSAGE_TABLE: &[CommodityDosage] = &[
    CommodityDosage {
        key: "padi",
        name: "Padi",
        anorganik_kg_ha: &[("Urea", 225.0), ("SP-36", 125.0), ("KCL", 75.0)],
        organik_ton_ha: &[("Pupuk Kandang Sapi", 10.0), ("Pupuk Kandang Ayam", 5.0)],
        dolomit_ton_ha_asam: 1.5,
    },
    CommodityDosage {
        key: "cabai",
        name: "Cabai",
        anorganik_kg_ha: &[("Urea", 150.0), ("SP-36", 250.0), ("KCL", 200.0)],
        organik_ton_ha: &[("Pupuk Kandang Sapi", 15.0), ("Pupuk Kandang Ayam", 10.0)],
        dolomit_ton_ha_asam: 2.0,
    },
    CommodityDosage {
        key: "jagung",
        name: "Jagung",
        anorganik_kg_ha: &[("Urea", 250.0), ("SP-36", 125.0), ("KCL", 75.0)],
        organik_ton_ha: &[("Pupuk Kandang Sapi", 10.0), ("Pupuk Kandang Ayam", 7.0)],
        dolomit_ton_ha_asam: 1.5,
    },
];

pub fn find_dosage(commodity: &str) -> Option<&'static CommodityDosage> {
    DOSAGE_TABLE.iter().find(|d| d.key == commodity)
}

/// Product amounts in kilograms for the requested area.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DosageAmounts {
    pub anorganik: BTreeMap<String, f64>,
    pub organik: BTreeMap<String, f64>,
    pub perbaikan_tanah: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DosagePlan {
    pub commodity_name: String,
    pub area_sqm: f64,
    pub results: DosageAmounts,
}

/// Scale the commodity's per-hectare doses to `area_sqm`.
///
/// Dolomite is only added for acidic soil.
pub fn calculate_dosage(commodity: &str, area_sqm: f64, ph: f64) -> Result<DosagePlan, CoreError> {
    if commodity.trim().is_empty() {
        return Err(CoreError::Validation("commodity is required".into()));
    }
    if !area_sqm.is_finite() || area_sqm <= 0.0 {
        return Err(CoreError::Validation(
            "area_sqm must be a positive number".into(),
        ));
    }
    if !ph.is_finite() {
        return Err(CoreError::Validation("ph_tanah must be a number".into()));
    }
    let dosage =
        find_dosage(commodity).ok_or_else(|| CoreError::not_found("Dosage", commodity))?;

    let area_ha = area_sqm / SQM_PER_HECTARE;
    let scale = |doses: &[(&str, f64)], factor: f64| {
        doses
            .iter()
            .map(|(product, dose)| {
                checked_round2(dose * factor * area_ha).map(|kg| (product.to_string(), kg))
            })
            .collect::<Result<BTreeMap<_, _>, _>>()
    };

    let mut results = DosageAmounts {
        anorganik: scale(dosage.anorganik_kg_ha, 1.0)?,
        organik: scale(dosage.organik_ton_ha, 1000.0)?,
        perbaikan_tanah: BTreeMap::new(),
    };
    if ph < ACIDIC_PH_BELOW {
        results.perbaikan_tanah.insert(
            "Dolomit".to_string(),
            checked_round2(dosage.dolomit_ton_ha_asam * 1000.0 * area_ha)?,
        );
    }

    Ok(DosagePlan {
        commodity_name: dosage.name.to_string(),
        area_sqm,
        results,
    })
}

// ---------------------------------------------------------------------------
// Fertilizer products
// ---------------------------------------------------------------------------

/// Nutrient mass fractions of one fertilizer product.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NutrientContent {
    #[serde(rename = "N")]
    pub n: f64,
    #[serde(rename = "P")]
    pub p: f64,
    #[serde(rename = "K")]
    pub k: f64,
}

impl NutrientContent {
    pub fn fraction(&self, nutrient: &str) -> Option<f64> {
        match nutrient {
            "N" => Some(self.n),
            "P" => Some(self.p),
            "K" => Some(self.k),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FertilizerProduct {
    #[serde(skip)]
    pub key: &'static str,
    pub name: &'static str,
    pub content: NutrientContent,
}

pub const FERTILIZER_PRODUCTS: &[FertilizerProduct] = &[
    FertilizerProduct {
        key: "urea",
        name: "Urea",
        content: NutrientContent { n: 0.46, p: 0.0, k: 0.0 },
    },
    FertilizerProduct {
        key: "sp36",
        name: "SP-36",
        content: NutrientContent { n: 0.0, p: 0.158, k: 0.0 },
    },
    FertilizerProduct {
        key: "kcl",
        name: "KCL (MOP)",
        content: NutrientContent { n: 0.0, p: 0.0, k: 0.50 },
    },
    FertilizerProduct {
        key: "npk_mutiara",
        name: "NPK Mutiara (16-16-16)",
        content: NutrientContent { n: 0.16, p: 0.07, k: 0.13 },
    },
];

/// The product table keyed by product id, as served to clients.
pub fn fertilizer_catalog() -> BTreeMap<&'static str, FertilizerProduct> {
    FERTILIZER_PRODUCTS.iter().map(|p| (p.key, *p)).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BagCalculation {
    pub required_kg: f64,
    pub fertilizer_name: String,
    pub nutrient_needed: String,
    pub nutrient_amount_kg: f64,
}

/// How many kilograms of `fertilizer_type` deliver `amount_kg` of `nutrient`.
pub fn fertilizer_bags(
    nutrient: &str,
    amount_kg: f64,
    fertilizer_type: &str,
) -> Result<BagCalculation, CoreError> {
    let failed = || {
        CoreError::Validation(
            "calculation failed: check the fertilizer type and nutrient".into(),
        )
    };
    if !amount_kg.is_finite() {
        return Err(CoreError::Validation(
            "nutrient_amount_kg must be a number".into(),
        ));
    }

    let product = FERTILIZER_PRODUCTS
        .iter()
        .find(|p| p.key == fertilizer_type)
        .ok_or_else(failed)?;
    let fraction = product.content.fraction(nutrient).unwrap_or(0.0);
    if fraction == 0.0 {
        return Err(failed());
    }

    Ok(BagCalculation {
        required_kg: checked_round2(amount_kg / fraction)?,
        fertilizer_name: product.name.to_string(),
        nutrient_needed: nutrient.to_string(),
        nutrient_amount_kg: amount_kg,
    })
}
