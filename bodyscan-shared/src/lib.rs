//! Wire types exchanged with the profile collaborator and the analysis
//! service (`POST /camera-analyze`, `GET /scan-history/{user_id}`).

use std::fmt;
use std::str::FromStr;

use bodyscan_core::{CaptureSample, FeatureSet};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            other => Err(format!("unknown gender '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    #[default]
    Moderate,
    Active,
    VeryActive,
}

impl ActivityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "sedentary",
            ActivityLevel::Light => "light",
            ActivityLevel::Moderate => "moderate",
            ActivityLevel::Active => "active",
            ActivityLevel::VeryActive => "very_active",
        }
    }
}

impl fmt::Display for ActivityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "sedentary" => Ok(ActivityLevel::Sedentary),
            "light" => Ok(ActivityLevel::Light),
            "moderate" => Ok(ActivityLevel::Moderate),
            "active" => Ok(ActivityLevel::Active),
            "very_active" => Ok(ActivityLevel::VeryActive),
            other => Err(format!("unknown activity level '{}'", other)),
        }
    }
}

/// User profile as served by the auth/profile backend. Any field may still
/// be missing for a user who has not finished onboarding.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub age: Option<u32>,
    pub gender: Option<Gender>,
    /// Centimetres.
    pub height: Option<f64>,
    /// Kilograms.
    pub weight: Option<f64>,
    pub activity_level: Option<ActivityLevel>,
}

/// A profile with every field a capture needs. Scanning cannot start
/// without one.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureProfile {
    pub user_id: String,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub age: u32,
    pub gender: Gender,
    pub activity_level: ActivityLevel,
}

impl CaptureProfile {
    /// `None` unless height, weight, age and gender are all present and
    /// non-zero. `activity_level` overrides the profile's own value, which in
    /// turn falls back to [`ActivityLevel::Moderate`].
    pub fn from_profile(
        user_id: impl Into<String>,
        profile: &UserProfile,
        activity_level: Option<ActivityLevel>,
    ) -> Option<Self> {
        let height_cm = profile.height.filter(|h| *h > 0.0)?;
        let weight_kg = profile.weight.filter(|w| *w > 0.0)?;
        let age = profile.age.filter(|a| *a > 0)?;
        let gender = profile.gender?;

        Some(Self {
            user_id: user_id.into(),
            height_cm,
            weight_kg,
            age,
            gender,
            activity_level: activity_level
                .or(profile.activity_level)
                .unwrap_or_default(),
        })
    }
}

/// Body of `POST /camera-analyze`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CaptureRequest {
    pub user_id: String,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub age: u32,
    pub gender: Gender,
    pub activity_level: ActivityLevel,
    pub pose_quality: u8,
    #[serde(flatten)]
    pub features: FeatureSet,
}

impl CaptureRequest {
    pub fn new(profile: &CaptureProfile, sample: &CaptureSample) -> Self {
        Self {
            user_id: profile.user_id.clone(),
            height_cm: profile.height_cm,
            weight_kg: profile.weight_kg,
            age: profile.age,
            gender: profile.gender,
            activity_level: profile.activity_level,
            pose_quality: sample.quality,
            features: sample.features,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BmiCategory {
    UnderWeight,
    Normal,
    Overweight,
    Obese,
    ExtremelyObese,
    #[serde(other)]
    Unknown,
}

impl BmiCategory {
    pub fn label(&self) -> &'static str {
        match self {
            BmiCategory::UnderWeight => "Underweight",
            BmiCategory::Normal | BmiCategory::Unknown => "Healthy Weight",
            BmiCategory::Overweight => "Overweight",
            BmiCategory::Obese => "Obese",
            BmiCategory::ExtremelyObese => "Severely Obese",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            BmiCategory::UnderWeight => "#3B82F6",
            BmiCategory::Normal | BmiCategory::Unknown => "#22C55E",
            BmiCategory::Overweight => "#F59E0B",
            BmiCategory::Obese => "#EF4444",
            BmiCategory::ExtremelyObese => "#DC2626",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DailyTargets {
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fats_g: f64,
    pub fiber_g: f64,
    pub water_ml: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BodyMetrics {
    pub weight_kg: f64,
    pub height_cm: f64,
    pub bmi: f64,
    pub category: String,
    pub age: u32,
    pub gender: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EnergyExpenditure {
    pub bmr: f64,
    pub tdee: f64,
    pub activity_level: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MacronutrientDistribution {
    pub protein_pct: f64,
    pub carbs_pct: f64,
    pub fats_pct: f64,
}

/// Daily nutrition plan. History records only carry `daily_targets`, so
/// every section is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NutritionPlan {
    pub body_metrics: Option<BodyMetrics>,
    pub energy_expenditure: Option<EnergyExpenditure>,
    pub daily_targets: Option<DailyTargets>,
    pub macronutrient_distribution: Option<MacronutrientDistribution>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BodyAnalysis {
    pub bmi: f64,
    pub category: BmiCategory,
    pub confidence: f64,
    #[serde(default)]
    pub nutrition_plan: Option<NutritionPlan>,
}

/// Successful `POST /camera-analyze` response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CameraAnalysis {
    #[serde(flatten)]
    pub analysis: BodyAnalysis,
    pub scan_id: String,
    /// ISO 8601, UTC.
    pub scanned_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScanInputs {
    pub height_cm: f64,
    pub weight_kg: f64,
    pub age: u32,
    pub gender: String,
    pub activity_level: String,
}

/// A persisted scan, as listed by `GET /scan-history/{user_id}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScanRecord {
    pub scan_id: String,
    /// ISO 8601, UTC.
    pub scanned_at: String,
    pub bmi: f64,
    pub category: BmiCategory,
    pub confidence: f64,
    #[serde(default)]
    pub pose_quality: Option<f64>,
    #[serde(default)]
    pub inputs: Option<ScanInputs>,
    #[serde(default)]
    pub nutrition_plan: Option<NutritionPlan>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScanHistory {
    pub scans: Vec<ScanRecord>,
    pub count: usize,
}
