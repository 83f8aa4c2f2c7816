use crate::error::{ApiError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Answers to the onboarding sustainability survey.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyAnswers {
    #[serde(default)]
    pub sustainability_level: Option<String>,
    #[serde(default)]
    pub eco_choices: Option<String>,
    #[serde(default)]
    pub biggest_challenge: Option<String>,
    #[serde(default)]
    pub purchase_preference: Option<String>,
    #[serde(default)]
    pub waste_reduction: Option<String>,
    #[serde(default)]
    pub energy_saving: Option<String>,
    #[serde(default)]
    pub wants_tips: Option<String>,
}

/// Everything known about a user that can personalise generated text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Free-text profile previously written by the assistant. Takes precedence over the survey.
    #[serde(default)]
    pub ai_profile: Option<String>,
    #[serde(flatten)]
    pub survey: SurveyAnswers,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<String>,
    #[serde(default)]
    pub user_region: Option<String>,
    #[serde(default)]
    pub user_gender: Option<String>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl UserProfile {
    pub fn from_summary(summary: impl Into<String>) -> Self {
        Self {
            ai_profile: Some(summary.into()),
            ..Self::default()
        }
    }

    /// Survey answers and basic info as `field: value` pairs, sorted by field name.
    pub fn fields(&self) -> BTreeMap<&'static str, &str> {
        let s = &self.survey;
        [
            ("sustainability_level", &s.sustainability_level),
            ("eco_choices", &s.eco_choices),
            ("biggest_challenge", &s.biggest_challenge),
            ("purchase_preference", &s.purchase_preference),
            ("waste_reduction", &s.waste_reduction),
            ("energy_saving", &s.energy_saving),
            ("wants_tips", &s.wants_tips),
            ("name", &self.name),
            ("date_of_birth", &self.date_of_birth),
            ("user_region", &self.user_region),
            ("user_gender", &self.user_gender),
        ]
        .into_iter()
        .filter_map(|(k, v)| present(v).map(|v| (k, v)))
        .collect()
    }

    /// The text handed to the language model: the AI summary if there is one,
    /// otherwise one `field: value` line per known answer.
    pub fn effective_text(&self) -> Result<String> {
        if let Some(summary) = present(&self.ai_profile) {
            return Ok(summary.to_string());
        }

        let fields = self.fields();
        if fields.is_empty() {
            return Err(ApiError::InvalidInput(
                "profile must contain an AI summary or survey answers".to_string(),
            ));
        }

        Ok(fields
            .iter()
            .map(|(k, v)| format!("{}: {}", k, v))
            .collect::<Vec<_>>()
            .join("\n"))
    }
}
