//! Dog profile models.

use serde::{Deserialize, Serialize};

/// ID of the profile seeded on first run.
pub const DEFAULT_DOG_ID: &str = "default-dog";

/// Breed used when the form leaves it blank.
pub const DEFAULT_BREED: &str = "通用型";

const IDENTICON_BASE_URL: &str = "https://api.dicebear.com/7.x/bottts/svg?seed=";

/// A dog whose reports are tracked.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DogProfile {
    /// Local ID
    pub id: String,
    pub name: String,
    pub breed: String,
    /// Seed for the fallback identicon
    pub avatar_seed: String,
    /// Date of birth, `YYYY-MM-DD`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    /// Weight in kg as entered, e.g. "12.5"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<String>,
    /// User-supplied photo as a data URI
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_avatar_url: Option<String>,
}

impl DogProfile {
    /// Create a new profile with required fields.
    pub fn new(name: String, breed: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            avatar_seed: name.clone(),
            name,
            breed,
            birth_date: None,
            weight: None,
            custom_avatar_url: None,
        }
    }

    /// The profile seeded on first run.
    pub fn seeded_default() -> Self {
        Self {
            id: DEFAULT_DOG_ID.into(),
            name: "旺财".into(),
            breed: "金毛寻回犬".into(),
            avatar_seed: "旺财".into(),
            birth_date: Some("2020-01-01".into()),
            weight: Some("25".into()),
            custom_avatar_url: None,
        }
    }

    /// Custom photo if present, otherwise the identicon for the seed.
    pub fn avatar_url(&self) -> String {
        match &self.custom_avatar_url {
            Some(url) if !url.is_empty() => url.clone(),
            _ => format!("{}{}", IDENTICON_BASE_URL, self.avatar_seed),
        }
    }

    /// Weight for display, e.g. "25kg".
    pub fn weight_label(&self) -> String {
        match self.weight.as_deref().map(str::trim) {
            Some(w) if !w.is_empty() => format!("{}kg", w),
            _ => "未知体重".to_string(),
        }
    }
}

/// Form data for adding or editing a profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DogDraft {
    pub name: String,
    pub breed: Option<String>,
    pub birth_date: Option<String>,
    pub weight: Option<String>,
    pub custom_avatar_url: Option<String>,
}

/// Form validation failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DraftError {
    #[error("Dog name is required")]
    MissingName,

    #[error("Invalid birth date: {0}")]
    InvalidBirthDate(String),

    #[error("Invalid weight: {0}")]
    InvalidWeight(String),
}

impl DogDraft {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Check required fields and formats.
    pub fn validate(&self) -> Result<(), DraftError> {
        if self.name.trim().is_empty() {
            return Err(DraftError::MissingName);
        }
        if let Some(date) = non_blank(&self.birth_date) {
            chrono::NaiveDate::parse_from_str(&date, "%Y-%m-%d")
                .map_err(|_| DraftError::InvalidBirthDate(date.clone()))?;
        }
        if let Some(weight) = non_blank(&self.weight) {
            match weight.parse::<f64>() {
                Ok(w) if w > 0.0 && w.is_finite() => {}
                _ => return Err(DraftError::InvalidWeight(weight)),
            }
        }
        Ok(())
    }

    /// Build a new profile. The identicon seed follows the name.
    pub fn into_profile(self) -> Result<DogProfile, DraftError> {
        self.validate()?;
        let mut profile = DogProfile::new(self.name.trim().to_string(), String::new());
        self.apply_fields(&mut profile);
        Ok(profile)
    }

    /// Overwrite an existing profile's editable fields, keeping its ID.
    pub fn apply_to(self, existing: &DogProfile) -> Result<DogProfile, DraftError> {
        self.validate()?;
        let mut profile = existing.clone();
        profile.name = self.name.trim().to_string();
        profile.avatar_seed = profile.name.clone();
        self.apply_fields(&mut profile);
        Ok(profile)
    }

    fn apply_fields(&self, profile: &mut DogProfile) {
        profile.breed = non_blank(&self.breed).unwrap_or_else(|| DEFAULT_BREED.to_string());
        profile.birth_date = non_blank(&self.birth_date);
        profile.weight = non_blank(&self.weight);
        profile.custom_avatar_url = non_blank(&self.custom_avatar_url);
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_profile() {
        let dog = DogProfile::new("豆豆".into(), "柯基".into());
        assert_eq!(dog.name, "豆豆");
        assert_eq!(dog.avatar_seed, "豆豆");
        assert_eq!(dog.id.len(), 36);
    }

    #[test]
    fn test_seeded_default() {
        let dog = DogProfile::seeded_default();
        assert_eq!(dog.id, DEFAULT_DOG_ID);
        assert_eq!(dog.name, "旺财");
        assert_eq!(dog.weight_label(), "25kg");
    }

    #[test]
    fn test_avatar_url() {
        let mut dog = DogProfile::new("Max".into(), "金毛".into());
        assert_eq!(dog.avatar_url(), "https://api.dicebear.com/7.x/bottts/svg?seed=Max");

        dog.custom_avatar_url = Some("data:image/png;base64,AAAA".into());
        assert_eq!(dog.avatar_url(), "data:image/png;base64,AAAA");
    }

    #[test]
    fn test_weight_label_unknown() {
        let dog = DogProfile::new("Max".into(), "金毛".into());
        assert_eq!(dog.weight_label(), "未知体重");
    }

    #[test]
    fn test_optional_fields_omitted_from_json() {
        let dog = DogProfile::new("Max".into(), "金毛".into());
        let json = serde_json::to_value(&dog).unwrap();
        assert_eq!(json["avatarSeed"], "Max");
        assert!(json.get("birthDate").is_none());
        assert!(json.get("customAvatarUrl").is_none());
    }

    #[test]
    fn test_draft_requires_name() {
        assert_eq!(DogDraft::named("   ").validate(), Err(DraftError::MissingName));
    }

    #[test]
    fn test_draft_validates_formats() {
        let mut draft = DogDraft::named("Max");
        draft.birth_date = Some("2021-13-40".into());
        assert!(matches!(draft.validate(), Err(DraftError::InvalidBirthDate(_))));

        draft.birth_date = Some("2021-06-01".into());
        draft.weight = Some("-3".into());
        assert!(matches!(draft.validate(), Err(DraftError::InvalidWeight(_))));

        draft.weight = Some("12.5".into());
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn test_draft_into_profile_defaults_breed() {
        let mut draft = DogDraft::named(" 豆豆 ");
        draft.weight = Some("  ".into());
        let dog = draft.into_profile().unwrap();
        assert_eq!(dog.name, "豆豆");
        assert_eq!(dog.breed, DEFAULT_BREED);
        assert_eq!(dog.weight, None);
    }

    #[test]
    fn test_draft_apply_to_keeps_id_and_reseeds() {
        let existing = DogProfile::seeded_default();
        let mut draft = DogDraft::named("大黄");
        draft.breed = Some("中华田园犬".into());
        let updated = draft.apply_to(&existing).unwrap();

        assert_eq!(updated.id, existing.id);
        assert_eq!(updated.name, "大黄");
        assert_eq!(updated.avatar_seed, "大黄");
        assert_eq!(updated.breed, "中华田园犬");
        assert_eq!(updated.birth_date, None);
    }
}
