use foundation::{GeoPoint, PlaceId, UserId};
use serde::{Deserialize, Deserializer, Serialize};

use crate::CatalogError;

/// Upper bound for the per-aspect ratings collected by the submission form.
pub const ASPECT_RATING_MAX: f64 = 10.0;
/// Upper bound for the overall star rating.
pub const OVERALL_RATING_MAX: f64 = 5.0;

/// Rating fields of a place. Every value is optional; the store returns
/// `null` for aspects nobody has rated yet.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ratings {
    #[serde(rename = "overall_rating", default, skip_serializing_if = "Option::is_none")]
    pub overall: Option<f64>,
    #[serde(rename = "cleanliness_rating", default, skip_serializing_if = "Option::is_none")]
    pub cleanliness: Option<f64>,
    #[serde(rename = "accessibility_rating", default, skip_serializing_if = "Option::is_none")]
    pub accessibility: Option<f64>,
    #[serde(rename = "privacy_rating", default, skip_serializing_if = "Option::is_none")]
    pub privacy: Option<f64>,
    #[serde(rename = "facilities_rating", default, skip_serializing_if = "Option::is_none")]
    pub facilities: Option<f64>,
    // Older records carry these instead of privacy/facilities.
    #[serde(rename = "smell_rating", default, skip_serializing_if = "Option::is_none")]
    pub smell: Option<f64>,
    #[serde(rename = "safety_rating", default, skip_serializing_if = "Option::is_none")]
    pub safety: Option<f64>,
    #[serde(rename = "supplies_rating", default, skip_serializing_if = "Option::is_none")]
    pub supplies: Option<f64>,
    #[serde(rename = "crowding_rating", default, skip_serializing_if = "Option::is_none")]
    pub crowding: Option<f64>,
}

/// A rating field that the listing can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatingKey {
    Overall,
    Cleanliness,
    Smell,
    Safety,
    Supplies,
    Accessibility,
    Crowding,
}

impl RatingKey {
    pub const ALL: [RatingKey; 7] = [
        RatingKey::Overall,
        RatingKey::Cleanliness,
        RatingKey::Smell,
        RatingKey::Safety,
        RatingKey::Supplies,
        RatingKey::Accessibility,
        RatingKey::Crowding,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RatingKey::Overall => "overall",
            RatingKey::Cleanliness => "cleanliness",
            RatingKey::Smell => "smell",
            RatingKey::Safety => "safety",
            RatingKey::Supplies => "supplies",
            RatingKey::Accessibility => "accessibility",
            RatingKey::Crowding => "crowding",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == raw)
    }

    pub fn get(self, ratings: &Ratings) -> Option<f64> {
        match self {
            RatingKey::Overall => ratings.overall,
            RatingKey::Cleanliness => ratings.cleanliness,
            RatingKey::Smell => ratings.smell,
            RatingKey::Safety => ratings.safety,
            RatingKey::Supplies => ratings.supplies,
            RatingKey::Accessibility => ratings.accessibility,
            RatingKey::Crowding => ratings.crowding,
        }
    }
}

fn null_as_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amenities {
    #[serde(rename = "has_changing_table", default, deserialize_with = "null_as_false")]
    pub changing_table: bool,
    #[serde(rename = "has_accessible", default, deserialize_with = "null_as_false")]
    pub accessible: bool,
    #[serde(rename = "has_gender_neutral", default, deserialize_with = "null_as_false")]
    pub gender_neutral: bool,
    #[serde(rename = "has_family_friendly", default, deserialize_with = "null_as_false")]
    pub family_friendly: bool,
    #[serde(rename = "has_air_dryer", default, deserialize_with = "null_as_false")]
    pub air_dryer: bool,
    #[serde(rename = "has_paper_towels", default, deserialize_with = "null_as_false")]
    pub paper_towels: bool,
    #[serde(rename = "has_soap", default, deserialize_with = "null_as_false")]
    pub soap: bool,
    #[serde(rename = "has_sanitizer", default, deserialize_with = "null_as_false")]
    pub sanitizer: bool,
    #[serde(rename = "has_changing_station", default, deserialize_with = "null_as_false")]
    pub changing_station: bool,
    #[serde(rename = "has_tampons", default, deserialize_with = "null_as_false")]
    pub tampons: bool,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessRules {
    #[serde(default, deserialize_with = "null_as_false")]
    pub requires_purchase: bool,
    #[serde(default, deserialize_with = "null_as_false")]
    pub key_required: bool,
}

/// A reviewable location as stored by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListedPlace {
    pub id: PlaceId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    /// RFC 3339 timestamp; the store orders listings by it, newest first.
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub created_by: Option<UserId>,
    #[serde(default)]
    pub updated_at: String,
    #[serde(flatten)]
    pub ratings: Ratings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_count: Option<u32>,
    #[serde(flatten)]
    pub amenities: Amenities,
    #[serde(flatten)]
    pub access: AccessRules,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "null_as_false")]
    pub is_approved: bool,
    #[serde(default)]
    pub approved_by: Option<UserId>,
}

impl ListedPlace {
    pub fn location(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }

    pub fn rating(&self, key: RatingKey) -> Option<f64> {
        key.get(&self.ratings)
    }
}

fn default_aspect_rating() -> f64 {
    5.0
}

/// A place as entered in the submission form, before the store assigns an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPlace {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_aspect_rating")]
    pub cleanliness: f64,
    #[serde(default = "default_aspect_rating")]
    pub accessibility: f64,
    #[serde(default = "default_aspect_rating")]
    pub privacy: f64,
    #[serde(default = "default_aspect_rating")]
    pub facilities: f64,
    #[serde(default = "default_aspect_rating")]
    pub overall: f64,
    #[serde(default)]
    pub amenities: Amenities,
    #[serde(default)]
    pub access: AccessRules,
    #[serde(default)]
    pub notes: String,
}

impl NewPlace {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            cleanliness: default_aspect_rating(),
            accessibility: default_aspect_rating(),
            privacy: default_aspect_rating(),
            facilities: default_aspect_rating(),
            overall: default_aspect_rating(),
            amenities: Amenities::default(),
            access: AccessRules::default(),
            notes: String::new(),
        }
    }

    fn check_range(label: &str, value: f64, max: f64) -> Result<(), CatalogError> {
        if value.is_finite() && (0.0..=max).contains(&value) {
            Ok(())
        } else {
            Err(CatalogError::Invalid(format!(
                "{label} rating must be within 0..={max}, got {value}"
            )))
        }
    }

    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.name.trim().is_empty() {
            return Err(CatalogError::Invalid("name is required".to_string()));
        }
        Self::check_range("cleanliness", self.cleanliness, ASPECT_RATING_MAX)?;
        Self::check_range("accessibility", self.accessibility, ASPECT_RATING_MAX)?;
        Self::check_range("privacy", self.privacy, ASPECT_RATING_MAX)?;
        Self::check_range("facilities", self.facilities, ASPECT_RATING_MAX)?;
        Self::check_range("overall", self.overall, OVERALL_RATING_MAX)?;
        Ok(())
    }

    /// Builds the stored record for this submission.
    ///
    /// The submitter's current location becomes the place location, so a
    /// missing location rejects the submission. New places are auto-approved.
    pub fn into_listed(
        self,
        id: PlaceId,
        submitter: &UserId,
        location: Option<GeoPoint>,
        now: &str,
    ) -> Result<ListedPlace, CatalogError> {
        let Some(location) = location else {
            return Err(CatalogError::Invalid("location is not available".to_string()));
        };
        if !location.is_valid() {
            return Err(CatalogError::Invalid(format!(
                "location out of range: {}, {}",
                location.lat, location.lng
            )));
        }
        self.validate()?;

        let notes = Some(self.notes).filter(|n| !n.trim().is_empty());
        Ok(ListedPlace {
            id,
            name: self.name.trim().to_string(),
            description: Some(self.description),
            latitude: location.lat,
            longitude: location.lng,
            created_at: now.to_string(),
            created_by: Some(submitter.clone()),
            updated_at: now.to_string(),
            ratings: Ratings {
                overall: Some(self.overall),
                cleanliness: Some(self.cleanliness),
                accessibility: Some(self.accessibility),
                privacy: Some(self.privacy),
                facilities: Some(self.facilities),
                ..Ratings::default()
            },
            review_count: None,
            amenities: self.amenities,
            access: self.access,
            notes,
            is_approved: true,
            approved_by: None,
        })
    }
}

/// One-decimal rendering of an optional rating; absent values read "N/A".
pub fn format_rating(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.1}"),
        None => "N/A".to_string(),
    }
}

pub fn format_distance(miles: f64) -> String {
    format!("{miles:.1} mi")
}
