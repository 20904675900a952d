//! Projection of raw review payloads into [`ReviewRecord`]s.
//!
//! Google and Trustpilot items share most field names but place reviewer
//! details differently: Trustpilot nests them in `user_profile`, Google uses
//! flat `profile_*` fields. The structured field is tried first.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::dataforseo::{ApiError, Task};

use super::query::ReviewSource;

/// Reviews rated below this are dropped.
pub const MIN_RATING: f64 = 4.0;

/// Rating as the provider sent it: a JSON number or a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RatingValue {
    Number(serde_json::Number),
    Text(String),
}

impl RatingValue {
    /// Numeric value, `None` when it does not parse.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => n.as_f64(),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }

    /// Whether the value carries anything at all (zero and `""` do not).
    fn is_present(&self) -> bool {
        match self {
            Self::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
            Self::Text(s) => !s.is_empty(),
        }
    }
}

/// A review as handed back to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub review_id: String,
    pub review_rating_value: RatingValue,
    pub review_text: String,
    pub review_timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewer_image_url: Option<String>,
    pub reviewer_name: String,
    pub review_source: ReviewSource,
}

// Typed views of the provider payload.

#[derive(Debug, Deserialize)]
struct ResultBlock {
    #[serde(default)]
    items: Option<Vec<RawReviewItem>>,
}

#[derive(Debug, Deserialize)]
struct RawReviewItem {
    #[serde(default)]
    review_id: Option<String>,
    #[serde(default)]
    review_text: Option<String>,
    #[serde(default)]
    timestamp: Option<String>,
    #[serde(default)]
    rating: Option<RawRating>,
    #[serde(default)]
    user_profile: Option<RawUserProfile>,
    #[serde(default)]
    profile_name: Option<String>,
    #[serde(default)]
    profile_image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawRating {
    #[serde(default)]
    value: Option<RatingValue>,
}

#[derive(Debug, Deserialize)]
struct RawUserProfile {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

/// Short deterministic id derived from review text.
fn text_id(text: &str) -> String {
    let digest = Sha256::digest(text.as_bytes());
    hex::encode(&digest[..8])
}

impl RawReviewItem {
    fn into_record(self, source: ReviewSource) -> ReviewRecord {
        let text = self.review_text.unwrap_or_default();
        let review_id = match non_empty(self.review_id) {
            Some(id) => id,
            None if !text.is_empty() => text_id(&text),
            None => uuid::Uuid::new_v4().simple().to_string(),
        };

        let (profile_name, profile_url) = match self.user_profile {
            Some(profile) => (non_empty(profile.name), non_empty(profile.url)),
            None => (None, None),
        };

        ReviewRecord {
            review_id,
            review_rating_value: self
                .rating
                .and_then(|r| r.value)
                .filter(RatingValue::is_present)
                .unwrap_or_else(|| RatingValue::Text(String::new())),
            review_text: text,
            review_timestamp: self.timestamp.unwrap_or_default(),
            reviewer_image_url: profile_url.or_else(|| non_empty(self.profile_image_url)),
            reviewer_name: profile_name
                .or_else(|| non_empty(self.profile_name))
                .unwrap_or_default(),
            review_source: source,
        }
    }
}

/// Whether a record passes the quality bar.
pub fn is_good_review(record: &ReviewRecord) -> bool {
    !record.review_text.is_empty()
        && record.review_rating_value.is_present()
        && record
            .review_rating_value
            .as_f64()
            .is_some_and(|v| v >= MIN_RATING)
}

/// Turn a ready task into good reviews, preserving provider order.
///
/// A task without result items yields an empty list. A payload that does not
/// have the expected structure is an [`ApiError::Shape`].
pub fn normalize(task: &Task, source: ReviewSource) -> Result<Vec<ReviewRecord>, ApiError> {
    let blocks = match &task.result {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(value) => Vec::<ResultBlock>::deserialize(value)
            .map_err(|e| ApiError::Shape(format!("review result: {}", e)))?,
    };

    let items = blocks
        .into_iter()
        .next()
        .and_then(|block| block.items)
        .unwrap_or_default();

    let total = items.len();
    let reviews: Vec<ReviewRecord> = items
        .into_iter()
        .map(|item| item.into_record(source))
        .filter(is_good_review)
        .collect();

    tracing::debug!(
        job_id = %task.id,
        total,
        kept = reviews.len(),
        "Normalized review items"
    );

    Ok(reviews)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reviews::testing::{google_item, ready_task};
    use serde_json::json;

    #[test]
    fn keeps_only_ratings_of_four_and_up_in_order() {
        let task = ready_task(
            "job",
            json!([
                google_item("a", json!(5), "great"),
                google_item("b", json!(3), "meh"),
                google_item("c", json!(4), "good"),
                google_item("d", json!(2), "bad"),
                google_item("e", json!(4), "fine"),
            ]),
        );

        let reviews = normalize(&task, ReviewSource::Google).unwrap();
        let ids: Vec<_> = reviews.iter().map(|r| r.review_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c", "e"]);
    }

    #[test]
    fn normalizing_twice_is_identical() {
        let task = ready_task(
            "job",
            json!([
                google_item("", json!(5), "no id here"),
                google_item("x", json!("4.5"), "string rating"),
            ]),
        );

        let first = normalize(&task, ReviewSource::Google).unwrap();
        let second = normalize(&task, ReviewSource::Google).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn missing_or_zero_rating_and_empty_text_are_dropped() {
        let task = ready_task(
            "job",
            json!([
                {"review_id": "no-rating", "review_text": "hi"},
                google_item("zero", json!(0), "hi"),
                google_item("blank", json!(""), "hi"),
                google_item("nan", json!("five"), "hi"),
                google_item("no-text", json!(5), ""),
            ]),
        );

        assert!(normalize(&task, ReviewSource::Google).unwrap().is_empty());
    }

    #[test]
    fn no_items_is_empty_not_error() {
        assert!(normalize(&ready_task("job", json!([])), ReviewSource::Google)
            .unwrap()
            .is_empty());
        assert!(normalize(&ready_task("job", Value::Null), ReviewSource::Google)
            .unwrap()
            .is_empty());

        let mut task = ready_task("job", json!([]));
        task.result = None;
        assert!(normalize(&task, ReviewSource::Google).unwrap().is_empty());

        task.result = Some(json!([]));
        assert!(normalize(&task, ReviewSource::Google).unwrap().is_empty());
    }

    #[test]
    fn wrong_shape_is_an_error() {
        let mut task = ready_task("job", json!([]));
        task.result = Some(json!({"items": []}));
        assert!(matches!(
            normalize(&task, ReviewSource::Google),
            Err(ApiError::Shape(_))
        ));

        let task = ready_task("job", json!("not a list"));
        assert!(matches!(
            normalize(&task, ReviewSource::Google),
            Err(ApiError::Shape(_))
        ));
    }

    #[test]
    fn maps_google_flat_profile_fields() {
        let task = ready_task("job", json!([google_item("g1", json!(5), "tasty")]));
        let review = normalize(&task, ReviewSource::Google).unwrap().remove(0);

        assert_eq!(review.reviewer_name, "reviewer g1");
        assert_eq!(
            review.reviewer_image_url.as_deref(),
            Some("https://img.example/g1.png")
        );
        assert_eq!(review.review_timestamp, "2024-05-01 12:00:00 +00:00");
        assert_eq!(review.review_source, ReviewSource::Google);
        assert_eq!(review.review_rating_value.as_f64(), Some(5.0));
    }

    #[test]
    fn prefers_structured_user_profile() {
        let task = ready_task(
            "job",
            json!([{
                "review_id": "tp1",
                "review_text": "Quick delivery",
                "timestamp": "2024-02-02",
                "rating": {"value": 5},
                "user_profile": {"name": "Ann", "url": "https://trustpilot.example/users/ann"},
                "profile_name": "ignored"
            }]),
        );
        let review = normalize(&task, ReviewSource::Trustpilot)
            .unwrap()
            .remove(0);

        assert_eq!(review.reviewer_name, "Ann");
        assert_eq!(
            review.reviewer_image_url.as_deref(),
            Some("https://trustpilot.example/users/ann")
        );
    }

    #[test]
    fn id_falls_back_to_text_hash() {
        let task = ready_task("job", json!([google_item("", json!(5), "same text")]));
        let review = normalize(&task, ReviewSource::Google).unwrap().remove(0);
        assert_eq!(review.review_id, text_id("same text"));
        assert_eq!(review.review_id.len(), 16);
    }

    #[test]
    fn rating_serializes_as_received() {
        let task = ready_task("job", json!([google_item("a", json!(5), "x")]));
        let review = normalize(&task, ReviewSource::Google).unwrap().remove(0);
        let value = serde_json::to_value(&review).unwrap();
        assert_eq!(value["review_rating_value"], json!(5));
        assert_eq!(value["review_source"], json!("google"));
    }
}
