/*! Review record schema.

[RawReview] is a review line as found in the source, [ProcessedReview] the projected, language-tagged
record that ends up in output batches. Which fields survive is decided by a [Projection].
!*/
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Format of source timestamps, e.g. `Fri Aug 25 13:55:02 -0700 2017`.
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

/// A review as read from the source. Unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawReview {
    pub user_id: Option<String>,
    pub book_id: Option<String>,
    pub review_id: Option<String>,
    pub rating: Option<i64>,
    pub review_text: Option<String>,
    pub date_added: Option<String>,
    pub date_updated: Option<String>,
    pub read_at: Option<String>,
    pub started_at: Option<String>,
    pub n_votes: Option<i64>,
    pub n_comments: Option<i64>,
}

/// Review fields that can be projected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    UserId,
    BookId,
    ReviewId,
    Rating,
    ReviewText,
    DateAdded,
    DateUpdated,
    ReadAt,
    StartedAt,
    NVotes,
    NComments,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::UserId => "user_id",
            Field::BookId => "book_id",
            Field::ReviewId => "review_id",
            Field::Rating => "rating",
            Field::ReviewText => "review_text",
            Field::DateAdded => "date_added",
            Field::DateUpdated => "date_updated",
            Field::ReadAt => "read_at",
            Field::StartedAt => "started_at",
            Field::NVotes => "n_votes",
            Field::NComments => "n_comments",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user_id" => Ok(Field::UserId),
            "book_id" => Ok(Field::BookId),
            "review_id" => Ok(Field::ReviewId),
            "rating" => Ok(Field::Rating),
            "review_text" => Ok(Field::ReviewText),
            "date_added" => Ok(Field::DateAdded),
            "date_updated" => Ok(Field::DateUpdated),
            "read_at" => Ok(Field::ReadAt),
            "started_at" => Ok(Field::StartedAt),
            "n_votes" => Ok(Field::NVotes),
            "n_comments" => Ok(Field::NComments),
            other => Err(Error::Config(format!("unknown column: {:?}", other))),
        }
    }
}

/// Ordered, duplicate-free set of projected fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection(Vec<Field>);

impl Projection {
    pub fn new(fields: impl IntoIterator<Item = Field>) -> Result<Self, Error> {
        let mut kept: Vec<Field> = Vec::new();
        for field in fields {
            if !kept.contains(&field) {
                kept.push(field);
            }
        }

        if kept.is_empty() {
            return Err(Error::Config("projection has no columns".to_string()));
        }
        Ok(Self(kept))
    }

    pub fn contains(&self, field: Field) -> bool {
        self.0.contains(&field)
    }

    pub fn fields(&self) -> &[Field] {
        self.0.as_ref()
    }
}

impl Default for Projection {
    fn default() -> Self {
        Self(vec![
            Field::UserId,
            Field::BookId,
            Field::Rating,
            Field::ReviewText,
            Field::DateUpdated,
            Field::NVotes,
        ])
    }
}

/// Comma separated field names, e.g. `user_id,rating,review_text`.
impl FromStr for Projection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields = s
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(Field::from_str)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(fields)
    }
}

impl fmt::Display for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.0.iter().map(Field::as_str).collect();
        f.write_str(&names.join(","))
    }
}

/// Parse `value` with `format` into an absolute UTC instant.
///
/// `format` has to carry an offset (`%z`), otherwise parsing fails.
pub fn parse_timestamp(value: &str, format: &str) -> Result<DateTime<Utc>, Error> {
    DateTime::parse_from_str(value, format)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|source| Error::Timestamp {
            value: value.to_string(),
            format: format.to_string(),
            source,
        })
}

/// A projected review, tagged with its detected language.
///
/// Fields that are not projected are left out of the serialized record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedReview {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub book_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_added: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_updated: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n_votes: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n_comments: Option<i64>,
    pub lang: String,
}

impl ProcessedReview {
    /// Project `raw` onto `projection` and normalize its update timestamp.
    ///
    /// A missing or empty `date_updated` stays absent; any other value has to match `timestamp_format`.
    pub fn project(
        raw: RawReview,
        projection: &Projection,
        lang: String,
        timestamp_format: &str,
    ) -> Result<Self, Error> {
        let keep = |field: Field| projection.contains(field);

        let date_updated = match raw.date_updated.as_deref().map(str::trim) {
            Some(value) if keep(Field::DateUpdated) && !value.is_empty() => {
                Some(parse_timestamp(value, timestamp_format)?)
            }
            _ => None,
        };

        Ok(Self {
            user_id: raw.user_id.filter(|_| keep(Field::UserId)),
            book_id: raw.book_id.filter(|_| keep(Field::BookId)),
            review_id: raw.review_id.filter(|_| keep(Field::ReviewId)),
            rating: raw.rating.filter(|_| keep(Field::Rating)),
            review_text: raw.review_text.filter(|_| keep(Field::ReviewText)),
            date_added: raw.date_added.filter(|_| keep(Field::DateAdded)),
            date_updated,
            read_at: raw.read_at.filter(|_| keep(Field::ReadAt)),
            started_at: raw.started_at.filter(|_| keep(Field::StartedAt)),
            n_votes: raw.n_votes.filter(|_| keep(Field::NVotes)),
            n_comments: raw.n_comments.filter(|_| keep(Field::NComments)),
            lang,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn raw() -> RawReview {
        serde_json::from_str(
            r#"{"user_id": "8842281e1d1347389f2ab93d60773d4d",
                "book_id": "24375664",
                "review_id": "5cd416f3efc3f944fce4ce2db2290d5e",
                "rating": 5,
                "review_text": "Mind blowingly cool. Best science fiction I've read in some time.",
                "date_added": "Fri Aug 25 13:55:02 -0700 2017",
                "date_updated": "Mon Oct 09 08:55:59 -0700 2017",
                "read_at": "Sat Oct 07 00:00:00 -0700 2017",
                "started_at": "Sat Aug 26 00:00:00 -0700 2017",
                "n_votes": 16,
                "n_comments": 0,
                "some_other_field": [1, 2, 3]}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_parse_timestamp() {
        let ts = parse_timestamp("Mon Oct 09 08:55:59 -0700 2017", DEFAULT_TIMESTAMP_FORMAT).unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2017, 10, 9, 15, 55, 59).unwrap());
    }

    #[test]
    fn test_parse_timestamp_mismatch() {
        let ts = parse_timestamp("2017-10-09 08:55:59", DEFAULT_TIMESTAMP_FORMAT);
        assert!(matches!(ts, Err(Error::Timestamp { .. })));
    }

    #[test]
    fn test_projection_from_str() {
        let p: Projection = "user_id, rating,review_text,rating".parse().unwrap();
        assert_eq!(p.fields(), &[Field::UserId, Field::Rating, Field::ReviewText]);
        assert_eq!(p.to_string(), "user_id,rating,review_text");

        assert!("user_id,stars".parse::<Projection>().is_err());
        assert!(" , ".parse::<Projection>().is_err());
    }

    #[test]
    fn test_default_projection() {
        let p = Projection::default();
        assert_eq!(
            p.to_string(),
            "user_id,book_id,rating,review_text,date_updated,n_votes"
        );
    }

    #[test]
    fn test_project() {
        let processed = ProcessedReview::project(
            raw(),
            &Projection::default(),
            "en".to_string(),
            DEFAULT_TIMESTAMP_FORMAT,
        )
        .unwrap();

        assert_eq!(processed.rating, Some(5));
        assert_eq!(processed.n_votes, Some(16));
        assert_eq!(processed.review_id, None);
        assert_eq!(processed.n_comments, None);
        assert_eq!(
            processed.date_updated,
            Some(Utc.with_ymd_and_hms(2017, 10, 9, 15, 55, 59).unwrap())
        );

        let json: serde_json::Value = serde_json::to_value(&processed).unwrap();
        let keys: Vec<&String> = json.as_object().unwrap().keys().collect();
        assert_eq!(keys.len(), 7);
        assert!(json.get("review_id").is_none());
        assert_eq!(json["date_updated"], "2017-10-09T15:55:59Z");
        assert_eq!(json["lang"], "en");
    }

    #[test]
    fn test_project_without_date() {
        let projection: Projection = "user_id,review_text".parse().unwrap();
        let mut raw = raw();
        // not projected, so never parsed
        raw.date_updated = Some("garbage".to_string());

        let processed =
            ProcessedReview::project(raw, &projection, "en".to_string(), DEFAULT_TIMESTAMP_FORMAT)
                .unwrap();
        assert_eq!(processed.date_updated, None);
        assert_eq!(processed.rating, None);
    }

    #[test]
    fn test_project_empty_date() {
        let mut raw = raw();
        raw.date_updated = Some("".to_string());

        let processed = ProcessedReview::project(
            raw,
            &Projection::default(),
            "en".to_string(),
            DEFAULT_TIMESTAMP_FORMAT,
        )
        .unwrap();
        assert_eq!(processed.date_updated, None);
    }

    #[test]
    fn test_project_bad_date() {
        let mut raw = raw();
        raw.date_updated = Some("2017-10-09".to_string());

        let processed = ProcessedReview::project(
            raw,
            &Projection::default(),
            "en".to_string(),
            DEFAULT_TIMESTAMP_FORMAT,
        );
        assert!(matches!(processed, Err(Error::Timestamp { .. })));
    }
}
