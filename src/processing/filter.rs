/*! Chunk processing

[ChunkProcessor] is the per-chunk collaborator of the chunked pipeline: it receives a raw [Chunk] and a [Projection],
and returns the records to keep. It knows nothing about chunking, checkpointing or file naming.

[LanguageFilter] is the default processor: it tags each review with its detected language,
keeps the ones written in the target language and normalizes their timestamps.
!*/
use log::{debug, warn};
use oxilangtag::LanguageTag;

use crate::error::Error;
use crate::identifiers::{undetermined, Identifier, UNDETERMINED};
use crate::io::Chunk;

use super::review::{ProcessedReview, Projection, RawReview};

/// Records kept from a [Chunk], in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedChunk {
    index: usize,
    records: Vec<ProcessedReview>,
}

impl ProcessedChunk {
    pub fn new(index: usize, records: Vec<ProcessedReview>) -> Self {
        Self { index, records }
    }

    /// Index of the source chunk.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn records(&self) -> &[ProcessedReview] {
        self.records.as_ref()
    }

    pub fn into_records(self) -> Vec<ProcessedReview> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

pub trait ChunkProcessor {
    fn process(&self, chunk: Chunk, projection: &Projection) -> Result<ProcessedChunk, Error>;
}

/// Keeps reviews written in a target language.
///
/// Identification failures never abort processing: the review is tagged `und` and dropped.
/// Timestamp format mismatches do abort it, since they mean the configured format is wrong.
pub struct LanguageFilter<'a, I: Identifier> {
    identifier: &'a I,
    target: LanguageTag<String>,
    timestamp_format: String,
}

impl<'a, I: Identifier> LanguageFilter<'a, I> {
    pub fn new(
        identifier: &'a I,
        target: LanguageTag<String>,
        timestamp_format: impl Into<String>,
    ) -> Result<Self, Error> {
        if target.primary_language().eq_ignore_ascii_case(UNDETERMINED) {
            return Err(Error::Config(
                "target language cannot be undetermined".to_string(),
            ));
        }

        Ok(Self {
            identifier,
            target,
            timestamp_format: timestamp_format.into(),
        })
    }

    pub fn target(&self) -> &LanguageTag<String> {
        &self.target
    }

    /// Detect the language of `text`, falling back to `und`.
    pub fn detect(&self, text: &str) -> LanguageTag<String> {
        if text.trim().is_empty() {
            return undetermined();
        }

        match self.identifier.identify(text) {
            Ok(Some(id)) => id.into_label(),
            Ok(None) => undetermined(),
            Err(e) => {
                warn!("identification failed, tagging as undetermined: {:?}", e);
                undetermined()
            }
        }
    }

    /// Tags match on their primary language subtag (`en-GB` is `en`).
    pub fn is_target(&self, tag: &LanguageTag<String>) -> bool {
        tag.primary_language()
            .eq_ignore_ascii_case(self.target.primary_language())
    }
}

impl<'a, I: Identifier> ChunkProcessor for LanguageFilter<'a, I> {
    fn process(&self, chunk: Chunk, projection: &Projection) -> Result<ProcessedChunk, Error> {
        let reviews: Vec<RawReview> = chunk.parse()?;
        let nb_reviews = reviews.len();

        let records = reviews
            .into_iter()
            .filter_map(|review| {
                let lang = self.detect(review.review_text.as_deref().unwrap_or_default());
                if self.is_target(&lang) {
                    Some((review, lang))
                } else {
                    None
                }
            })
            .map(|(review, lang)| {
                ProcessedReview::project(
                    review,
                    projection,
                    lang.to_string(),
                    &self.timestamp_format,
                )
            })
            .collect::<Result<Vec<_>, Error>>()?;

        debug!(
            "chunk {}: kept {}/{} reviews",
            chunk.index(),
            records.len(),
            nb_reviews
        );

        Ok(ProcessedChunk::new(chunk.index(), records))
    }
}
