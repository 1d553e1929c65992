use fasttext::Prediction;
use oxilangtag::{LanguageTag, LanguageTagParseError};

/// BCP 47 tag for content whose language could not be determined.
pub const UNDETERMINED: &str = "und";

/// Language tag used when identification fails.
pub fn undetermined() -> LanguageTag<String> {
    LanguageTag::parse(UNDETERMINED.to_string()).expect("und is a valid language tag")
}

#[derive(Debug, Clone, PartialEq)]
pub struct Identification {
    label: LanguageTag<String>,
    prob: f32,
}

impl Identification {
    pub fn new(label: LanguageTag<String>, prob: f32) -> Self {
        Self { label, prob }
    }

    /// Get a reference to the identification's label.
    pub fn label(&self) -> &LanguageTag<String> {
        &self.label
    }

    /// Get a reference to the identification's prob.
    pub fn prob(&self) -> &f32 {
        &self.prob
    }

    pub fn into_label(self) -> LanguageTag<String> {
        self.label
    }
}

/// for fasttext predictions
impl TryFrom<Prediction> for Identification {
    type Error = LanguageTagParseError;
    fn try_from(prediction: Prediction) -> Result<Self, LanguageTagParseError> {
        // skip __label__
        let label = prediction
            .label
            .strip_prefix("__label__")
            .unwrap_or(&prediction.label);

        //convert to valid bcp47
        let label = label.replace('_', "-");

        Ok(Self::new(
            LanguageTag::parse_and_normalize(&label)?,
            prediction.prob,
        ))
    }
}
