/*! FastText model.

Top-1 predictions, converted to [oxilangtag::LanguageTag]s.
* !*/
use std::path::Path;

use fasttext::FastText as FastTextLib;
use log::debug;

use crate::error::Error;

use super::{Identification, Identifier};

/// FastTextModel.
///
/// Built once through [FastTextBuilder] and lent to whatever needs identification.
pub struct FastText {
    inner: FastTextLib,
    pub threshold: f32,
}

impl FastText {
    /// fasttext predicts on a single line:
    /// newlines are turned into spaces and unicode null chars are removed.
    fn clean_text(text: &str) -> String {
        text.chars()
            .filter(|c| *c != char::from(0))
            .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
            .collect()
    }
}

impl Identifier for FastText {
    fn identify(&self, text: &str) -> Result<Option<Identification>, Error> {
        let line = Self::clean_text(text);
        let pred = self
            .inner
            .predict(&line, 1, self.threshold)
            .map_err(Error::FastText)?;

        match pred.into_iter().next() {
            Some(pred) => {
                debug!("{pred:?}");
                Ok(Some(Identification::try_from(pred)?))
            }
            None => Ok(None),
        }
    }
}

/// Fasttext builder.
pub struct FastTextBuilder<'a> {
    path: Option<&'a Path>,
    threshold: Option<f32>,
}

impl<'a> FastTextBuilder<'a> {
    fn init_fasttextlib(path: &str) -> Result<FastTextLib, Error> {
        let mut ft = FastTextLib::new();
        ft.load_model(path).map_err(Error::FastText)?;
        Ok(ft)
    }

    pub fn build(&self) -> Result<FastText, Error> {
        let path = self
            .path
            .ok_or_else(|| Error::Config("No path provided".to_string()))?;
        let threshold = self
            .threshold
            .ok_or_else(|| Error::Config("No threshold provided".to_string()))?;

        if !path.is_file() {
            return Err(Error::Config(format!(
                "language identification model not found: {:?}",
                path
            )));
        }

        let path = path
            .to_str()
            .ok_or_else(|| Error::Custom("Couldn't parse path".to_string()))?;

        Ok(FastText {
            inner: Self::init_fasttextlib(path)?,
            threshold,
        })
    }

    pub fn path<'b>(&'b mut self, path: &'a Path) -> &'b mut FastTextBuilder<'a> {
        self.path = Some(path);
        self
    }

    pub fn threshold<'b>(&'b mut self, threshold: f32) -> &'b mut FastTextBuilder<'a> {
        self.threshold = Some(threshold);
        self
    }
}

impl<'a> Default for FastTextBuilder<'a> {
    fn default() -> Self {
        Self {
            path: Some(Path::new("lid.176.bin")),
            threshold: Some(0.0),
        }
    }
}
