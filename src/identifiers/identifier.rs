/*! Identifier trait

All identifiers should implement [Identifier] to be useable in processing and pipelines.
!*/
use crate::error::Error;

use super::Identification;

pub trait Identifier {
    /// returns the most probable language of `text`, or `None` if no language could be found.
    fn identify(&self, text: &str) -> Result<Option<Identification>, Error>;
}
