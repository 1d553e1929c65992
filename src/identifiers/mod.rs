/*! Language identification models

Holds an [Identifier] trait for implementing other ones.

The current identifier used is [fasttext](https://fasttext.cc) !*/
pub(crate) mod identification;
mod identifier;
mod model;

pub use identification::{undetermined, Identification, UNDETERMINED};
pub use identifier::Identifier;
pub use model::{FastText, FastTextBuilder};
