//! # reviewprep
//!
//! Resumable preparation of review corpora.
//!
//! ## Getting started
//!
//! ```sh
//! reviewprep 0.1.0
//! review corpus preparation tool.
//!
//! USAGE:
//!     reviewprep <SUBCOMMAND>
//!
//! FLAGS:
//!     -h, --help       Prints help information
//!     -V, --version    Prints version information
//!
//! SUBCOMMANDS:
//!     help       Prints this message or the help of the given subcommand(s)
//!     process    Filter and normalize a review dump, in resumable chunks
//!     split      Concatenate processed batches and train/test split them
//! ```
//!
//! Interrupting `process` is safe: rerunning it with the same arguments
//! resumes after the last checkpointed chunk.
use structopt::StructOpt;

use reviewprep::error::Error;
use reviewprep::identifiers::FastTextBuilder;
use reviewprep::pipelines::{ChunkedPipeline, Pipeline};
use reviewprep::processing::split::{self, SplitConfig};
use reviewprep::processing::LanguageFilter;

#[macro_use]
extern crate log;

mod cli;

fn main() -> Result<(), Error> {
    env_logger::init();

    let opt = cli::Reviewprep::from_args();
    debug!("cli args\n{:#?}", opt);

    match opt {
        cli::Reviewprep::Process(p) => {
            let config = p.pipeline_config()?;
            let target = p.target_lang()?;

            let model = FastTextBuilder::default()
                .path(&p.lid_path)
                .threshold(p.threshold)
                .build()?;
            let filter = LanguageFilter::new(&model, target, p.timestamp_format.as_str())?;

            let pipeline = ChunkedPipeline::new(config, filter)?;
            let summary = pipeline.run()?;

            info!(
                "processed {} chunks ({} skipped), {} records in {} files",
                summary.processed.len(),
                summary.skipped.len(),
                summary.nb_records(),
                summary.files().len()
            );
            match summary.checkpoint {
                Some(c) => info!("checkpoint at chunk {}", c),
                None => info!("no checkpoint written"),
            }
        }
        cli::Reviewprep::Split(s) => {
            let config = SplitConfig::from(s);
            let summary = split::split(&config)?;
            info!(
                "{} files: {} train records, {} test records",
                summary.nb_files, summary.train, summary.test
            );
        }
    };

    Ok(())
}
