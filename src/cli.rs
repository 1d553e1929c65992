//! Command line arguments and parameters management/parsing.
use std::path::PathBuf;

use oxilangtag::LanguageTag;
use reviewprep::error::Error;
use reviewprep::pipelines::PipelineConfig;
use reviewprep::processing::split::SplitConfig;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(name = "reviewprep", about = "review corpus preparation tool.")]
/// Holds every command that is callable by the `reviewprep` command.
pub enum Reviewprep {
    #[structopt(about = "Filter and normalize a review dump, in resumable chunks")]
    Process(Process),
    #[structopt(about = "Concatenate processed batches and train/test split them")]
    Split(Split),
}

#[derive(Debug, StructOpt)]
/// Process command and parameters.
///
/// ```sh
/// reviewprep-process 0.1.0
/// Filter and normalize a review dump, in resumable chunks
///
/// USAGE:
///     reviewprep process [OPTIONS]
///
/// OPTIONS:
///     -c, --chunksize <chunk-size>             Number of lines per chunk. [default: 100000]
///         --columns <columns>                  Comma separated columns to keep.
///     -f, --file <file>                        Path to the input JSON file.
///         --lang <lang>                        Language to keep. [default: en]
///         --lid-path <lid-path>                Path to lid.176.bin [default: lid.176.bin]
///     -o, --output-prefix <output-prefix>      Prefix for the output files.
///     -s, --save-interval <save-interval>      Number of chunks before saving. [default: 5]
///     -t, --state-file <state-file>            Checkpoint file.
/// ```
pub struct Process {
    #[structopt(
        parse(from_os_str),
        short = "f",
        long = "file",
        help = "Path to the input JSON file.",
        default_value = "data/raw/goodreads_reviews_dedup.json.gz"
    )]
    pub file: PathBuf,
    #[structopt(
        short = "c",
        long = "chunksize",
        help = "Number of lines per chunk.",
        default_value = "100000"
    )]
    pub chunk_size: usize,
    #[structopt(
        short = "s",
        long = "save-interval",
        help = "Number of chunks before saving.",
        default_value = "5"
    )]
    pub save_interval: usize,
    #[structopt(
        parse(from_os_str),
        short = "o",
        long = "output-prefix",
        help = "Prefix for the output files.",
        default_value = "data/processed/processed_chunk_"
    )]
    pub output_prefix: PathBuf,
    #[structopt(
        parse(from_os_str),
        short = "t",
        long = "state-file",
        help = "Checkpoint file, holding the last saved chunk index.",
        default_value = "data/processed/processing_state.txt"
    )]
    pub state_file: PathBuf,
    #[structopt(
        long = "columns",
        help = "Comma separated columns to keep.",
        default_value = "user_id,book_id,rating,review_text,date_updated,n_votes"
    )]
    pub columns: String,
    #[structopt(
        parse(from_os_str),
        long = "lid-path",
        help = "Path to lid.176.bin",
        default_value = "lid.176.bin"
    )]
    pub lid_path: PathBuf,
    #[structopt(long = "lang", help = "Language to keep.", default_value = "en")]
    pub lang: String,
    #[structopt(
        long = "threshold",
        help = "Minimum identification probability.",
        default_value = "0.0"
    )]
    pub threshold: f32,
    #[structopt(
        long = "timestamp-format",
        help = "Format of the date_updated field.",
        default_value = "%a %b %d %H:%M:%S %z %Y"
    )]
    pub timestamp_format: String,
}

impl Process {
    pub fn target_lang(&self) -> Result<LanguageTag<String>, Error> {
        Ok(LanguageTag::parse_and_normalize(&self.lang)?)
    }

    pub fn pipeline_config(&self) -> Result<PipelineConfig, Error> {
        let config = PipelineConfig {
            src: self.file.clone(),
            chunk_size: self.chunk_size,
            save_interval: self.save_interval,
            output_prefix: self.output_prefix.clone(),
            state_file: self.state_file.clone(),
            projection: self.columns.parse()?,
        };
        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug, StructOpt)]
/// Split command and parameters.
pub struct Split {
    #[structopt(
        parse(from_os_str),
        long = "input-dir",
        help = "Directory containing the JSON files to be concatenated.",
        default_value = "data/processed/"
    )]
    pub input_dir: PathBuf,
    #[structopt(
        parse(from_os_str),
        long = "output-dir",
        help = "Directory to save the split training and testing sets.",
        default_value = "data/tidy/"
    )]
    pub output_dir: PathBuf,
    #[structopt(
        long = "test-size",
        help = "Proportion of the data to use for the test set.",
        default_value = "0.2"
    )]
    pub test_size: f64,
    #[structopt(long = "seed", help = "Shuffling seed.", default_value = "42")]
    pub seed: u64,
}

impl From<Split> for SplitConfig {
    fn from(s: Split) -> SplitConfig {
        SplitConfig {
            input_dir: s.input_dir,
            output_dir: s.output_dir,
            test_size: s.test_size,
            seed: s.seed,
        }
    }
}
