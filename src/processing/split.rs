/*! splitting

Offline train/test splitting of processed batches.

Every `*.json` batch of the input directory is loaded (in path order), records are shuffled with a seeded RNG
and written to `train_df.json` and `test_df.json`. Records are carried as JSON lines and never re-serialized.
!*/
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use itertools::Itertools;
use log::{error, info};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::de::IgnoredAny;

use crate::error::Error;
use crate::io::JsonLinesWriter;

pub const TRAIN_FILE: &str = "train_df.json";
pub const TEST_FILE: &str = "test_df.json";

#[derive(Debug, Clone)]
pub struct SplitConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Share of records going to the test set, in `(0, 1)`.
    pub test_size: f64,
    pub seed: u64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("data/processed/"),
            output_dir: PathBuf::from("data/tidy/"),
            test_size: 0.2,
            seed: 42,
        }
    }
}

impl SplitConfig {
    pub fn validate(&self) -> Result<(), Error> {
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(Error::Config(format!(
                "test size must be in (0, 1), got {}",
                self.test_size
            )));
        }
        Ok(())
    }
}

/// Sizes of the split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitSummary {
    pub nb_files: usize,
    pub train: usize,
    pub test: usize,
}

/// Load the lines of a single batch file, checking that each one is valid JSON.
fn load_file(path: &Path) -> Result<Vec<String>, Error> {
    let f = File::open(path)?;
    let mut lines = Vec::new();
    for line in BufReader::new(f).lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        serde_json::from_str::<IgnoredAny>(&line)?;
        lines.push(line);
    }
    Ok(lines)
}

/// List batch files of `input_dir`, sorted by path.
pub fn batch_files(input_dir: &Path) -> Result<Vec<PathBuf>, Error> {
    let pattern = input_dir.join("*.json");
    let pattern = pattern
        .to_str()
        .ok_or_else(|| Error::Custom(format!("{:?} is not valid unicode", pattern)))?;

    let paths: Vec<PathBuf> = glob::glob(pattern)?.collect::<Result<_, _>>()?;
    Ok(paths.into_iter().sorted().collect())
}

/// Load and concatenate every batch of `input_dir`, files being read concurrently.
pub fn load_and_concatenate(input_dir: &Path) -> Result<(usize, Vec<String>), Error> {
    let paths = batch_files(input_dir)?;
    if paths.is_empty() {
        return Err(Error::Custom(format!(
            "no .json files found in {:?}",
            input_dir
        )));
    }

    let results: Vec<(&PathBuf, Result<Vec<String>, Error>)> =
        paths.par_iter().map(|path| (path, load_file(path))).collect();

    let mut records = Vec::new();
    let mut failed = false;
    for (path, result) in results {
        match result {
            Ok(lines) => {
                info!("loaded {} records from {:?}", lines.len(), path);
                records.extend(lines);
            }
            Err(e) => {
                error!("could not load {:?}: {:?}", path, e);
                failed = true;
            }
        }
    }

    if failed {
        return Err(Error::Custom(format!(
            "could not load every batch of {:?}",
            input_dir
        )));
    }

    Ok((paths.len(), records))
}

/// Shuffle `items` with a `seed`ed RNG and split them into `(train, test)`.
///
/// The test set gets `ceil(test_size * n)` items.
pub fn train_test_split<T>(mut items: Vec<T>, test_size: f64, seed: u64) -> (Vec<T>, Vec<T>) {
    let mut rng = StdRng::seed_from_u64(seed);
    items.shuffle(&mut rng);

    let nb_test = ((items.len() as f64) * test_size).ceil() as usize;
    let nb_test = nb_test.min(items.len());
    let train = items.split_off(nb_test);

    (train, items)
}

fn write_lines(dst: &Path, lines: &[String]) -> Result<(), Error> {
    let mut writer = JsonLinesWriter::create(dst)?;
    for line in lines {
        writer.write_raw(line)?;
    }
    writer.finish()?;
    Ok(())
}

/// Concatenate the batches of `config.input_dir` and write a train/test split into `config.output_dir`.
pub fn split(config: &SplitConfig) -> Result<SplitSummary, Error> {
    config.validate()?;

    let (nb_files, records) = load_and_concatenate(&config.input_dir)?;
    info!("{} records from {} files", records.len(), nb_files);

    let (train, test) = train_test_split(records, config.test_size, config.seed);

    write_lines(&config.output_dir.join(TRAIN_FILE), &train)?;
    write_lines(&config.output_dir.join(TEST_FILE), &test)?;

    info!(
        "Training ({}) and testing ({}) data saved to {:?}",
        train.len(),
        test.len(),
        config.output_dir
    );

    Ok(SplitSummary {
        nb_files,
        train: train.len(),
        test: test.len(),
    })
}
