//! Command line tool to predict sentiment for unlabeled tweets

use std::sync::Arc;

use anyhow::anyhow;
use burn::backend::{ndarray::NdArrayDevice, NdArray};
use pico_args::Arguments;
use tweet_sentiment::{
    datasets::tweets,
    pipelines::text_classification::{infer, predicted_labels, write_predictions},
    vocab::Vocabulary,
};

const HELP: &str = "\
Usage: predict --ckpt-dir DIR [OPTIONS]

Options:
  -h, --help           Print help
  -c, --ckpt-dir       Directory holding config.json and the trained weights
                       (--ckpt_file is accepted as an alias)
  -v, --vocab-file     Vocabulary snapshot (defaults to 'data/vocab.bin')
  -t, --test-file      Unlabeled input, one tweet per line (defaults to 'data/test.txt')
  -o, --output         Where to write predictions (defaults to 'data/predictions.csv')
";

#[derive(Debug)]
struct Args {
    ckpt_dir: String,
    vocab_file: String,
    test_file: String,
    output: String,
}

impl Args {
    fn parse() -> anyhow::Result<Option<Self>> {
        Self::parse_from(Arguments::from_env())
    }

    fn parse_from(mut pargs: Arguments) -> anyhow::Result<Option<Self>> {
        // Help has a higher priority and should be handled separately.
        if pargs.contains(["-h", "--help"]) {
            return Ok(None);
        }

        let args = Args {
            ckpt_dir: pargs
                .opt_value_from_str(["-c", "--ckpt-dir"])?
                .or(pargs.opt_value_from_str("--ckpt_file")?)
                .ok_or_else(|| anyhow!("Missing required option: --ckpt-dir"))?,
            vocab_file: pargs
                .opt_value_from_str(["-v", "--vocab-file"])?
                .unwrap_or_else(|| "data/vocab.bin".to_string()),
            test_file: pargs
                .opt_value_from_str(["-t", "--test-file"])?
                .unwrap_or_else(|| "data/test.txt".to_string()),
            output: pargs
                .opt_value_from_str(["-o", "--output"])?
                .unwrap_or_else(|| "data/predictions.csv".to_string()),
        };

        Ok(Some(args))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let output = Args::parse()?;

    if output.is_none() {
        print!("{}", HELP);

        return Ok(());
    }
    let args = output.unwrap();

    let vocab = Arc::new(Vocabulary::load(&args.vocab_file)?);
    let samples = tweets::Dataset::load_test(&args.test_file).await?;
    let count = samples.len();

    let (probabilities, config) =
        infer::<NdArray>(NdArrayDevice::Cpu, &args.ckpt_dir, vocab, samples)?;

    let labels = predicted_labels(probabilities, &config);
    write_predictions(&args.output, &labels)?;

    println!("Wrote {count} predictions to {}", args.output);

    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn the_original_ckpt_file_spelling_is_accepted() {
        let vec = vec!["--ckpt_file".into(), "data/models/gru".into()];

        let args = Args::parse_from(Arguments::from_vec(vec)).unwrap().unwrap();

        assert_eq!(args.ckpt_dir, "data/models/gru");
    }

    #[test]
    fn a_missing_checkpoint_directory_is_an_error() {
        let vec = vec!["--test-file".into(), "data/test.txt".into()];

        assert!(Args::parse_from(Arguments::from_vec(vec)).is_err());
    }
}
