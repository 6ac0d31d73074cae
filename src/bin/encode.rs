//! Command line tool to term-frequency encode a text file

use std::sync::Arc;

use anyhow::anyhow;
use pico_args::Arguments;
use tweet_sentiment::{encoding::TfEncoder, vocab::Vocabulary};

const HELP: &str = "\
Usage: encode SOURCE DEST [OPTIONS]

Arguments:
  SOURCE               Text input, one document per line
  DEST                 Where to write the encoded matrix

Options:
  -h, --help           Print help
  -v, --vocab-file     Vocabulary snapshot (defaults to 'data/vocab.bin')
";

#[derive(Debug)]
struct Args {
    source: String,
    dest: String,
    vocab_file: String,
}

impl Args {
    fn parse() -> anyhow::Result<Option<Self>> {
        let mut pargs = Arguments::from_env();

        // Help has a higher priority and should be handled separately.
        if pargs.contains(["-h", "--help"]) {
            return Ok(None);
        }

        let args = Args {
            vocab_file: pargs
                .opt_value_from_str(["-v", "--vocab-file"])?
                .unwrap_or_else(|| "data/vocab.bin".to_string()),
            source: pargs.free_from_str().map_err(|e| match e {
                pico_args::Error::MissingArgument => anyhow!("Missing required argument: SOURCE"),
                _ => anyhow!("{}", e),
            })?,
            dest: pargs.free_from_str().map_err(|e| match e {
                pico_args::Error::MissingArgument => anyhow!("Missing required argument: DEST"),
                _ => anyhow!("{}", e),
            })?,
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

    let encoder = TfEncoder::new(vocab);
    let matrix = encoder.encode(&args.source, &args.dest).await?;

    println!(
        "Encoded {} lines x {} tokens into {}",
        matrix.rows(),
        matrix.cols(),
        args.dest
    );

    Ok(())
}
