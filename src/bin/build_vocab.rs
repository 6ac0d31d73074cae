//! Command line tool to build a vocabulary snapshot from a corpus

use anyhow::anyhow;
use pico_args::Arguments;
use tweet_sentiment::{utils::files::read_file, vocab::Vocabulary};

const HELP: &str = "\
Usage: build_vocab CORPUS... [OPTIONS]

Arguments:
  CORPUS               One or more text files, one document per line

Options:
  -h, --help           Print help
  -o, --output         Where to write the snapshot (defaults to 'data/vocab.bin')
  -m, --min-count      Keep tokens occurring at least this often (defaults to 1)
";

#[derive(Debug)]
struct Args {
    corpus: Vec<String>,
    output: String,
    min_count: usize,
}

impl Args {
    fn parse() -> anyhow::Result<Option<Self>> {
        let mut pargs = Arguments::from_env();

        // Help has a higher priority and should be handled separately.
        if pargs.contains(["-h", "--help"]) {
            return Ok(None);
        }

        let output = pargs
            .opt_value_from_str(["-o", "--output"])?
            .unwrap_or_else(|| "data/vocab.bin".to_string());
        let min_count = pargs.opt_value_from_str(["-m", "--min-count"])?.unwrap_or(1);

        let mut corpus = Vec::new();
        while let Some(path) = pargs.opt_free_from_str::<String>()? {
            corpus.push(path);
        }

        if corpus.is_empty() {
            return Err(anyhow!("Missing required argument: CORPUS"));
        }

        Ok(Some(Args {
            corpus,
            output,
            min_count,
        }))
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

    let mut lines = Vec::new();
    for path in &args.corpus {
        lines.extend(read_file(path).await?);
    }

    let vocab = Vocabulary::build(&lines, args.min_count);
    vocab.save(&args.output)?;

    println!("Saved {} tokens to {}", vocab.len(), args.output);

    Ok(())
}
