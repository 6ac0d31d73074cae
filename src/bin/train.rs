//! Command line tool to train a sentiment classifier

use std::sync::Arc;

use anyhow::anyhow;
use burn::backend::{ndarray::NdArrayDevice, Autodiff, NdArray};
use pico_args::Arguments;
use tweet_sentiment::{
    datasets::tweets,
    models::{Architecture, Loss, ModelConfig},
    pipelines::text_classification::{train, training},
    vocab::{EmbeddingKind, EmbeddingTable, Vocabulary},
};

const HELP: &str = "\
Usage: train ARCHITECTURE [OPTIONS]

Architecture (exactly one):
  --vanilla            Single LSTM layer
  --gru                Single GRU layer
  --bidi               Bidirectional LSTM, sum-merged
  --multi-layer        Two stacked LSTM layers
  --ensemble           Recurrent and convolutional branches, concatenated
  --conv               Parallel pooled convolution branches
  --conv2              Stacked 2-D convolutions
  --swisscheese        Two thinning 1-D convolutions

Options:
  -h, --help           Print help
  -t, --train-file     Labeled CSV with text,label headers (defaults to 'data/train.csv')
  -v, --vocab-file     Vocabulary snapshot (defaults to 'data/vocab.bin')
  -e, --embedding-file Pretrained embedding text file
  --embedding-type     'glove', 'word2vec', or 'learned' (defaults to 'glove'
                       when an embedding file is given, 'learned' otherwise)
  --emb-len            Embedding dimension (defaults to 200)
  --loss               'cross-entropy', 'categorical-crossentropy', or
                       'smoothed-cross-entropy'
  -b, --batch-size     Batch size
  -n, --num-epochs     Number of epochs to train for
  -s, --seed           Seed for the split, shuffling, and initialization
  -d, --data-dir       The path to the top-level data directory (defaults to 'data')
  --no-tui             Disable TUI

Underscore spellings from older run scripts (--multi_layer, --ensamble,
--train_file, --embedding_type, --emb_len, categorical_crossentropy) are
accepted as aliases.
";

const ARCHITECTURE_FLAGS: [(&str, Architecture); 10] = [
    ("--vanilla", Architecture::Vanilla),
    ("--gru", Architecture::Gru),
    ("--bidi", Architecture::Bidi),
    ("--multi-layer", Architecture::MultiLayer),
    ("--multi_layer", Architecture::MultiLayer),
    ("--ensemble", Architecture::Ensemble),
    ("--ensamble", Architecture::Ensemble),
    ("--conv", Architecture::Conv),
    ("--conv2", Architecture::Conv2),
    ("--swisscheese", Architecture::SwissCheese),
];

#[derive(Debug)]
struct Args {
    architecture: Architecture,
    train_file: String,
    vocab_file: String,
    embedding_file: Option<String>,
    embedding_type: Option<String>,
    emb_len: usize,
    loss: Option<String>,
    batch_size: Option<usize>,
    num_epochs: Option<usize>,
    seed: Option<u64>,
    data_dir: Option<String>,
    use_tui: bool,
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

        let mut architecture = None;
        for (flag, candidate) in ARCHITECTURE_FLAGS {
            if pargs.contains(flag) && architecture.is_none() {
                architecture = Some(candidate);
            }
        }

        let args = Args {
            architecture: architecture
                .ok_or_else(|| anyhow!("Missing architecture switch (e.g., '--vanilla')"))?,
            train_file: pargs
                .opt_value_from_str(["-t", "--train-file"])?
                .or(pargs.opt_value_from_str("--train_file")?)
                .unwrap_or_else(|| "data/train.csv".to_string()),
            vocab_file: pargs
                .opt_value_from_str(["-v", "--vocab-file"])?
                .unwrap_or_else(|| "data/vocab.bin".to_string()),
            embedding_file: pargs.opt_value_from_str(["-e", "--embedding-file"])?,
            embedding_type: pargs
                .opt_value_from_str("--embedding-type")?
                .or(pargs.opt_value_from_str("--embedding_type")?),
            emb_len: pargs
                .opt_value_from_str("--emb-len")?
                .or(pargs.opt_value_from_str("--emb_len")?)
                .unwrap_or(200),
            loss: pargs.opt_value_from_str("--loss")?,
            batch_size: pargs.opt_value_from_str(["-b", "--batch-size"])?,
            num_epochs: pargs.opt_value_from_str(["-n", "--num-epochs"])?,
            seed: pargs.opt_value_from_str(["-s", "--seed"])?,
            data_dir: pargs.opt_value_from_str(["-d", "--data-dir"])?,
            use_tui: !(pargs.contains("--no-tui")),
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

    let dataset = tweets::Dataset::load(&args.train_file).await?;
    let labels = dataset.labels.clone();

    let mut config = training::Config::new();

    if let Some(batch_size) = args.batch_size {
        config.batch_size = batch_size;
    }

    if let Some(num_epochs) = args.num_epochs {
        config.num_epochs = num_epochs;
    }

    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    if let Some(data_dir) = &args.data_dir {
        config.data_dir = data_dir.to_string();
    }

    let (train_set, valid_set) = dataset.split(config.train_ratio, config.seed);

    let kind = match &args.embedding_type {
        Some(name) => EmbeddingKind::try_from(name.as_str())?,
        None if args.embedding_file.is_some() => EmbeddingKind::Glove,
        None => EmbeddingKind::Learned,
    };

    let embeddings = match (&args.embedding_file, kind) {
        (_, EmbeddingKind::Learned) => None,
        (Some(path), kind) => Some(EmbeddingTable::load(path, kind, args.emb_len).await?),
        (None, _) => {
            return Err(anyhow!(
                "--embedding-file is required for embedding type '{}'",
                args.embedding_type.as_deref().unwrap_or_default()
            ))
        }
    };

    let loss = match &args.loss {
        Some(name) => Loss::try_from(name.as_str())?,
        None => Loss::CrossEntropy,
    };

    let model_config = ModelConfig::new(args.architecture, vocab.len(), labels)
        .with_embedding_dim(args.emb_len)
        .with_label_smoothing(loss.label_smoothing());

    let device = NdArrayDevice::Cpu;

    train::<Autodiff<NdArray>, _>(
        vec![device],
        vocab,
        train_set,
        valid_set,
        embeddings,
        model_config,
        config,
        args.use_tui,
    )
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn parse(flags: &[&str]) -> Args {
        let vec = flags.iter().map(|flag| flag.to_string().into()).collect();

        Args::parse_from(Arguments::from_vec(vec)).unwrap().unwrap()
    }

    #[test]
    fn kebab_case_flags_parse() {
        let args = parse(&[
            "--multi-layer",
            "--train-file",
            "tweets.csv",
            "--embedding-type",
            "glove",
            "--emb-len",
            "100",
        ]);

        assert_eq!(args.architecture, Architecture::MultiLayer);
        assert_eq!(args.train_file, "tweets.csv");
        assert_eq!(args.embedding_type.as_deref(), Some("glove"));
        assert_eq!(args.emb_len, 100);
    }

    #[test]
    fn underscore_spellings_from_older_run_scripts_parse() {
        let args = parse(&[
            "--multi_layer",
            "--train_file",
            "tweets.csv",
            "--embedding_type",
            "word2vec",
            "--emb_len",
            "100",
        ]);

        assert_eq!(args.architecture, Architecture::MultiLayer);
        assert_eq!(args.train_file, "tweets.csv");
        assert_eq!(args.embedding_type.as_deref(), Some("word2vec"));
        assert_eq!(args.emb_len, 100);
    }

    #[test]
    fn a_missing_architecture_switch_is_an_error() {
        let vec = vec!["--train-file".into(), "tweets.csv".into()];

        assert!(Args::parse_from(Arguments::from_vec(vec)).is_err());
    }
}
