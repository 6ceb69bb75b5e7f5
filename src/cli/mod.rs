// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses arguments with clap and dispatches to Layer 2.
//
//   1. `train`    — trains a classifier and writes a model directory
//   2. `classify` — labels text with a trained model directory

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{ClassifyArgs, Commands, TrainArgs};

#[derive(Parser, Debug)]
#[command(
    name = "text-cnn",
    version,
    about = "Train a CNN text classifier on label<TAB>text files, then classify text."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args) => run_train(args),
            Commands::Classify(args) => run_classify(args),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    use text_cnn::application::train_use_case::TrainUseCase;

    tracing::info!("Starting training on '{}'", args.train_path.display());
    let use_case = TrainUseCase::new(args.into());
    let outcome = use_case.execute()?;

    println!(
        "Training complete after {} epochs (best valid_loss={:.4}).",
        outcome.history.len(),
        outcome.best_valid_loss
    );
    Ok(())
}

fn run_classify(args: ClassifyArgs) -> Result<()> {
    use text_cnn::application::classify_use_case::ClassifyUseCase;

    let use_case = ClassifyUseCase::new(&args.model_dir, args.device, args.batch_size)?;
    for line in use_case.run(args.input.as_ref(), args.top_k)? {
        println!("{line}");
    }
    Ok(())
}
