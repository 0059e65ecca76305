//! localrag - Main CLI Entry Point

use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::sync::Arc;

use localrag::cli::Args;
use localrag::config::Config;
use localrag::ollama::{Embedder, Generator, OllamaClient};
use localrag::pipeline::{Answered, RagPipeline};
use localrag::{RagError, Result};

#[tokio::main]
async fn main() {
    let args = Args::parse();
    if let Err(e) = run(args).await {
        eprintln!("{} {}", "✗".red().bold(), e.to_string().red());
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let config = Config::load()?;
    let quiet = args.quiet;

    let client = Arc::new(OllamaClient::new(
        Some(args.ollama_url()),
        args.embed_model(&config),
        args.generate_model(&config),
    ));

    if !client.is_available().await {
        return Err(RagError::Generic(
            "Ollama is not running! Start with: ollama serve".to_string(),
        ));
    }

    let pipeline_config = args.pipeline_config(&config)?;
    let collection = pipeline_config.collection.clone();
    let variants = pipeline_config.retrieval.variants;

    let mut pipeline = RagPipeline::new(
        Arc::clone(&client) as Arc<dyn Embedder>,
        Arc::clone(&client) as Arc<dyn Generator>,
        args.db_dir(&config),
        pipeline_config,
    )?;

    if args.reuse_index {
        let records = pipeline.load_index()?;
        if !quiet {
            println!(
                "{} Reusing collection '{}' ({} records)",
                "✅".green(),
                collection,
                records
            );
        }
    } else {
        let progress = if quiet {
            None
        } else {
            let pb = ProgressBar::new(0);
            pb.set_style(
                ProgressStyle::with_template(
                    "{spinner:.green} embedding chunks [{bar:30.cyan/blue}] {pos}/{len}",
                )
                .expect("valid progress template")
                .progress_chars("=> "),
            );
            Some(pb)
        };

        let report = pipeline.build_index(&args.pdf, progress.as_ref()).await?;
        if let Some(pb) = progress {
            pb.finish_and_clear();
        }

        if !quiet {
            println!("{} PDF loaded successfully ({} pages)", "✅".green(), report.pages);
            println!(
                "{} Document split into {} chunks",
                "✅".green(),
                report.chunks
            );
            println!(
                "{} Vector store ready: {} records in collection '{}'",
                "✅".green(),
                report.records,
                collection
            );
        }
    }

    match &args.question {
        Some(question) => {
            let answered = pipeline.ask(question).await?;
            print_answer(&answered, variants, quiet);
        }
        None => {
            let mut editor = DefaultEditor::new()
                .map_err(|e| RagError::Generic(format!("failed to open input: {}", e)))?;

            loop {
                let line = match editor.readline("❓ Ask a question: ") {
                    Ok(line) => line,
                    Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                    Err(e) => {
                        return Err(RagError::Generic(format!("input error: {}", e)));
                    }
                };

                let question = line.trim();
                if question.is_empty() {
                    break;
                }
                let _ = editor.add_history_entry(question);

                let answered = pipeline.ask(question).await?;
                print_answer(&answered, variants, quiet);
            }
        }
    }

    Ok(())
}

fn print_answer(answered: &Answered, requested_variants: usize, quiet: bool) {
    if !quiet {
        let produced = answered.queries.len().saturating_sub(1);
        if produced < requested_variants {
            println!(
                "{}",
                format!(
                    "note: model produced {} of {} query variants",
                    produced, requested_variants
                )
                .dimmed()
            );
        }
        println!(
            "{}",
            format!("retrieved {} chunks as context", answered.chunks_used).dimmed()
        );
    }

    println!("\n{}\n{}", "📝 Answer:".bold(), answered.answer);
}
