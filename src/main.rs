use std::io::Read;

use anyhow::Result;
use textscore::{AppState, SubmissionInput};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let text_arg = match args.next() {
        Some(arg) => arg,
        None => {
            eprintln!("Usage: textscore <text|-> [topic]");
            eprintln!("  Pass '-' to read the text from stdin.");
            std::process::exit(2);
        }
    };
    let topic = args.next();

    let text = if text_arg == "-" {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        text_arg
    };

    let state = AppState::new()?;
    let result = state
        .analysis
        .submit(SubmissionInput { text, file: None }, topic)
        .await?;

    println!("Overall score: {:.1}/100", result.overall_score);
    println!("  Grammar:   {:.1}", result.grammar.score);
    println!("  Coherence: {:.1}", result.coherence.score);
    println!("  Relevance: {:.1}", result.relevance.score);
    println!(
        "Words: {}  Sentences: {}  Paragraphs: {}  Avg sentence length: {:.1}",
        result.word_count, result.sentence_count, result.paragraph_count, result.avg_sentence_length
    );
    println!();
    println!("{}", result.feedback_summary);

    if !result.strengths.is_empty() {
        println!();
        println!("Strengths:");
        for strength in &result.strengths {
            println!("  + {}", strength);
        }
    }

    if !result.areas_for_improvement.is_empty() {
        println!();
        println!("Areas for improvement:");
        for area in &result.areas_for_improvement {
            println!("  - {}", area);
        }
    }

    Ok(())
}
