//! The `tagdrill quiz` command.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::io::{AsyncBufReadExt, BufReader};

use tagdrill_core::engine::{QuizEngine, QuizEngineConfig};
use tagdrill_core::model::{Answers, Category, CategorySelection};
use tagdrill_core::session::{Grading, SessionOptions, Shortcut, Submission};
use tagdrill_sources::load_config_from;

use super::{load_data, open_tracker};

/// Typed instead of an answer to skip the current item.
const SKIP_COMMAND: &str = ":skip";

pub struct QuizArgs {
    pub category: String,
    pub limit: usize,
    pub exam: bool,
    pub pause_ms: Option<u64>,
    pub seed: Option<u64>,
    pub summary: Option<PathBuf>,
    pub config: Option<PathBuf>,
}

enum Input {
    Answers(Answers),
    Skip,
    Eof,
}

pub async fn execute(args: QuizArgs) -> Result<()> {
    let selection: CategorySelection = args.category.parse()?;
    let config = load_config_from(args.config.as_deref())?;
    let pause = args
        .pause_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| config.pause());

    let loaded = load_data(&config).await?;
    let tracker = Arc::new(open_tracker(&config));
    let engine = QuizEngine::new(Arc::new(loaded.data), tracker, QuizEngineConfig { pause });

    let options = SessionOptions::new(selection)
        .with_limit(args.limit)
        .exam(args.exam)
        .with_exam_ratio(config.exam_ratio);
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let progress = engine.start(options, &mut rng)?;

    println!(
        "{} | {} items{} | type 1 if you knew it, 2 if not, {SKIP_COMMAND} to skip",
        selection,
        progress.total,
        if args.exam { " (exam)" } else { "" }
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(item) = engine.current_item() {
        let Some(progress) = engine.progress() else {
            break;
        };
        println!(
            "\n[{}/{}] {} {}",
            progress.position, progress.total, item.category, item.tag
        );

        let fields = engine.current_fields().unwrap_or_default();
        let input = read_answers(&mut lines, item.category, &fields).await?;
        let answers = match input {
            Input::Answers(answers) => answers,
            Input::Skip => {
                engine.skip()?;
                continue;
            }
            Input::Eof => {
                println!();
                break;
            }
        };

        match engine.submit(&answers) {
            Ok(submission) => print_submission(&submission),
            Err(e) if e.is_recoverable() => {
                println!("{e}, skipping");
                engine.skip()?;
                continue;
            }
            Err(e) => return Err(e.into()),
        }
        engine.settle().await;
    }

    let Some(summary) = engine.summary() else {
        return Ok(());
    };
    println!(
        "\nScore: {}/{} correct ({} answered, {}%)",
        summary.correct,
        summary.total,
        summary.answered(),
        (summary.accuracy() * 100.0).round()
    );

    if let Some(path) = &args.summary {
        summary.save_json(path)?;
        eprintln!("Session summary: {}", path.display());
    }

    Ok(())
}

/// Prompt for each field. A shortcut in the first field ends the prompt.
async fn read_answers<R>(
    lines: &mut tokio::io::Lines<R>,
    category: Category,
    fields: &[tagdrill_core::Field],
) -> Result<Input>
where
    R: tokio::io::AsyncBufRead + Unpin,
{
    let mut answers = Answers::new();
    for (i, field) in fields.iter().enumerate() {
        print!("  {}: ", field.label(category));
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            return Ok(Input::Eof);
        };
        let line = line.trim();
        if line == SKIP_COMMAND {
            return Ok(Input::Skip);
        }
        answers.set(*field, line);
        if i == 0 && Shortcut::detect(line).is_some() {
            break;
        }
    }
    Ok(Input::Answers(answers))
}

fn print_submission(submission: &Submission) {
    let mark = if submission.correct { "✓" } else { "✗" };
    let category = submission.item.category;

    match &submission.grading {
        Grading::Graded { verdict } => {
            println!("{mark} {}", if verdict.correct { "correct" } else { "wrong" });
            for f in &verdict.fields {
                let field_mark = if f.correct { "✓" } else { "✗" };
                if f.correct {
                    println!("  {field_mark} {}: {}", f.field.label(category), f.expected);
                } else {
                    println!(
                        "  {field_mark} {}: {} (you: {})",
                        f.field.label(category),
                        f.expected,
                        if f.given.is_empty() { "-" } else { f.given.as_str() }
                    );
                }
            }
        }
        Grading::SelfMarked { shortcut } => {
            let note = match shortcut {
                Shortcut::Knew => "marked as known",
                Shortcut::DidNotKnow => "marked as not known",
            };
            println!("{mark} {note}");
            for (field, value) in &submission.truth.entries {
                println!("  {}: {}", field.label(category), value);
            }
        }
    }
    println!("  level {}/5", submission.proficiency.level);
}
