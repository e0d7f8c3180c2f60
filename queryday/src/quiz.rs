//! Line-oriented quiz over stdin.

use anyhow::Result;
use queryday_core::quiz::{generate_questions, QuizError, QuizRun};
use queryday_core::session::current_year;
use queryday_core::{CoreFacts, Session};
use rand::Rng;
use std::io::{self, BufRead, Write};

/// Ask every question, reading answers `1`-`4` one per line.
///
/// `q` quits early; end of input does the same.
pub fn run_interactive<R: Rng>(session: &Session, core: &CoreFacts, rng: &mut R) -> Result<()> {
    let questions = generate_questions(session.date, core, current_year(), rng);
    let mut run = QuizRun::new(questions);

    println!("=== Origin Quiz :: {} ===", session.date.us_format());
    println!("Answer with the option number, or `q` to quit.");

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut lines = stdin.lock().lines();

    while let Some(question) = run.current_question().cloned() {
        println!();
        println!("[{}%] {}", run.progress_percent(), question.prompt());
        for (i, option) in question.options().iter().enumerate() {
            println!("  {}. {option}", i + 1);
        }
        print!("> ");
        stdout.flush().ok();

        let Some(line) = lines.next() else {
            println!();
            break;
        };
        let line = line?;
        let line = line.trim();
        if line.eq_ignore_ascii_case("q") {
            break;
        }

        let Some(choice) = line.parse::<usize>().ok().and_then(|n| n.checked_sub(1)) else {
            println!("[ERROR] Enter a number between 1 and {}.", question.options().len());
            continue;
        };

        match run.answer(choice) {
            Ok(outcome) if outcome.correct => println!("Correct!"),
            Ok(_) => println!("Wrong. The answer was: {}", question.correct_answer()),
            Err(QuizError::InvalidChoice { options, .. }) => {
                println!("[ERROR] Enter a number between 1 and {options}.")
            }
            Err(QuizError::Finished) => break,
        }
    }

    println!();
    println!("Score: {} / {}", run.score(), run.total());
    if run.is_finished() {
        println!("{}", run.verdict());
    }
    Ok(())
}
