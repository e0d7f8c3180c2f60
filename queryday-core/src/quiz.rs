//! The ten-question origin quiz built from a session's core facts.

use crate::facts::CoreFacts;
use crate::session::BirthDate;
use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;

pub const QUESTION_COUNT: usize = 10;

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const EVENT_PREVIEW_CHARS: usize = 60;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuizError {
    #[error("The quiz is already finished")]
    Finished,

    #[error("Choice {choice} is out of range (1..={options})")]
    InvalidChoice { choice: usize, options: usize },
}

/// A multiple-choice question.
///
/// Only built through [`Question::shuffled`], so `correct_index` always
/// points into `options`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    prompt: String,
    options: Vec<String>,
    correct_index: usize,
}

impl Question {
    /// Shuffle the correct answer in among the distractors.
    pub fn shuffled<R: Rng + ?Sized>(
        prompt: impl Into<String>,
        correct: impl Into<String>,
        wrongs: Vec<String>,
        rng: &mut R,
    ) -> Self {
        let mut tagged: Vec<(bool, String)> = std::iter::once((true, correct.into()))
            .chain(wrongs.into_iter().map(|w| (false, w)))
            .collect();
        tagged.shuffle(rng);

        let correct_index = tagged.iter().position(|(is_correct, _)| *is_correct).unwrap_or(0);
        Self {
            prompt: prompt.into(),
            options: tagged.into_iter().map(|(_, text)| text).collect(),
            correct_index,
        }
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// Index into [`options`](Self::options) of the right answer.
    pub fn correct_index(&self) -> usize {
        self.correct_index
    }

    pub fn correct_answer(&self) -> &str {
        self.options
            .get(self.correct_index)
            .map(String::as_str)
            .unwrap_or_default()
    }
}

fn strings<T: ToString>(values: &[T]) -> Vec<String> {
    values.iter().map(ToString::to_string).collect()
}

fn preview(text: &str) -> String {
    if text.chars().count() > EVENT_PREVIEW_CHARS {
        let truncated: String = text.chars().take(EVENT_PREVIEW_CHARS).collect();
        format!("{truncated}...")
    } else {
        text.to_string()
    }
}

/// Build the quiz for `date` from its core facts.
///
/// Weather and event questions are swapped for general time-travel trivia
/// when those facts are missing.
pub fn generate_questions<R: Rng + ?Sized>(
    date: BirthDate,
    core: &CoreFacts,
    current_year: i32,
    rng: &mut R,
) -> Vec<Question> {
    let year = date.year();
    let month = date.month() as usize;
    let day = date.day();
    let place = core.city.as_deref().unwrap_or("your location");
    let mut questions = Vec::with_capacity(QUESTION_COUNT);

    questions.push(Question::shuffled(
        "What is your origin year?",
        year.to_string(),
        strings(&[year - 1, year + 1, year + 10]),
        rng,
    ));

    questions.push(Question::shuffled(
        "What is your origin month?",
        MONTHS[month - 1],
        strings(&[
            MONTHS[(month + 2) % 12],
            MONTHS[(month + 5) % 12],
            MONTHS[(month + 8) % 12],
        ]),
        rng,
    ));

    questions.push(Question::shuffled(
        "What is your origin day?",
        day.to_string(),
        strings(&[(day + 5) % 30 + 1, (day + 10) % 30 + 1, (day + 15) % 30 + 1]),
        rng,
    ));

    questions.push(Question::shuffled(
        format!("If you travel 50 years into the future from {year}, what year is it?"),
        (year + 50).to_string(),
        strings(&[year + 25, year + 100, year + 10]),
        rng,
    ));

    questions.push(Question::shuffled(
        format!("If you travel 20 years into the past from {year}, what year is it?"),
        (year - 20).to_string(),
        strings(&[year - 10, year - 30, year - 5]),
        rng,
    ));

    match &core.weather_data {
        Some(weather) => {
            let max = weather.max_temp;
            questions.push(Question::shuffled(
                format!("What was the max temperature in {place} on your origin date?"),
                format!("{max}°C"),
                vec![
                    format!("{:.1}°C", max + 5.0),
                    format!("{:.1}°C", max - 5.0),
                    format!("{:.1}°C", max + 2.0),
                ],
                rng,
            ));

            let (rained, dry) = if weather.precip > 0.0 {
                ("Yes", "No")
            } else {
                ("No", "Yes")
            };
            questions.push(Question::shuffled(
                format!("Did it rain in {place} on your origin date?"),
                rained,
                strings(&[dry]),
                rng,
            ));
        }
        None => {
            questions.push(Question::shuffled(
                "Is time travel theoretically possible?",
                "Yes",
                strings(&["No", "Maybe", "Only backwards"]),
                rng,
            ));
            questions.push(Question::shuffled(
                "What is the fourth dimension?",
                "Time",
                strings(&["Space", "Gravity", "Love"]),
                rng,
            ));
        }
    }

    match core.events_data.first() {
        Some(event) => questions.push(Question::shuffled(
            "Which event happened on your birthday in history?",
            preview(&event.text),
            strings(&[
                "The internet was invented.",
                "Humans landed on Mars.",
                "The Great Wall of China was completed.",
            ]),
            rng,
        )),
        None => questions.push(Question::shuffled(
            "Who wrote 'The Time Machine'?",
            "H.G. Wells",
            strings(&["Jules Verne", "Isaac Asimov", "Stephen Hawking"]),
            rng,
        )),
    }

    let age = current_year - year;
    questions.push(Question::shuffled(
        format!("How many years have passed since your origin (as of {current_year})?"),
        age.to_string(),
        strings(&[age - 1, age + 1, age + 5]),
        rng,
    ));

    questions.push(Question::shuffled(
        "What is the speed of light?",
        "299,792 km/s",
        strings(&["100,000 km/s", "1,000 km/s", "Infinite"]),
        rng,
    ));

    questions
}

/// Closing message for a final score out of ten.
pub fn verdict(score: usize) -> &'static str {
    match score {
        8.. => "You are a true Time Lord!",
        5..=7 => "Not bad, Time Traveler.",
        _ => "The timeline is confusing, isn't it?",
    }
}

/// Result of answering one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub correct: bool,
    pub correct_index: usize,
    pub finished: bool,
}

/// Progress through a generated quiz.
#[derive(Debug, Clone)]
pub struct QuizRun {
    questions: Vec<Question>,
    current: usize,
    score: usize,
}

impl QuizRun {
    pub fn new(questions: Vec<Question>) -> Self {
        Self {
            questions,
            current: 0,
            score: 0,
        }
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current)
    }

    /// Answer the current question with a zero-based option index.
    pub fn answer(&mut self, choice: usize) -> Result<AnswerOutcome, QuizError> {
        let question = self.current_question().ok_or(QuizError::Finished)?;
        if choice >= question.options.len() {
            return Err(QuizError::InvalidChoice {
                choice: choice + 1,
                options: question.options.len(),
            });
        }

        let correct_index = question.correct_index;
        let correct = choice == correct_index;
        if correct {
            self.score += 1;
        }
        self.current += 1;

        Ok(AnswerOutcome {
            correct,
            correct_index,
            finished: self.is_finished(),
        })
    }

    /// Share of questions answered, 0-100.
    pub fn progress_percent(&self) -> u32 {
        if self.questions.is_empty() {
            return 100;
        }
        (self.current * 100 / self.questions.len()) as u32
    }

    pub fn is_finished(&self) -> bool {
        self.current >= self.questions.len()
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn total(&self) -> usize {
        self.questions.len()
    }

    pub fn verdict(&self) -> &'static str {
        verdict(self.score)
    }
}
