use anyhow::{Context, Result};
use dialoguer::{Input, Select};
use rand::seq::SliceRandom;
use serde::Serialize;

use crate::config::Config;
use crate::speech::{self, SpeechSynthesizer};
use crate::word::{WordItem, WordProgressPayload, WordTag};

pub struct StudyContext<'a> {
    pub config: &'a Config,
    pub speech: Option<&'a dyn SpeechSynthesizer>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StudyOptions {
    pub shuffle: bool,
    pub limit: Option<usize>,
}

/// The learner's verdict on a single word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Correct,
    Missed,
    Easy,
    Skip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Choice {
    Answer(Answer),
    PronounceAgain,
    Quit,
}

const CHOICES: [(&str, Choice); 6] = [
    ("Got it", Choice::Answer(Answer::Correct)),
    ("Missed it", Choice::Answer(Answer::Missed)),
    ("Mark as easy", Choice::Answer(Answer::Easy)),
    ("Skip this word", Choice::Answer(Answer::Skip)),
    ("Pronounce again", Choice::PronounceAgain),
    ("Quit session", Choice::Quit),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaggedWord {
    pub word: String,
    pub tag: WordTag,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionReport {
    pub asked: usize,
    pub correct: usize,
    pub missed: usize,
    pub progress: Vec<WordProgressPayload>,
    pub tags: Vec<TaggedWord>,
}

impl SessionReport {
    pub fn record(&mut self, item: &WordItem, answer: Answer, progress: Option<WordProgressPayload>) {
        self.asked += 1;
        match answer {
            Answer::Correct => self.correct += 1,
            Answer::Missed => self.missed += 1,
            Answer::Easy | Answer::Skip => {
                if let Some(tag) = item.tag {
                    self.tags.push(TaggedWord {
                        word: item.word.clone(),
                        tag,
                    });
                }
            }
        }
        self.progress.extend(progress);
    }
}

/// Update `item` for `answer`, returning a progress snapshot when its count changed.
pub fn apply_answer(item: &mut WordItem, answer: Answer) -> Option<WordProgressPayload> {
    match answer {
        Answer::Correct => {
            let count = item.correct_count.unwrap_or(0).saturating_add(1);
            item.correct_count = Some(count);
            Some(item.progress())
        }
        Answer::Missed => None,
        Answer::Easy => {
            item.tag = Some(WordTag::Easy);
            None
        }
        Answer::Skip => {
            item.tag = Some(WordTag::Skip);
            None
        }
    }
}

/// Indices of the words to ask, honouring tags, shuffle and limit.
///
/// Parsed lists never carry tags, so tags set with "Mark as easy" or
/// "Skip this word" only last for the session and the progress report.
/// The filter matters for records built elsewhere with a tag already set.
pub fn select_words(words: &[WordItem], options: StudyOptions) -> Vec<usize> {
    let mut order: Vec<usize> = words
        .iter()
        .enumerate()
        .filter(|(_, item)| !item.is_retired())
        .map(|(idx, _)| idx)
        .collect();

    if options.shuffle {
        order.shuffle(&mut rand::rng());
    }
    if let Some(limit) = options.limit {
        order.truncate(limit);
    }

    order
}

pub fn run_study_session(
    words: &mut [WordItem],
    options: StudyOptions,
    ctx: &StudyContext<'_>,
) -> Result<SessionReport> {
    let order = select_words(words, options);
    let mut report = SessionReport::default();

    if order.is_empty() {
        tracing::warn!("No words left to study.");
        return Ok(report);
    }

    let total = order.len();
    'words: for (position, idx) in order.into_iter().enumerate() {
        let item = &mut words[idx];
        println!();
        println!("[{}/{}] {}", position + 1, total, item.word);
        pronounce(ctx, &item.word);

        Input::<String>::new()
            .with_prompt("Press Enter to reveal the meaning")
            .allow_empty(true)
            .interact_text()
            .context("failed to read input")?;
        println!("  Meaning: {}", item.meaning);

        loop {
            match prompt_choice()? {
                Choice::Answer(answer) => {
                    let progress = apply_answer(item, answer);
                    report.record(item, answer, progress);
                    break;
                }
                Choice::PronounceAgain => pronounce(ctx, &item.word),
                Choice::Quit => {
                    tracing::info!("Exiting study session.");
                    break 'words;
                }
            }
        }
    }

    if let Some(synth) = ctx.speech {
        if let Err(e) = synth.cancel() {
            tracing::warn!("Failed to stop speech: {}", e);
        }
    }

    Ok(report)
}

pub fn print_summary(report: &SessionReport) {
    println!();
    println!(
        "Asked {} word(s): {} correct, {} missed, {} tagged.",
        report.asked,
        report.correct,
        report.missed,
        report.tags.len()
    );
}

fn pronounce(ctx: &StudyContext<'_>, text: &str) {
    if !ctx.config.speech_enabled {
        return;
    }

    if let Err(e) = speech::speak(
        ctx.speech,
        text,
        &ctx.config.speech_lang,
        ctx.config.speech_rate,
    ) {
        tracing::warn!("Failed to pronounce '{}': {}", text, e);
    }
}

fn prompt_choice() -> Result<Choice> {
    let labels: Vec<&str> = CHOICES.iter().map(|(label, _)| *label).collect();
    let selection = Select::new()
        .with_prompt("How did it go?")
        .items(&labels)
        .default(0)
        .interact()
        .context("failed to read answer")?;

    Ok(choice_at(selection))
}

fn choice_at(index: usize) -> Choice {
    CHOICES
        .get(index)
        .map(|(_, choice)| *choice)
        .unwrap_or(Choice::Quit)
}
