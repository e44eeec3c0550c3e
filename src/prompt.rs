//! Yes/no questions for the operator.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

/// Answers yes/no questions.
pub trait Confirm {
    /// Ask `question`; `true` means yes.
    ///
    /// # Errors
    /// Returns an I/O error if the answer cannot be read.
    fn confirm(&mut self, question: &str) -> io::Result<bool>;
}

/// Interpret one line of operator input.
#[must_use]
pub fn parse_answer(input: &str) -> Option<bool> {
    match input.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

/// Reads answers from a line-oriented reader, re-asking until the answer
/// is yes or no.
pub struct LineConfirm<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LineConfirm<R, W> {
    #[must_use]
    pub const fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

/// The terminal: questions on stdout, answers from stdin.
pub type StdinConfirm = LineConfirm<io::StdinLock<'static>, io::Stdout>;

impl StdinConfirm {
    #[must_use]
    pub fn stdin() -> Self {
        LineConfirm::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Confirm for LineConfirm<R, W> {
    fn confirm(&mut self, question: &str) -> io::Result<bool> {
        loop {
            write!(self.output, "{question} ")?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "input closed while waiting for an answer",
                ));
            }
            if let Some(answer) = parse_answer(&line) {
                return Ok(answer);
            }
            writeln!(self.output, "Please answer y or n.")?;
        }
    }
}

/// Fixed answers, for non-interactive runs and tests.
#[derive(Debug, Default)]
pub struct ScriptedConfirm {
    answers: VecDeque<bool>,
    /// Questions asked so far.
    pub asked: Vec<String>,
}

impl ScriptedConfirm {
    #[must_use]
    pub fn new(answers: impl IntoIterator<Item = bool>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            asked: Vec::new(),
        }
    }
}

impl Confirm for ScriptedConfirm {
    fn confirm(&mut self, question: &str) -> io::Result<bool> {
        self.asked.push(question.to_owned());
        self.answers.pop_front().ok_or_else(|| {
            io::Error::new(io::ErrorKind::UnexpectedEof, "no scripted answer left")
        })
    }
}
