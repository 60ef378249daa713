use crate::{Difficulty, QuestionLevel};
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: u32,
    pub prompt: String,
    pub options: [String; 4],
    /// Index into `options`.
    pub correct: usize,
    pub level: QuestionLevel,
}

impl Question {
    /// Grades a chosen option; `None` means the player skipped.
    pub fn evaluate(&self, choice: Option<usize>) -> AnswerOutcome {
        match choice {
            None => AnswerOutcome::Skipped,
            Some(index) if index == self.correct => AnswerOutcome::Correct,
            Some(_) => AnswerOutcome::Wrong,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnswerOutcome {
    Correct,
    Wrong,
    Skipped,
}

/// Supplies questions that have not been asked yet.
pub trait QuestionSource {
    fn fetch_unused(&mut self, difficulty: Difficulty) -> Option<Question>;
}

/// Shows a question to the players and reports how they answered.
pub trait QuestionPresenter {
    fn present(&mut self, question: &Question) -> AnswerOutcome;
}

impl<F> QuestionPresenter for F
where
    F: FnMut(&Question) -> AnswerOutcome,
{
    fn present(&mut self, question: &Question) -> AnswerOutcome {
        self(question)
    }
}

/// In-memory source handing out every question once, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct QuestionBank {
    questions: Vec<Question>,
    used: HashSet<u32>,
}

impl QuestionBank {
    pub fn new(questions: Vec<Question>) -> Self {
        Self {
            questions,
            used: HashSet::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.questions
            .iter()
            .filter(|question| !self.used.contains(&question.id))
            .count()
    }

    /// Makes every question available again.
    pub fn reset(&mut self) {
        self.used.clear();
    }
}

impl QuestionSource for QuestionBank {
    fn fetch_unused(&mut self, _difficulty: Difficulty) -> Option<Question> {
        let question = self
            .questions
            .iter()
            .find(|question| !self.used.contains(&question.id))?
            .clone();
        self.used.insert(question.id);
        Some(question)
    }
}

/// Presenter replaying a fixed list of answers, skipping once it runs out.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPresenter {
    answers: VecDeque<AnswerOutcome>,
    asked: Vec<u32>,
}

impl ScriptedPresenter {
    pub fn new(answers: impl IntoIterator<Item = AnswerOutcome>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            asked: Vec::new(),
        }
    }

    /// Ids of the questions presented so far.
    pub fn asked(&self) -> &[u32] {
        &self.asked
    }
}

impl QuestionPresenter for ScriptedPresenter {
    fn present(&mut self, question: &Question) -> AnswerOutcome {
        self.asked.push(question.id);
        self.answers.pop_front().unwrap_or(AnswerOutcome::Skipped)
    }
}

#[cfg(test)]
pub(crate) fn sample_question(id: u32, level: QuestionLevel) -> Question {
    Question {
        id,
        prompt: format!("Question {id}"),
        options: ["a", "b", "c", "d"].map(String::from),
        correct: 2,
        level,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluate() {
        let question = sample_question(1, QuestionLevel::Easy);
        assert_eq!(question.evaluate(Some(2)), AnswerOutcome::Correct);
        assert_eq!(question.evaluate(Some(0)), AnswerOutcome::Wrong);
        assert_eq!(question.evaluate(None), AnswerOutcome::Skipped);
    }

    #[test]
    fn test_bank_hands_out_each_question_once() {
        let mut bank = QuestionBank::new(vec![
            sample_question(1, QuestionLevel::Easy),
            sample_question(2, QuestionLevel::Hard),
        ]);

        assert_eq!(bank.fetch_unused(Difficulty::Easy).map(|q| q.id), Some(1));
        assert_eq!(bank.fetch_unused(Difficulty::Easy).map(|q| q.id), Some(2));
        assert_eq!(bank.fetch_unused(Difficulty::Easy), None);
        assert_eq!(bank.remaining(), 0);

        bank.reset();
        assert_eq!(bank.remaining(), 2);
    }

    #[test]
    fn test_scripted_presenter() {
        let question = sample_question(7, QuestionLevel::Medium);
        let mut presenter = ScriptedPresenter::new([AnswerOutcome::Correct]);

        assert_eq!(presenter.present(&question), AnswerOutcome::Correct);
        assert_eq!(presenter.present(&question), AnswerOutcome::Skipped);
        assert_eq!(presenter.asked(), &[7, 7]);
    }

    #[test]
    fn test_closure_presenter() {
        let question = sample_question(3, QuestionLevel::Easy);
        let mut presenter = |q: &Question| q.evaluate(Some(0));
        assert_eq!(presenter.present(&question), AnswerOutcome::Wrong);
    }
}
