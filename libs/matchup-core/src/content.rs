//! Lesson content: the JSON contract and the plain-text pair format.
//!
//! # JSON
//! ```json
//! { "id": "greetings", "title": "Greetings", "game": "match_up",
//!   "pairs": [ { "id": 1, "question": "مرحبا", "answer": "Hello" } ] }
//! ```
//!
//! An unjumble lesson carries a `sentence` instead of `pairs`.
//!
//! # Plain text
//! ```text
//! ID: 1
//! Q: مرحبا
//! A: Hello
//!
//! Q: شكرا
//! A: Thank you
//! ```
//! Blocks without an `ID:` line get the next free number.

use crate::error::{ContentError, Result};
use crate::scoring::ScoringRule;
use crate::types::Pair;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Game family a lesson is played as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameKind {
    /// Match each question with its answer.
    #[default]
    MatchUp,
    /// Put the words of a sentence back in order.
    Unjumble,
}

/// A lesson as stored by the content system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lesson {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub game: GameKind,
    #[serde(default)]
    pub pairs: Vec<Pair>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentence: Option<String>,
}

impl Lesson {
    /// Pairs the board is built from.
    pub fn board_pairs(&self) -> Vec<Pair> {
        match (self.game, &self.sentence) {
            (GameKind::Unjumble, Some(sentence)) => unjumble_pairs(sentence),
            _ => self.pairs.clone(),
        }
    }

    pub fn scoring(&self) -> ScoringRule {
        match self.game {
            GameKind::MatchUp => ScoringRule::PairId,
            GameKind::Unjumble => ScoringRule::AnswerText,
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_pairs(&self.board_pairs())
    }
}

/// Parse and validate a lesson document.
pub fn parse_lesson_json(content: &str) -> Result<Lesson> {
    let mut lesson: Lesson = serde_json::from_str(content)?;
    for pair in &mut lesson.pairs {
        pair.question = pair.question.trim().to_string();
        pair.answer = pair.answer.trim().to_string();
    }
    lesson.validate()?;
    Ok(lesson)
}

/// Reject repeated ids and blank text. An empty list is valid.
pub fn validate_pairs(pairs: &[Pair]) -> Result<()> {
    let mut seen = HashSet::new();
    for pair in pairs {
        if !seen.insert(&pair.id) {
            return Err(ContentError::DuplicateId {
                id: pair.id.clone(),
            });
        }
        if pair.question.trim().is_empty() {
            return Err(ContentError::EmptyField {
                id: pair.id.clone(),
                field: "question",
            });
        }
        if pair.answer.trim().is_empty() {
            return Err(ContentError::EmptyField {
                id: pair.id.clone(),
                field: "answer",
            });
        }
    }
    Ok(())
}

/// One pair per word: slot `n` expects the `n`-th word.
pub fn unjumble_pairs(sentence: &str) -> Vec<Pair> {
    sentence
        .split_whitespace()
        .enumerate()
        .map(|(i, word)| {
            let position = i as i64 + 1;
            Pair::new(position, position.to_string(), word)
        })
        .collect()
}

/// Parse the plain-text `ID:` / `Q:` / `A:` format.
pub fn parse_pairs_markdown(content: &str) -> Result<Vec<Pair>> {
    let mut parser = Parser::default();
    for (idx, line) in content.lines().enumerate() {
        parser.process_line(line, idx + 1)?;
    }
    let drafts = parser.finish()?;

    // Auto ids continue after the largest explicit one.
    let highest = drafts
        .iter()
        .filter_map(|d| d.id.map(|id| (id, d.line)))
        .max_by_key(|(id, _)| *id);
    let mut next_id = highest.map_or(Some(1), |(id, _)| id.checked_add(1));

    let mut pairs = Vec::with_capacity(drafts.len());
    for draft in drafts {
        let id = match draft.id {
            Some(id) => id,
            None => {
                let Some(id) = next_id else {
                    let (max, line) = highest.unwrap_or((i64::MAX, draft.line));
                    return Err(ContentError::InvalidId {
                        line,
                        value: max.to_string(),
                    });
                };
                next_id = id.checked_add(1);
                id
            }
        };
        pairs.push(Pair::new(id, draft.question, draft.answer));
    }

    validate_pairs(&pairs)?;
    Ok(pairs)
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Field {
    Question,
    Answer,
}

struct PairDraft {
    id: Option<i64>,
    line: usize,
    question: String,
    answer: String,
}

#[derive(Default)]
struct DraftBuilder {
    id: Option<i64>,
    question: Option<String>,
    answer: Option<String>,
    start_line: usize,
}

impl DraftBuilder {
    fn new(start_line: usize) -> Self {
        Self {
            start_line,
            ..Self::default()
        }
    }

    fn build(self) -> Result<PairDraft> {
        let question = self.question.ok_or(ContentError::MissingQuestion {
            line: self.start_line,
        })?;
        let answer = self.answer.ok_or(ContentError::MissingAnswer {
            line: self.start_line,
        })?;
        Ok(PairDraft {
            id: self.id,
            line: self.start_line,
            question: question.trim().to_string(),
            answer: answer.trim().to_string(),
        })
    }
}

#[derive(Default)]
struct Parser {
    current: Option<DraftBuilder>,
    field: Option<Field>,
    buffer: Vec<String>,
    done: Vec<PairDraft>,
}

impl Parser {
    fn process_line(&mut self, line: &str, line_num: usize) -> Result<()> {
        let trimmed = line.trim();
        if let Some(rest) = trimmed.strip_prefix("ID:") {
            self.start_block(line_num)?;
            let rest = rest.trim();
            let id = rest.parse::<i64>().map_err(|_| ContentError::InvalidId {
                line: line_num,
                value: rest.to_string(),
            })?;
            if let Some(current) = self.current.as_mut() {
                current.id = Some(id);
            }
        } else if let Some(rest) = trimmed.strip_prefix("Q:") {
            self.flush();
            let starts_new = self
                .current
                .as_ref()
                .map_or(true, |current| current.question.is_some());
            if starts_new {
                self.start_block(line_num)?;
            }
            self.field = Some(Field::Question);
            self.buffer.push(rest.trim().to_string());
        } else if let Some(rest) = trimmed.strip_prefix("A:") {
            self.flush();
            if self.current.is_none() {
                self.current = Some(DraftBuilder::new(line_num));
            }
            self.field = Some(Field::Answer);
            self.buffer.push(rest.trim().to_string());
        } else if self.field.is_some() {
            self.buffer.push(line.to_string());
        }
        Ok(())
    }

    /// Close the open block (if any) and open a fresh one.
    fn start_block(&mut self, line_num: usize) -> Result<()> {
        self.flush();
        if let Some(current) = self.current.take() {
            self.done.push(current.build()?);
        }
        self.current = Some(DraftBuilder::new(line_num));
        Ok(())
    }

    fn flush(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        let text = self.buffer.join("\n");
        self.buffer.clear();
        if let Some(current) = self.current.as_mut() {
            match self.field {
                Some(Field::Question) => current.question = Some(text),
                Some(Field::Answer) => current.answer = Some(text),
                None => {}
            }
        }
        self.field = None;
    }

    fn finish(mut self) -> Result<Vec<PairDraft>> {
        self.flush();
        if let Some(current) = self.current.take() {
            self.done.push(current.build()?);
        }
        Ok(self.done)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PairId;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_match_up_lesson() {
        let json = r#"{
            "id": "colors",
            "title": "الألوان",
            "pairs": [
                { "id": 1, "question": " أحمر ", "answer": "red" },
                { "id": "b", "question": "أزرق", "answer": "blue" }
            ]
        }"#;
        let lesson = parse_lesson_json(json).unwrap();
        assert_eq!(lesson.game, GameKind::MatchUp);
        assert_eq!(lesson.pairs[0].question, "أحمر");
        assert_eq!(lesson.pairs[1].id, PairId::from("b"));
        assert_eq!(lesson.scoring(), ScoringRule::PairId);
    }

    #[test]
    fn empty_lesson_is_valid() {
        let lesson = parse_lesson_json(r#"{ "id": "x", "title": "Empty" }"#).unwrap();
        assert!(lesson.board_pairs().is_empty());
    }

    #[test]
    fn reject_duplicate_ids() {
        let json = r#"{ "id": "x", "title": "t", "pairs": [
            { "id": 1, "question": "a", "answer": "b" },
            { "id": 1, "question": "c", "answer": "d" } ] }"#;
        assert!(matches!(
            parse_lesson_json(json),
            Err(ContentError::DuplicateId { id: PairId::Number(1) })
        ));
    }

    #[test]
    fn reject_blank_answer() {
        let json = r#"{ "id": "x", "title": "t", "pairs": [
            { "id": 1, "question": "a", "answer": "   " } ] }"#;
        assert!(matches!(
            parse_lesson_json(json),
            Err(ContentError::EmptyField { field: "answer", .. })
        ));
    }

    #[test]
    fn reject_malformed_json() {
        assert!(matches!(
            parse_lesson_json("{ not json"),
            Err(ContentError::Json(_))
        ));
    }

    #[test]
    fn unjumble_lesson_builds_word_slots() {
        let json = r#"{ "id": "s", "title": "Sentence", "game": "unjumble",
                        "sentence": "أنا  أحب القهوة" }"#;
        let lesson = parse_lesson_json(json).unwrap();
        let pairs = lesson.board_pairs();
        assert_eq!(pairs.len(), 3);
        assert_eq!(pairs[0], Pair::new(1, "1", "أنا"));
        assert_eq!(pairs[2].answer, "القهوة");
        assert_eq!(lesson.scoring(), ScoringRule::AnswerText);
    }

    #[test]
    fn parse_markdown_blocks() {
        let input = "ID: 3\nQ: كتاب\nA: book\n\nQ: قلم\nA: pen\nfountain kind\n\nID: 7\nQ: باب\nA: door";
        let pairs = parse_pairs_markdown(input).unwrap();
        assert_eq!(
            pairs,
            vec![
                Pair::new(3, "كتاب", "book"),
                Pair::new(8, "قلم", "pen\nfountain kind"),
                Pair::new(7, "باب", "door"),
            ]
        );
    }

    #[test]
    fn markdown_missing_answer() {
        assert!(matches!(
            parse_pairs_markdown("Q: only a question\n\nQ: another\nA: fine"),
            Err(ContentError::MissingAnswer { line: 1 })
        ));
    }

    #[test]
    fn markdown_invalid_id() {
        assert!(matches!(
            parse_pairs_markdown("ID: abc\nQ: q\nA: a"),
            Err(ContentError::InvalidId { line: 1, .. })
        ));
    }

    #[test]
    fn markdown_max_id_without_room_for_auto_ids() {
        let input = "ID: 9223372036854775807\nQ: q\nA: a\n\nQ: next\nA: b";
        assert!(matches!(
            parse_pairs_markdown(input),
            Err(ContentError::InvalidId { line: 1, .. })
        ));
    }

    #[test]
    fn markdown_max_id_alone_is_fine() {
        let pairs = parse_pairs_markdown("ID: 9223372036854775807\nQ: q\nA: a").unwrap();
        assert_eq!(pairs, vec![Pair::new(i64::MAX, "q", "a")]);
    }

    #[test]
    fn markdown_duplicate_id() {
        assert!(matches!(
            parse_pairs_markdown("ID: 1\nQ: a\nA: b\nID: 1\nQ: c\nA: d"),
            Err(ContentError::DuplicateId { .. })
        ));
    }

    #[test]
    fn markdown_empty_input() {
        assert!(parse_pairs_markdown("").unwrap().is_empty());
    }
}
