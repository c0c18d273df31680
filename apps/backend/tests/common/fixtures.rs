//! Test fixtures and factory functions for creating test data.

use serde_json::{json, Value};

use matchup_backend::models::{GameKind, Lesson};
use matchup_core::Pair;

/// Arabic vocabulary used by the sample lessons.
const VOCABULARY: &[(&str, &str)] = &[
    ("مرحبا", "Hello"),
    ("شكرا", "Thank you"),
    ("قطة", "Cat"),
    ("كتاب", "Book"),
    ("ماء", "Water"),
];

/// Match-up lesson with `num_pairs` pairs, ids starting at 1.
pub fn sample_lesson(id: &str, num_pairs: usize) -> Lesson {
    let pairs = VOCABULARY
        .iter()
        .cycle()
        .take(num_pairs)
        .enumerate()
        .map(|(i, (question, answer))| Pair::new(i as i64 + 1, *question, *answer))
        .collect();

    Lesson {
        id: id.to_string(),
        title: format!("Lesson {}", id),
        game: GameKind::MatchUp,
        pairs,
        sentence: None,
    }
}

pub fn empty_lesson(id: &str) -> Lesson {
    sample_lesson(id, 0)
}

pub fn unjumble_lesson(id: &str, sentence: &str) -> Lesson {
    Lesson {
        id: id.to_string(),
        title: format!("Unjumble {}", id),
        game: GameKind::Unjumble,
        pairs: Vec::new(),
        sentence: Some(sentence.to_string()),
    }
}

/// Session start body with a fixed seed.
pub fn start_request(lesson_id: &str, viewport_width: Option<f64>) -> Value {
    json!({
        "lesson_id": lesson_id,
        "viewport_width": viewport_width,
        "seed": 42,
    })
}

pub fn rect(left: f64, top: f64, width: f64, height: f64) -> Value {
    json!({ "left": left, "top": top, "width": width, "height": height })
}

pub fn point(x: f64, y: f64) -> Value {
    json!({ "x": x, "y": y })
}
