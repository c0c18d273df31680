//! Directory-backed lesson storage.
//!
//! Each lesson is a JSON document at `<dir>/<lesson id>.json`. A plain-text
//! pairs file at `<dir>/<lesson id>.md` is read as a match-up lesson titled
//! after its id; the JSON document wins when both exist.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use matchup_core::{parse_lesson_json, parse_pairs_markdown, GameKind, Lesson};
use sha2::{Digest, Sha256};

use crate::error::{ApiError, Result};
use crate::models::{LessonSummary, SaveLessonResponse};

/// Lesson store over a directory of lesson files.
pub struct LessonStore {
    dir: PathBuf,
}

impl LessonStore {
    /// Open the store, creating the directory if needed.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    /// Summaries of every readable lesson, sorted by id.
    ///
    /// Files that fail to parse are skipped with a warning.
    pub async fn list(&self) -> Result<Vec<LessonSummary>> {
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        let mut lessons = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let Some(format) = LessonFormat::of(&path) else {
                continue;
            };
            if format == LessonFormat::Markdown
                && tokio::fs::try_exists(path.with_extension("json")).await?
            {
                continue;
            }

            let content = tokio::fs::read_to_string(&path).await?;
            let lesson = match format.parse(&path, &content) {
                Ok(lesson) => lesson,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping unreadable lesson");
                    continue;
                }
            };
            let modified = entry.metadata().await?.modified()?;

            lessons.push(LessonSummary {
                pair_count: lesson.board_pairs().len(),
                id: lesson.id,
                title: lesson.title,
                game: lesson.game,
                updated_at: DateTime::<Utc>::from(modified),
            });
        }

        lessons.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(lessons)
    }

    /// Load a lesson by id.
    pub async fn load(&self, id: &str) -> Result<Option<Lesson>> {
        let json = self.path_for(id)?;
        for path in [json.clone(), json.with_extension("md")] {
            let Some(format) = LessonFormat::of(&path) else {
                continue;
            };
            match tokio::fs::read_to_string(&path).await {
                Ok(content) => return Ok(Some(format.parse(&path, &content)?)),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(None)
    }

    /// Validate and write a lesson, replacing any previous version.
    pub async fn save(&self, lesson: &Lesson) -> Result<SaveLessonResponse> {
        lesson.validate()?;
        let path = self.path_for(&lesson.id)?;
        let content = serde_json::to_string_pretty(lesson)
            .map_err(|e| ApiError::Internal(format!("Failed to encode lesson: {}", e)))?;

        tokio::fs::write(&path, &content).await?;
        tracing::info!(lesson = %lesson.id, "lesson saved");

        Ok(SaveLessonResponse {
            id: lesson.id.clone(),
            revision: hash_content(&content),
            updated_at: Utc::now(),
        })
    }

    fn path_for(&self, id: &str) -> Result<PathBuf> {
        if !is_valid_lesson_id(id) {
            return Err(ApiError::BadRequest(format!("Invalid lesson id: {}", id)));
        }
        Ok(self.dir.join(format!("{}.json", id)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LessonFormat {
    Json,
    Markdown,
}

impl LessonFormat {
    fn of(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Some(Self::Json),
            Some("md") => Some(Self::Markdown),
            _ => None,
        }
    }

    fn parse(self, path: &Path, content: &str) -> matchup_core::Result<Lesson> {
        match self {
            Self::Json => parse_lesson_json(content),
            Self::Markdown => {
                let id = path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or_default()
                    .to_string();
                Ok(Lesson {
                    title: id.clone(),
                    id,
                    game: GameKind::MatchUp,
                    pairs: parse_pairs_markdown(content)?,
                    sentence: None,
                })
            }
        }
    }
}

/// Lesson ids double as file names.
pub fn is_valid_lesson_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= 128
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Compute SHA-256 hash of content.
pub fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}
