//! Note vault access.
//!
//! The engine never talks to the host's storage APIs directly; it goes
//! through the `NoteRepository` capability so the same core runs against a
//! plugin host, a plain directory of markdown files, or a mock in tests.
//! This module also owns the note ingestion rules: word counts, reading
//! time, tag extraction, and content previews sent to the analysis service.

use crate::models::NoteInput;
use chrono::{DateTime, Utc};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Characters of content shown in a note preview.
const PREVIEW_LENGTH: usize = 150;

/// Average reading speed used for the reading-time estimate, words/minute.
const READING_WORDS_PER_MINUTE: u64 = 200;

// ============================================================================
// Capability Trait
// ============================================================================

/// Host note-storage capability: enumerate, read, write, and open notes by
/// their stable path identifier.
pub trait NoteRepository {
    /// Gather up to `limit` notes as analysis inputs.
    fn collect_notes(&self, limit: usize) -> Result<Vec<NoteInput>, String>;

    fn read_note(&self, path: &str) -> Result<String, String>;

    fn write_note(&self, path: &str, content: &str) -> Result<(), String>;

    /// Open a note in a view; `split` requests a split pane.
    fn open_note(&self, path: &str, split: bool) -> Result<(), String>;
}

// ============================================================================
// Note Ingestion
// ============================================================================

/// Build the analysis payload for one note from its raw content.
pub fn note_input_from_content(
    path: &str,
    title: &str,
    content: &str,
    mtime: i64,
    ctime: i64,
) -> NoteInput {
    let word_count = content.split_whitespace().count() as u64;
    let reading_time = word_count.div_ceil(READING_WORDS_PER_MINUTE);

    // #tag style tags anywhere in the body.
    let tag_re = Regex::new(r"#([a-zA-Z0-9_-]+)").expect("tag regex is valid");
    let tags: Vec<String> = tag_re
        .captures_iter(content)
        .map(|c| c[1].to_string())
        .collect();

    let preview: String = content.chars().take(PREVIEW_LENGTH).collect();
    let mut content_preview = preview.replace('\n', " ");
    if content.chars().count() > PREVIEW_LENGTH {
        content_preview.push_str("...");
    }

    NoteInput {
        path: path.to_string(),
        title: title.to_string(),
        content: content.to_string(),
        mtime,
        ctime,
        word_count,
        reading_time,
        tags,
        content_preview,
    }
}

// ============================================================================
// Filesystem Repository
// ============================================================================

/// Repository over a plain directory of markdown files. Note identifiers
/// are directory-relative paths with forward slashes.
pub struct FsNoteRepository {
    notes_dir: PathBuf,
}

impl FsNoteRepository {
    pub fn new(notes_dir: impl Into<PathBuf>) -> Self {
        Self {
            notes_dir: notes_dir.into(),
        }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.notes_dir.join(path)
    }

    fn relative_id(&self, path: &Path) -> String {
        path.strip_prefix(&self.notes_dir)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/")
    }
}

fn timestamp_millis(time: std::io::Result<std::time::SystemTime>) -> i64 {
    time.ok()
        .map(|t| DateTime::<Utc>::from(t).timestamp_millis())
        .unwrap_or(0)
}

impl NoteRepository for FsNoteRepository {
    fn collect_notes(&self, limit: usize) -> Result<Vec<NoteInput>, String> {
        let mut paths: Vec<PathBuf> = WalkDir::new(&self.notes_dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| e.path().extension().map(|x| x == "md").unwrap_or(false))
            .map(|e| e.into_path())
            .collect();
        paths.sort();
        paths.truncate(limit);

        let mut notes = Vec::with_capacity(paths.len());
        for path in paths {
            let content = fs::read_to_string(&path)
                .map_err(|e| format!("Cannot read {}: {}", path.display(), e))?;
            let metadata = fs::metadata(&path)
                .map_err(|e| format!("Cannot stat {}: {}", path.display(), e))?;
            let mtime = timestamp_millis(metadata.modified());
            let ctime = timestamp_millis(metadata.created());

            let title = path
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default();
            let id = self.relative_id(&path);

            notes.push(note_input_from_content(&id, &title, &content, mtime, ctime));
        }
        Ok(notes)
    }

    fn read_note(&self, path: &str) -> Result<String, String> {
        fs::read_to_string(self.resolve(path)).map_err(|e| format!("Cannot read {}: {}", path, e))
    }

    fn write_note(&self, path: &str, content: &str) -> Result<(), String> {
        fs::write(self.resolve(path), content).map_err(|e| format!("Cannot write {}: {}", path, e))
    }

    fn open_note(&self, path: &str, split: bool) -> Result<(), String> {
        // A directory-backed vault has no panes; report where the note is.
        if split {
            println!("Open (split): {}", self.resolve(path).display());
        } else {
            println!("Open: {}", self.resolve(path).display());
        }
        Ok(())
    }
}
