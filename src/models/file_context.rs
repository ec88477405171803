use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Upper bound on how many analyzed files are remembered across turns.
pub const MAX_FILE_CONTEXTS: usize = 3;

/// Extracted text kept per file; anything longer is cut off.
pub const MAX_CONTEXT_CONTENT_CHARS: usize = 4000;

/// Derived summary length cap.
pub const MAX_SUMMARY_CHARS: usize = 160;

/// Summarized memory of a previously analyzed file, carried across turns
/// so the backend can refer back to it without a re-upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileContext {
    pub filename: String,
    pub file_type: String,
    pub size: u64,
    pub timestamp: DateTime<Utc>,
    pub content: String,
    pub summary: String,
}

impl FileContext {
    /// Build a context entry from extracted file text, applying the
    /// content and summary bounds.
    pub fn new(filename: String, file_type: String, size: u64, content: &str) -> Self {
        let content = truncate_chars(content, MAX_CONTEXT_CONTENT_CHARS);
        let summary = derive_summary(&filename, &content);
        Self {
            filename,
            file_type,
            size,
            timestamp: Utc::now(),
            content,
            summary,
        }
    }
}

fn derive_summary(filename: &str, content: &str) -> String {
    let collapsed: String = content.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return format!("Uploaded file {}", filename);
    }
    truncate_chars(&collapsed, MAX_SUMMARY_CHARS)
}

fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        s.chars().take(max).collect()
    }
}

/// Bounded rolling window over the most recent file contexts. Oldest
/// entries are evicted first once the cap is reached.
#[derive(Debug, Clone, Default)]
pub struct FileContextTracker {
    entries: Vec<FileContext>,
}

impl FileContextTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, context: FileContext) {
        self.entries.push(context);
        while self.entries.len() > MAX_FILE_CONTEXTS {
            self.entries.remove(0);
        }
    }

    pub fn entries(&self) -> &[FileContext] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Snapshot for persisting alongside a session.
    pub fn snapshot(&self) -> Vec<FileContext> {
        self.entries.clone()
    }

    /// Restore a snapshot verbatim, re-applying the cap in case the
    /// persisted data predates it.
    pub fn restore(&mut self, entries: Vec<FileContext>) {
        self.entries = entries;
        while self.entries.len() > MAX_FILE_CONTEXTS {
            self.entries.remove(0);
        }
    }
}
