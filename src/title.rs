use std::sync::OnceLock;

use regex::Regex;

pub const MAX_TITLE_CHARS: usize = 50;

/// Ordered: the first keyword found in the message wins.
pub const BIO_TOPICS: &[(&str, &str)] = &[
    ("crispr", "CRISPR Analysis"),
    ("blast", "BLAST Search"),
    ("alignment", "Sequence Alignment"),
    ("phylogen", "Phylogenetic Analysis"),
    ("primer", "Primer Design"),
    ("pcr", "PCR Setup"),
    ("variant", "Variant Analysis"),
    ("mutation", "Mutation Analysis"),
    ("expression", "Gene Expression"),
    ("genome", "Genome Analysis"),
    ("protein", "Protein Analysis"),
    ("rna", "RNA Analysis"),
    ("dna", "DNA Sequence Analysis"),
    ("fasta", "Sequence File Analysis"),
    ("fastq", "Sequence File Analysis"),
    ("gene", "Gene Analysis"),
    ("sequence", "Sequence Analysis"),
];

pub const PROGRAMMING_TOPICS: &[(&str, &str)] = &[
    ("python", "Python Help"),
    ("javascript", "JavaScript Help"),
    ("typescript", "TypeScript Help"),
    ("rust", "Rust Help"),
    ("pandas", "Data Analysis Help"),
    ("numpy", "Data Analysis Help"),
    ("script", "Scripting Help"),
    ("code", "Coding Help"),
    ("debug", "Debugging Help"),
    ("function", "Coding Help"),
    ("algorithm", "Algorithm Help"),
];

pub const STOP_WORDS: &[&str] = &[
    "this", "that", "with", "from", "what", "when", "where", "which", "would",
    "could", "should", "about", "have", "will", "your", "please", "help",
    "lets", "analyze", "tell", "show", "give", "need", "want", "like",
];

fn word_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[A-Za-z][A-Za-z0-9']*").unwrap())
}

/// Derive a short session title from the first user message.
///
/// Precedence: bioinformatics topic > programming topic > first meaningful
/// words > raw truncation. Deterministic for a given message and keyword
/// tables; output never exceeds `MAX_TITLE_CHARS` display characters.
pub fn generate_title(message: &str) -> String {
    let lower = message.to_lowercase();

    for (keyword, title) in BIO_TOPICS {
        if lower.contains(keyword) {
            return truncate_title(title);
        }
    }

    for (keyword, title) in PROGRAMMING_TOPICS {
        if lower.contains(keyword) {
            return truncate_title(title);
        }
    }

    let meaningful: Vec<String> = word_pattern()
        .find_iter(message)
        .map(|m| m.as_str().to_string())
        .filter(|w| w.len() > 3 && !STOP_WORDS.contains(&w.to_lowercase().as_str()))
        .take(2)
        .collect();

    if !meaningful.is_empty() {
        let joined = meaningful
            .iter()
            .map(|w| capitalize(w))
            .collect::<Vec<_>>()
            .join(" ");
        return truncate_title(&joined);
    }

    let trimmed = message.trim();
    if trimmed.is_empty() {
        return "New Conversation".to_string();
    }
    truncate_title(trimmed)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

fn truncate_title(title: &str) -> String {
    if title.chars().count() <= MAX_TITLE_CHARS {
        title.to_string()
    } else {
        let head: String = title.chars().take(MAX_TITLE_CHARS - 3).collect();
        format!("{}...", head)
    }
}
