use biochat::title::{generate_title, MAX_TITLE_CHARS};

#[test]
fn test_bio_keyword_wins() {
    let title = generate_title("Let's analyze this DNA sequence for CRISPR targets");
    assert_eq!(title, "CRISPR Analysis");
}

#[test]
fn test_deterministic_across_runs() {
    let message = "Let's analyze this DNA sequence for CRISPR targets";
    let first = generate_title(message);
    for _ in 0..10 {
        assert_eq!(generate_title(message), first);
    }
    assert!(!first.is_empty());
    assert!(first.chars().count() <= MAX_TITLE_CHARS);
}

#[test]
fn test_bio_beats_programming() {
    let title = generate_title("Write a python script to parse this FASTA file");
    assert_eq!(title, "Sequence File Analysis");
}

#[test]
fn test_programming_keyword() {
    let title = generate_title("Can you fix my python loop?");
    assert_eq!(title, "Python Help");
}

#[test]
fn test_meaningful_word_fallback() {
    let title = generate_title("hello there friend");
    assert_eq!(title, "Hello There");
}

#[test]
fn test_stop_words_are_skipped() {
    // "what", "about", "this" are stop words; short words are skipped too.
    let title = generate_title("what about this weather today");
    assert_eq!(title, "Weather Today");
}

#[test]
fn test_short_message_raw() {
    assert_eq!(generate_title("hi ok"), "hi ok");
}

#[test]
fn test_empty_message() {
    assert_eq!(generate_title("   "), "New Conversation");
}

#[test]
fn test_long_title_truncated_with_ellipsis() {
    let word = "z".repeat(80);
    let title = generate_title(&word);
    assert_eq!(title.chars().count(), MAX_TITLE_CHARS);
    assert!(title.ends_with("..."));
}
