use tailview::tail::{classify, Category, ClassifiedLine};

#[test]
fn test_keywords_are_case_insensitive() {
    assert_eq!(classify("ERROR disk full"), Category::Error);
    assert_eq!(classify("an Error occurred"), Category::Error);
    assert_eq!(classify("WARN: low memory"), Category::Warning);
    assert_eq!(classify("Info: started"), Category::Info);
}

#[test]
fn test_substring_matches_count() {
    assert_eq!(classify("errors=0"), Category::Error);
    assert_eq!(classify("warning: deprecated"), Category::Warning);
    assert_eq!(classify("information only"), Category::Info);
}

#[test]
fn test_error_beats_warning_beats_info() {
    assert_eq!(classify("warn: retrying after error"), Category::Error);
    assert_eq!(classify("info: warn threshold reached"), Category::Warning);
}

#[test]
fn test_no_keyword_is_other() {
    assert_eq!(classify("GET /index.html 200"), Category::Other);
    assert_eq!(classify(""), Category::Other);
}

#[test]
fn test_classified_line_carries_category() {
    let line = ClassifiedLine::new(5, "warn: low memory");
    assert_eq!(line.sequence, 5);
    assert_eq!(line.category, Category::Warning);
    assert_eq!(line.text, "warn: low memory");
}

#[test]
fn test_category_display_and_label() {
    assert_eq!(Category::Warning.to_string(), "warning");
    assert_eq!(Category::Warning.label(), "WARN");
    assert_eq!(Category::Other.label(), "-");
}
