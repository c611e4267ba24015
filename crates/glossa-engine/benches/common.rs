// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
#[allow(dead_code)]
pub fn generate_analysis_json(sentences: usize, tokens_per_sentence: usize) -> String {
    let mut json = String::from(r#"{"rtl": false, "language": "Spanish", "analysis": ["#);
    for s in 0..sentences {
        if s > 0 {
            json.push_str(", ");
        }
        json.push_str(r#"{"original_sentence": "Una frase de prueba.", "translation": "A test sentence.", "tokens": ["#);
        for t in 0..tokens_per_sentence {
            if t > 0 {
                json.push_str(", ");
            }
            json.push_str(&format!(
                r#"{{"original": "palabra{t}", "translation": "word{t}", "part_of_speech": "noun"}}"#
            ));
        }
        json.push_str(r#"], "syntax": [], "grammatical_notes": ["Notes."]}"#);
    }
    json.push_str("]}");
    json
}

/// Splits `text` into pieces of roughly `size` bytes on char boundaries.
#[allow(dead_code)]
pub fn chunk(text: &str, size: usize) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    while start < text.len() {
        let mut end = (start + size).min(text.len());
        while !text.is_char_boundary(end) {
            end += 1;
        }
        pieces.push(&text[start..end]);
        start = end;
    }
    pieces
}
