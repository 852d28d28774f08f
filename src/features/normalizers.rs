use deunicode::deunicode;
use regex::Regex;

/// Trim and collapse whitespace. Absent, empty and whitespace-only headlines
/// all come back as `None`.
pub fn clean_headline(headline: Option<&str>) -> Option<String> {
    let collapsed = headline?.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed)
    }
}

/// Lowercased ASCII form used by the lexical pattern sets.
pub fn normalize_for_matching(text: &str) -> String {
    lazy_static::lazy_static! {
        static ref URL_RE: Regex = Regex::new(r"https?://\S+").unwrap();
    }

    // 1) lowercase for consistency
    let lower = text.to_lowercase();

    // 2) remove URLs (they are noise)
    let no_url = URL_RE.replace_all(&lower, "");

    // 3) deunicode (é -> e, ’ -> ')
    let ascii = deunicode(&no_url);

    // 4) collapse multiple whitespace
    ascii.split_whitespace().collect::<Vec<_>>().join(" ")
}
