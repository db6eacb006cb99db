use unicode_normalization::UnicodeNormalization;

/// Characters that are not allowed in file names on common filesystems.
const INVALID_FILENAME_CHARS: [char; 9] = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Normalize Unicode text to NFC form and clean up whitespace.
///
/// Accented characters scraped from different sites come in both
/// precomposed and combining forms; NFC makes them compare equal.
pub fn normalize_text(input: &str) -> String {
    let nfc: String = input.nfc().collect();

    nfc.lines()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Collapse multiple consecutive blank lines into a single blank line.
pub fn collapse_blank_lines(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut prev_blank = false;

    for line in input.lines() {
        let is_blank = line.trim().is_empty();
        if is_blank && prev_blank {
            continue;
        }
        if !result.is_empty() {
            result.push('\n');
        }
        result.push_str(line);
        prev_blank = is_blank;
    }

    result
}

/// Replace characters that are invalid in file names with `_`.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| if INVALID_FILENAME_CHARS.contains(&c) { '_' } else { c })
        .collect()
}

/// Make a single path component out of a heading, replacing only path separators.
///
/// Album headings keep their quotes and colons so directory names match the page.
pub fn sanitize_path_component(name: &str) -> String {
    name.chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect()
}

/// File name for a song title: spaces become `_`, invalid characters are replaced.
pub fn title_filename(title: &str) -> String {
    format!("{}.txt", sanitize_filename(&title.replace(' ', "_")))
}
