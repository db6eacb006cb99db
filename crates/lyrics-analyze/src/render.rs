use lyrics_model::{emotion_color, LineAnalysis};

const BACKGROUND: &str = "#404040";

/// Render one song's analysed lines as a standalone HTML page.
///
/// Each line is colored by its top emotion with the prediction score as
/// opacity, so confident lines stand out and uncertain ones fade.
pub fn render_song_html(rows: &[LineAnalysis], song: &str) -> String {
    let mut body = String::new();
    for row in rows.iter().filter(|r| r.song == song) {
        let (color, opacity) = match row.top() {
            Some(top) => (emotion_color(&top.label), top.score.clamp(0.0, 1.0)),
            None => (emotion_color(""), 0.0),
        };
        body.push_str(&format!(
            "<p style=\"color: {color}; opacity: {opacity:.3}\">{}</p>\n",
            escape(row.lyric.trim())
        ));
    }

    format!(
        "<!DOCTYPE html>\n\
         <html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n\
         <style>\n\
         body {{ background: {BACKGROUND}; text-align: center; font-family: monospace; font-weight: bold; font-size: 10pt; }}\n\
         p {{ margin: 0.4em 0; }}\n\
         </style>\n</head>\n<body>\n{body}</body>\n</html>\n",
        title = escape(song),
    )
}

/// Distinct song names in row order.
pub fn song_names(rows: &[LineAnalysis]) -> Vec<&str> {
    let mut names: Vec<&str> = Vec::new();
    for row in rows {
        if !names.contains(&row.song.as_str()) {
            names.push(&row.song);
        }
    }
    names
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}
