// Pure transformations over document markup: plain-text extraction,
// statistics and export.

pub mod export;
pub mod stats;

/// Strip markup tags from `markup` and decode the common HTML entities.
///
/// `<br>` and the closing tags of block elements (`</p>`, `</div>`) become
/// newlines. A `<` that does not start a tag is kept literally.
pub fn plain_text(markup: &str) -> String {
    let mut out = String::with_capacity(markup.len());
    let mut rest = markup;

    while let Some(start) = rest.find('<') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];

        let starts_tag =
            after.chars().next().is_some_and(|c| c.is_ascii_alphabetic() || c == '/' || c == '!');
        match after.find('>') {
            Some(end) if starts_tag => {
                if let Some(separator) = tag_separator(&after[..end]) {
                    out.push_str(separator);
                }
                rest = &after[end + 1..];
            }
            _ => {
                out.push('<');
                rest = after;
            }
        }
    }
    out.push_str(rest);

    decode_entities(&out)
}

fn tag_separator(tag: &str) -> Option<&'static str> {
    let tag = tag.trim().trim_end_matches('/').trim();
    let (closing, name) = match tag.strip_prefix('/') {
        Some(name) => (true, name),
        None => (false, tag),
    };
    let name = name.split_whitespace().next().unwrap_or("").to_ascii_lowercase();

    match (closing, name.as_str()) {
        (_, "br") => Some("\n"),
        (true, "p" | "div") => Some("\n"),
        _ => None,
    }
}

fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    // `&amp;` last so that `&amp;lt;` decodes to `&lt;`, not `<`.
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}
