//! Slug derivation for page URLs.

/// Convert a page name into a URL-safe slug.
///
/// Transforms to lowercase, replaces non-alphanumeric characters with
/// hyphens, collapses consecutive hyphens, and trims leading/trailing
/// hyphens.
pub fn derive_slug(name: &str) -> String {
    let slug: String = name
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();

    // Collapse consecutive hyphens and trim
    let mut result = String::with_capacity(slug.len());
    let mut prev_was_hyphen = true; // Start true to skip leading hyphens
    for c in slug.chars() {
        if c == '-' {
            if !prev_was_hyphen {
                result.push('-');
            }
            prev_was_hyphen = true;
        } else {
            result.push(c);
            prev_was_hyphen = false;
        }
    }

    // Trim trailing hyphen
    while result.ends_with('-') {
        result.pop();
    }

    // Truncate to reasonable length
    if result.len() > 128 {
        // result is pure ASCII (alphanumerics + hyphens from the char map
        // above), so 128 is always a char boundary; don't cut mid-word.
        let truncated = &result[..128];
        if let Some(last_hyphen) = truncated.rfind('-') {
            return truncated[..last_hyphen].to_string();
        }
        return truncated.to_string();
    }

    result
}

/// Check that an explicitly supplied slug is URL-safe: lowercase ASCII
/// alphanumerics and hyphens, no leading/trailing hyphen, at most 128
/// characters.
pub fn is_url_safe_slug(slug: &str) -> bool {
    if slug.is_empty() || slug.len() > 128 {
        return false;
    }
    if slug.starts_with('-') || slug.ends_with('-') {
        return false;
    }
    slug.chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}
