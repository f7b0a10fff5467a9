//! Text rendering utilities for human-friendly error messages.
//!
//! Provides helpers to format reference chains, type names,
//! and "did you mean?" suggestions in error output.

/// Renders a chain of service identifiers as a readable string.
///
/// # Examples
/// ```
/// use stowage_support::rendering::render_chain;
///
/// let chain = vec!["mailer", "transport", "config", "mailer"];
/// let rendered = render_chain(&chain);
/// assert_eq!(rendered, "mailer → transport → config → mailer");
/// ```
pub fn render_chain(chain: &[impl AsRef<str>]) -> String {
    let mut rendered = String::new();
    for (i, id) in chain.iter().enumerate() {
        if i > 0 {
            rendered.push_str(" → ");
        }
        rendered.push_str(id.as_ref());
    }
    rendered
}

/// Shortens a fully qualified type name for display.
///
/// ```
/// use stowage_support::rendering::shorten_type_name;
///
/// let short = shorten_type_name("my_app::services::user::UserService");
/// assert_eq!(short, "UserService");
///
/// let short = shorten_type_name("alloc::sync::Arc<dyn my_app::traits::Logger>");
/// assert_eq!(short, "Arc<dyn Logger>");
/// ```
pub fn shorten_type_name(full_name: &str) -> String {
    let mut result = String::with_capacity(full_name.len());
    // Start of the path currently being read
    let mut path_start = 0;

    for (i, ch) in full_name.char_indices() {
        if is_delimiter(ch) {
            result.push_str(last_segment(&full_name[path_start..i]));
            result.push(ch);
            path_start = i + ch.len_utf8();
        }
    }

    result.push_str(last_segment(&full_name[path_start..]));
    result
}

/// Characters separating the paths inside a type name.
fn is_delimiter(ch: char) -> bool {
    matches!(
        ch,
        '<' | '>' | ',' | ' ' | '(' | ')' | '&' | '[' | ']' | ';'
    )
}

/// Drops the module path: `my_app::services::Mailer` → `Mailer`.
fn last_segment(path: &str) -> &str {
    path.rsplit("::").next().unwrap_or(path)
}

/// Suggests registered identifiers that look like `requested`.
///
/// Matching is case-insensitive. Substring hits rank first, then
/// identifiers sharing a common prefix of at least three characters,
/// then near-misses of similar length (typos).
///
/// ```
/// use stowage_support::rendering::suggest_similar;
///
/// let registered = ["mailer", "transport", "logger"];
/// let found = suggest_similar("mailr", &registered, 2);
/// assert_eq!(found[0], "mailer");
/// ```
pub fn suggest_similar(
    requested: &str,
    available: &[impl AsRef<str>],
    max_suggestions: usize,
) -> Vec<String> {
    let requested_lower = requested.to_lowercase();

    let mut scored: Vec<(&str, usize)> = available
        .iter()
        .map(|name| name.as_ref())
        .filter_map(|name| {
            let name_lower = name.to_lowercase();

            if name_lower == requested_lower {
                return None;
            }

            if name_lower.contains(&requested_lower)
                || requested_lower.contains(&name_lower)
            {
                return Some((name, 100));
            }

            let common = name_lower
                .chars()
                .zip(requested_lower.chars())
                .take_while(|(a, b)| a == b)
                .count();

            if common >= 3 {
                return Some((name, common * 10));
            }

            if is_close(&requested_lower, &name_lower) {
                return Some((name, 20));
            }

            None
        })
        .collect();

    scored.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    scored
        .into_iter()
        .take(max_suggestions)
        .map(|(name, _)| name.to_string())
        .collect()
}

/// Rough typo check: similar length and at least 60% of positions agree.
fn is_close(a: &str, b: &str) -> bool {
    let (a_len, b_len) = (a.chars().count(), b.chars().count());
    if a_len.abs_diff(b_len) > 2 {
        return false;
    }

    let max_len = a_len.max(b_len);
    if max_len == 0 {
        return false;
    }

    let common = a.chars().zip(b.chars()).filter(|(x, y)| x == y).count();
    common * 100 / max_len >= 60
}
