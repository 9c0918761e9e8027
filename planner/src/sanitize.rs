//! Cleanup of generated action text.
//!
//! Model output arrives one action per line, often bulleted or numbered.
//! Actions become tree edge labels, so they are reduced to ASCII letters,
//! digits and single spaces.

/// Clean a single candidate. Returns `None` if nothing is left.
pub fn sanitize_action(raw: &str, max_len: usize) -> Option<String> {
    let unmarked = strip_list_marker(raw.trim());

    let cleaned: String = unmarked
        .chars()
        .map(|c| {
            if c.is_whitespace() || c == '_' || c == '-' {
                ' '
            } else {
                c
            }
        })
        .filter(|c| c.is_ascii_alphanumeric() || *c == ' ')
        .collect();

    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    let truncated: String = collapsed.chars().take(max_len).collect();
    let action = truncated.trim_end();

    (!action.is_empty()).then(|| action.to_string())
}

/// Clean every line of every candidate, dropping empties and duplicates.
/// The first occurrence of an action keeps its position.
pub fn sanitize_actions<S: AsRef<str>>(raw: &[S], max_len: usize) -> Vec<String> {
    let mut actions: Vec<String> = Vec::new();
    for line in raw.iter().flat_map(|candidate| candidate.as_ref().lines()) {
        if let Some(action) = sanitize_action(line, max_len) {
            if !actions.contains(&action) {
                actions.push(action);
            }
        }
    }
    actions
}

/// Strip a leading `-`, `*`, `•`, `1.` or `2)` marker.
fn strip_list_marker(line: &str) -> &str {
    if let Some(rest) = line.strip_prefix(|c: char| matches!(c, '-' | '*' | '•')) {
        return rest.trim_start();
    }

    let digits = line.len() - line.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits > 0 {
        if let Some(rest) = line[digits..].strip_prefix(|c: char| c == '.' || c == ')') {
            return rest.trim_start();
        }
    }

    line
}
