//! Redaction for provider error text before it reaches logs or error chains.

const MAX_API_ERROR_CHARS: usize = 200;

/// Markers whose trailing token is a credential when present in API error
/// bodies. Bare markers without a token are left alone.
const SECRET_MARKERS: [&str; 6] = [
    "api_key=",
    "access_token=",
    "key=",
    "Bearer ",
    "sk-",
    "AIza",
];

fn is_secret_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':' | '+' | '/' | '=')
}

fn token_end(input: &str, from: usize) -> usize {
    let mut end = from;
    for (i, c) in input[from..].char_indices() {
        if is_secret_char(c) {
            end = from + i + c.len_utf8();
        } else {
            break;
        }
    }
    end
}

fn scrub_after_marker(scrubbed: &mut String, marker: &str) {
    // Markers ending in '=' or ' ' label the secret that follows them;
    // the rest ("sk-", "AIza") are prefixes of the secret itself.
    let marker_is_label = marker.ends_with('=') || marker.ends_with(' ');

    let mut search_from = 0;
    loop {
        let Some(rel) = scrubbed[search_from..].find(marker) else {
            break;
        };

        let start = search_from + rel;
        let after_marker = start + marker.len();
        let end = token_end(scrubbed, after_marker);

        // Skip bare markers without a token value.
        if end == after_marker {
            search_from = after_marker;
            continue;
        }

        let replace_start = if marker_is_label { after_marker } else { start };
        scrubbed.replace_range(replace_start..end, "[REDACTED]");
        search_from = replace_start + "[REDACTED]".len();
    }
}

/// Sanitize an API error body: redact credential-shaped tokens and truncate
/// to a loggable length.
pub fn sanitize_api_error(raw: &str) -> String {
    let mut scrubbed = raw.to_string();
    for marker in SECRET_MARKERS {
        scrub_after_marker(&mut scrubbed, marker);
    }

    if scrubbed.chars().count() > MAX_API_ERROR_CHARS {
        let truncated: String = scrubbed.chars().take(MAX_API_ERROR_CHARS).collect();
        return format!("{truncated}… (truncated)");
    }
    scrubbed
}
