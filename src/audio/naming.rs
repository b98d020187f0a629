// src/audio/naming.rs

/// Pick the output file name for a trimmed clip
///
/// Prefers `desired` when it is non-blank, otherwise `original`; drops a
/// trailing `.ext` and appends `.wav`. Never fails.
///
/// # Example
/// ```
/// use clipwav::audio::resolve_name;
///
/// assert_eq!(resolve_name(Some("intro"), "song.mp3"), "intro.wav");
/// assert_eq!(resolve_name(None, "song.mp3"), "song.wav");
/// ```
pub fn resolve_name(desired: Option<&str>, original: &str) -> String {
    let chosen = desired
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| original.trim());

    format!("{}.wav", strip_extension(chosen))
}

/// Remove a trailing `.ext` (one or more characters, no `/`)
fn strip_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(dot) if dot + 1 < name.len() && !name[dot + 1..].contains('/') => &name[..dot],
        _ => name,
    }
}

/// Split a name into base and extension (the extension keeps its dot)
///
/// A name without a dot, or whose only dot is the first character, has no
/// extension.
pub fn split_file_name(name: &str) -> (&str, &str) {
    let trimmed = name.trim();
    match trimmed.rfind('.') {
        Some(dot) if dot > 0 => trimmed.split_at(dot),
        _ => (trimmed, ""),
    }
}

/// Name to show to a user: the base, or the whole name if the base is empty
pub fn display_name(name: &str) -> &str {
    let (base, _) = split_file_name(name);
    if base.is_empty() {
        name
    } else {
        base
    }
}

/// Give `name` the extension of `original` when it has none of its own
pub fn ensure_extension(name: &str, original: &str) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() || strip_extension(trimmed) != trimmed {
        return trimmed.to_string();
    }

    let (_, ext) = split_file_name(original);
    if ext.is_empty() || trimmed.ends_with(ext) {
        trimmed.to_string()
    } else {
        format!("{}{}", trimmed, ext)
    }
}
