//! URL path normalization.
//!
//! [`clean_path`] is the analogue of the classic `path.Clean` rule set with
//! one deviation: a trailing slash is kept if present. It is used by the
//! router before attempting a case-insensitive path repair, so superfluous
//! elements like `..` or `//` do not defeat the repair lookup.

/// Return the canonical form of `p`, eliminating `.` and `..` elements.
///
/// The following rules are applied iteratively until no further processing
/// can be done:
///
/// 1. Replace multiple slashes with a single slash.
/// 2. Eliminate each `.` path name element (the current directory).
/// 3. Eliminate each inner `..` path name element (the parent directory)
///    along with the non-`..` element that precedes it.
/// 4. Eliminate `..` elements that begin a rooted path, i.e. replace `/..`
///    at the beginning of a path by `/`.
///
/// If the result of this process is an empty string, `/` is returned.
#[must_use]
pub fn clean_path(p: &str) -> String {
    if p.is_empty() {
        return "/".to_string();
    }

    // A trailing slash is preserved; a trailing "." also leaves one behind
    // ("/abc/." cleans to "/abc/").
    let trailing = p.ends_with('/') || p.ends_with("/.") || p == ".";

    let mut segments: Vec<&str> = Vec::new();
    for segment in p.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }

    if segments.is_empty() {
        return "/".to_string();
    }

    let mut out = String::with_capacity(p.len() + 1);
    for segment in &segments {
        out.push('/');
        out.push_str(segment);
    }
    if trailing {
        out.push('/');
    }
    out
}
