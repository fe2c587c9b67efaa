//! Destination path resolution.
//!
//! Maps a source directory onto the output root by stripping the source's
//! filesystem root and, optionally, everything up to and including a trim
//! token. Paths are handled as text so that drive-letter and UNC paths resolve
//! identically on every host.
//!
//! The token search is a case-insensitive substring match, not a path segment
//! match: with token `Transfer`, `D:\Data\MyTransferFiles\Run1` is cut inside
//! `MyTransferFiles` and resolves to `<root>\iles\Run1`. Callers relying on
//! segment semantics must pick a token that cannot occur inside a segment name.

use std::path::{Path, PathBuf, MAIN_SEPARATOR};

const SEPARATORS: &[char] = &['\\', '/'];

/// Resolves the destination for `source_dir` under `output_root`.
///
/// 1. The filesystem root of `source_dir` is removed, giving `rel`.
/// 2. An empty `trim_token` means `output_root/rel`.
/// 3. `rel` equal to the token (ignoring case) means `output_root` itself.
/// 4. Otherwise the first occurrence of the token in `rel` and the one
///    character following it are dropped along with everything before.
/// 5. A token that never occurs is ignored.
pub fn resolve_destination(source_dir: &str, output_root: &str, trim_token: &str) -> String {
    let rel = strip_root(source_dir).trim_end_matches(SEPARATORS);
    let separator = separator_for(output_root, source_dir);

    if trim_token.is_empty() {
        return join(output_root, rel, separator);
    }

    if rel.eq_ignore_ascii_case(trim_token) {
        return output_root.to_string();
    }

    match find_ignore_ascii_case(rel, trim_token) {
        Some(pos) => {
            let mut rest = rel[pos + trim_token.len()..].chars();
            rest.next();
            join(output_root, rest.as_str(), separator)
        }
        None => join(output_root, rel, separator),
    }
}

/// [`resolve_destination`] over paths.
pub fn resolve(source_dir: &Path, output_root: &Path, trim_token: &str) -> PathBuf {
    PathBuf::from(resolve_destination(
        &source_dir.to_string_lossy(),
        &output_root.to_string_lossy(),
        trim_token,
    ))
}

/// Removes a drive (`C:\`), UNC share (`\\server\share\`) or leading
/// separators from `path`.
fn strip_root(path: &str) -> &str {
    let bytes = path.as_bytes();

    if path.starts_with(r"\\") || path.starts_with("//") {
        let mut parts = path[2..].splitn(3, SEPARATORS);
        let _server = parts.next();
        let _share = parts.next();
        return parts.next().unwrap_or_default();
    }

    if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
        return path[2..].trim_start_matches(SEPARATORS);
    }

    path.trim_start_matches(SEPARATORS)
}

/// Separator style used for the joined result.
fn separator_for(output_root: &str, source_dir: &str) -> char {
    output_root
        .chars()
        .chain(source_dir.chars())
        .find(|c| SEPARATORS.contains(c))
        .unwrap_or(MAIN_SEPARATOR)
}

fn join(root: &str, rel: &str, separator: char) -> String {
    if rel.is_empty() {
        return root.to_string();
    }

    let rel = rel.replace(SEPARATORS, &separator.to_string());
    if root.is_empty() {
        return rel;
    }
    if root.ends_with(SEPARATORS) {
        format!("{root}{rel}")
    } else {
        format!("{root}{separator}{rel}")
    }
}

/// Byte offset of the first ASCII case-insensitive occurrence of `needle`.
///
/// Offsets are always char boundaries: non-ASCII bytes only match themselves,
/// so a match can neither start nor end inside a multi-byte character.
fn find_ignore_ascii_case(haystack: &str, needle: &str) -> Option<usize> {
    if needle.len() > haystack.len() {
        return None;
    }
    haystack
        .as_bytes()
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle.as_bytes()))
}
