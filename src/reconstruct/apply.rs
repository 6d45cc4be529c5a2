//! Applying one edit script to a text
//!
//! Keep and Delete must match the running text exactly at the current
//! position, and the script must consume the whole base. Any mismatch is a
//! diff application error carrying the character offset; nothing is
//! patched up.

use crate::diff::{EditScript, Operation};
use crate::errors::{VersionError, VersionResult};

/// Longest excerpt quoted in a mismatch message, in characters.
const EXCERPT_CHARS: usize = 24;

/// Apply `script` to `base`, producing the target text.
pub fn apply(base: &str, script: &EditScript) -> VersionResult<String> {
    let mut out = String::with_capacity(script.target_len());
    let mut pos = 0usize;
    let mut char_offset = 0usize;

    for op in script.operations() {
        match op {
            Operation::Keep(text) | Operation::Delete(text) => {
                let rest = &base[pos..];
                if !rest.starts_with(text.as_str()) {
                    return Err(VersionError::diff_application_at_offset(
                        char_offset,
                        format!(
                            "{} expected {:?} but base has {:?}",
                            op.kind().as_str(),
                            excerpt(text),
                            excerpt(rest)
                        ),
                    ));
                }
                pos += text.len();
                char_offset += text.chars().count();
                if op.is_keep() {
                    out.push_str(text);
                }
            }
            Operation::Insert(text) => out.push_str(text),
        }
    }

    if pos != base.len() {
        let left = base[pos..].chars().count();
        return Err(VersionError::diff_application_at_offset(
            char_offset,
            format!("script ends with {} characters of base text unconsumed", left),
        ));
    }

    Ok(out)
}

fn excerpt(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(EXCERPT_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}
