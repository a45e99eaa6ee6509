//! UTF-16 offset helpers.
//!
//! Field selections and text-node offsets are counted in UTF-16 code units,
//! the way the browser reports them.

pub(crate) fn len(s: &str) -> u32 {
    s.encode_utf16().count() as u32
}

fn is_low_surrogate(unit: u16) -> bool {
    (0xDC00..=0xDFFF).contains(&unit)
}

/// Clamp `offset` to `units` and move it past the second half of a
/// surrogate pair, so slicing never splits a character.
fn snap(units: &[u16], offset: u32) -> usize {
    let at = (offset as usize).min(units.len());
    if at > 0 && at < units.len() && is_low_surrogate(units[at]) {
        at + 1
    } else {
        at
    }
}

/// `offset` clamped to `s` and moved forward onto a character boundary.
pub(crate) fn char_boundary(s: &str, offset: u32) -> u32 {
    let units: Vec<u16> = s.encode_utf16().collect();
    snap(&units, offset) as u32
}

/// Replace the units in `start..end` with `text`.
///
/// Offsets past the end are clamped, offsets inside a surrogate pair move
/// past it, and `end` is never allowed to fall before `start`.
pub(crate) fn splice(content: &str, start: u32, end: u32, text: &str) -> String {
    let units: Vec<u16> = content.encode_utf16().collect();
    let start = snap(&units, start);
    let end = snap(&units, end).max(start);

    let mut out: Vec<u16> = Vec::with_capacity(units.len() + text.len());
    out.extend_from_slice(&units[..start]);
    out.extend(text.encode_utf16());
    out.extend_from_slice(&units[end..]);
    String::from_utf16_lossy(&out)
}

/// Split `s` into the units before and after `offset`.
pub(crate) fn split_at(s: &str, offset: u32) -> (String, String) {
    let units: Vec<u16> = s.encode_utf16().collect();
    let at = snap(&units, offset);
    (
        String::from_utf16_lossy(&units[..at]),
        String::from_utf16_lossy(&units[at..]),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_len_counts_code_units() {
        assert_eq!(len("abc"), 3);
        assert_eq!(len("結節"), 2);
        // Outside the BMP: one char, two units.
        assert_eq!(len("🩺"), 2);
    }

    #[test]
    fn test_splice_insert_and_replace() {
        assert_eq!(splice("hello world", 5, 5, ","), "hello, world");
        assert_eq!(splice("hello world", 6, 11, "there"), "hello there");
        assert_eq!(splice("", 0, 0, "x"), "x");
    }

    #[test]
    fn test_splice_clamps() {
        assert_eq!(splice("abc", 10, 20, "!"), "abc!");
        assert_eq!(splice("abc", 2, 1, "-"), "ab-c");
    }

    #[test]
    fn test_splice_after_astral_char() {
        let s = "🩺 ok";
        assert_eq!(splice(s, 2, 2, "!"), "🩺! ok");
    }

    #[test]
    fn test_offset_inside_surrogate_pair_keeps_char() {
        // Offset 1 sits between the two halves of the emoji.
        assert_eq!(splice("\u{1F600}x", 1, 1, "A"), "\u{1F600}Ax");
        assert_eq!(splice("a\u{1F600}b", 0, 2, "-"), "-b");
        assert_eq!(char_boundary("\u{1F600}x", 1), 2);
        assert_eq!(char_boundary("\u{1F600}x", 0), 0);
        assert_eq!(
            split_at("\u{1F600}x", 1),
            ("\u{1F600}".to_string(), "x".to_string())
        );
    }

    #[test]
    fn test_split_at() {
        assert_eq!(split_at("report", 3), ("rep".to_string(), "ort".to_string()));
        assert_eq!(split_at("ab", 9), ("ab".to_string(), String::new()));
    }
}
