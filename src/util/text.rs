use std::borrow::Cow;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Ellipsis appended when a name is cut to fit a column.
const ELLIPSIS: &str = "…";
const ELLIPSIS_WIDTH: usize = 1;

/// Display width of `s` in terminal columns (CJK and emoji count as two).
///
/// ```
/// use pokedex::util::display_width;
///
/// assert_eq!(display_width("Pikachu"), 7);
/// assert_eq!(display_width("ピカチュウ"), 10);
/// ```
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Cut `s` so it occupies at most `max_width` columns, marking the cut with `…`.
///
/// Borrows when nothing has to be cut. A width of one column has no room for
/// text plus ellipsis, so only the characters that fit are returned.
///
/// ```
/// use pokedex::util::truncate_to_width;
///
/// assert_eq!(truncate_to_width("Bulbasaur", 20), "Bulbasaur");
/// assert_eq!(truncate_to_width("Crabominable", 6), "Crabo…");
/// assert_eq!(truncate_to_width("Mew", 0), "");
/// ```
pub fn truncate_to_width(s: &str, max_width: usize) -> Cow<'_, str> {
    if display_width(s) <= max_width {
        return Cow::Borrowed(s);
    }
    if max_width == 0 {
        return Cow::Borrowed("");
    }

    let budget = if max_width > ELLIPSIS_WIDTH {
        max_width - ELLIPSIS_WIDTH
    } else {
        max_width
    };

    let mut used = 0;
    let mut end = 0;
    for (idx, c) in s.char_indices() {
        let w = UnicodeWidthChar::width(c).unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        end = idx + c.len_utf8();
    }

    if max_width > ELLIPSIS_WIDTH {
        Cow::Owned(format!("{}{}", &s[..end], ELLIPSIS))
    } else {
        Cow::Owned(s[..end].to_string())
    }
}

/// Right-pad `s` with spaces to exactly `width` columns, truncating first if needed.
pub fn pad_to_width(s: &str, width: usize) -> String {
    let cut = truncate_to_width(s, width);
    let fill = width.saturating_sub(display_width(&cut));
    let mut out = String::with_capacity(cut.len() + fill);
    out.push_str(&cut);
    out.extend(std::iter::repeat_n(' ', fill));
    out
}

/// Remove terminal control characters and ANSI escape sequences.
///
/// Names and URLs come from the network and are written straight into the
/// terminal buffer, so anything that could move the cursor or retitle the
/// window is dropped. Tab and newline survive.
///
/// ```
/// use pokedex::util::strip_control_chars;
///
/// assert_eq!(strip_control_chars("\x1b[31mditto\x1b[0m"), "ditto");
/// ```
pub fn strip_control_chars(s: &str) -> Cow<'_, str> {
    fn is_control(c: char) -> bool {
        c == '\x7f' || (c < ' ' && c != '\t' && c != '\n')
    }

    if !s.chars().any(is_control) {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\x1b' {
            if !is_control(c) {
                out.push(c);
            }
            continue;
        }
        match chars.peek() {
            // CSI: parameters until a final byte in @..~
            Some('[') => {
                chars.next();
                for n in chars.by_ref() {
                    if ('@'..='~').contains(&n) {
                        break;
                    }
                }
            }
            // OSC: until BEL or ESC \
            Some(']') => {
                chars.next();
                while let Some(n) = chars.next() {
                    if n == '\x07' {
                        break;
                    }
                    if n == '\x1b' && chars.peek() == Some(&'\\') {
                        chars.next();
                        break;
                    }
                }
            }
            _ => {}
        }
    }
    Cow::Owned(out)
}
