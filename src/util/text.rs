use std::borrow::Cow;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Calculates the display width of a string in terminal columns.
///
/// Unicode-aware: CJK characters and most emoji occupy two columns,
/// combining marks occupy zero.
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

const ELLIPSIS: &str = "...";
const ELLIPSIS_WIDTH: usize = 3;

/// Truncates a string to fit within a maximum display width, appending
/// "..." when text was cut off.
///
/// Returns `Cow::Borrowed` when the string already fits (no allocation).
/// For widths of 3 columns or less there is no room for a character plus
/// the ellipsis, so as many characters as fit are returned without one.
///
/// # Examples
///
/// ```
/// use ladle::util::truncate_to_width;
///
/// assert_eq!(truncate_to_width("Short", 10), "Short");
/// assert_eq!(truncate_to_width("Hello World", 8), "Hello...");
/// assert_eq!(truncate_to_width("Test", 2), "Te");
/// ```
pub fn truncate_to_width(s: &str, max_width: usize) -> Cow<'_, str> {
    if max_width == 0 {
        return Cow::Borrowed("");
    }

    if max_width <= ELLIPSIS_WIDTH {
        let mut byte_end = 0;
        let mut current_width = 0;
        for (idx, c) in s.char_indices() {
            let char_width = UnicodeWidthChar::width(c).unwrap_or(0);
            if current_width + char_width > max_width {
                break;
            }
            current_width += char_width;
            byte_end = idx + c.len_utf8();
        }
        if byte_end == s.len() {
            return Cow::Borrowed(s);
        }
        return Cow::Owned(s[..byte_end].to_string());
    }

    let target_width = max_width.saturating_sub(ELLIPSIS_WIDTH);

    let mut byte_end = 0;
    let mut current_width = 0;
    let mut fits = true;
    for (idx, c) in s.char_indices() {
        let char_width = UnicodeWidthChar::width(c).unwrap_or(0);
        if current_width + char_width > target_width {
            // The remainder might still fit within max_width as a whole
            if display_width(s) <= max_width {
                return Cow::Borrowed(s);
            }
            fits = false;
            break;
        }
        current_width += char_width;
        byte_end = idx + c.len_utf8();
    }

    if fits {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(byte_end + ELLIPSIS.len());
    out.push_str(&s[..byte_end]);
    out.push_str(ELLIPSIS);
    Cow::Owned(out)
}

/// Collapses a multi-line text blob into a single line for list display.
///
/// Newlines become single spaces; runs of whitespace are squeezed. Used
/// for showing the first line of a recipe description in the browse list.
pub fn single_line(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
