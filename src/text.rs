//! Backend-independent text preprocessing: mnemonics, line breaks and tabs.

use crate::api::TextFlags;

const TAB_WIDTH: usize = 8;

/// Removes `&` mnemonic markers. `&&` yields a literal `&`; a trailing `&`
/// is dropped.
pub fn strip_mnemonics(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == '&' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Splits on `\n`. A `\r` directly before the `\n` is part of the break.
pub fn split_lines(text: &str) -> Vec<&str> {
    let mut lines: Vec<&str> = text.split('\n').collect();
    let last = lines.len() - 1;
    for line in &mut lines[..last] {
        let s = *line;
        *line = s.strip_suffix('\r').unwrap_or(s);
    }
    lines
}

/// Replaces tabs with spaces up to the next multiple of eight columns.
pub fn expand_tabs(line: &str) -> String {
    if !line.contains('\t') {
        return line.to_string();
    }
    let mut out = String::with_capacity(line.len() + TAB_WIDTH);
    let mut column = 0;
    for c in line.chars() {
        if c == '\t' {
            let pad = TAB_WIDTH - column % TAB_WIDTH;
            out.extend(std::iter::repeat_n(' ', pad));
            column += pad;
        } else {
            out.push(c);
            column += 1;
        }
    }
    out
}

/// Applies `flags` and returns the lines to lay out, top to bottom.
pub fn layout_lines(text: &str, flags: TextFlags) -> Vec<String> {
    let text = if flags.mnemonic {
        strip_mnemonics(text)
    } else {
        text.to_string()
    };
    let lines: Vec<&str> = if flags.delimiter {
        split_lines(&text)
    } else {
        vec![text.as_str()]
    };
    lines
        .into_iter()
        .map(|line| {
            if flags.tab {
                expand_tabs(line)
            } else {
                line.to_string()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mnemonics() {
        assert_eq!(strip_mnemonics("&File"), "File");
        assert_eq!(strip_mnemonics("Save && Exit"), "Save & Exit");
        assert_eq!(strip_mnemonics("tail&"), "tail");
    }

    #[test]
    fn carriage_return_belongs_to_break() {
        assert_eq!(split_lines("a\r\nb\nc"), vec!["a", "b", "c"]);
        assert_eq!(split_lines("x\r"), vec!["x\r"]);
        assert_eq!(split_lines("end\n"), vec!["end", ""]);
    }

    #[test]
    fn tabs_align_to_eight_columns() {
        assert_eq!(expand_tabs("ab\tc"), "ab      c");
        assert_eq!(expand_tabs("\t"), "        ");
    }

    #[test]
    fn flags_select_processing() {
        let flags = TextFlags {
            mnemonic: true,
            ..TextFlags::default()
        };
        assert_eq!(layout_lines("&a\r\n\tb", flags), vec!["a", "        b"]);
        assert_eq!(layout_lines("a\nb", TextFlags::NONE), vec!["a\nb"]);
    }
}
