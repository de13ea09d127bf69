//! Plain-text rendering of the control's visible window.
//!
//! Column widths are converted from pixels to characters; everything else
//! follows the control's own geometry, so the text shows exactly the rows
//! [`TreeListControl::visible_rows`] yields.

use std::fmt::Write;

use horizon_treelist::{HorizontalAlignment, RowKey, TreeListControl, Trimming};

const ELLIPSIS: char = '…';
const EXPANDED: &str = "▾ ";
const COLLAPSED: &str = "▸ ";
const LEAF: &str = "  ";
/// Characters of indentation per level.
const INDENT: usize = 2;

/// Renders the header (if shown) and the visible rows, one line each.
///
/// The first two characters of a row mark the focused row (`>`) and
/// selected rows (`*`).
pub fn render(control: &TreeListControl, char_width: i32) -> String {
    let widths: Vec<usize> = control
        .columns()
        .iter()
        .map(|column| chars_for(column.width(), char_width))
        .collect();

    let mut out = String::new();
    if control.metrics().show_header {
        let mut line = String::from("  ");
        for (column, &width) in control.columns().iter().zip(&widths) {
            let format = column.header_format();
            line.push_str(&fit(column.text(), width, format.trimming, format.horizontal));
            line.push('|');
        }
        push_line(&mut out, &line);
        let rule: String = widths.iter().map(|&w| "-".repeat(w) + "+").collect();
        push_line(&mut out, &format!("  {rule}"));
    }

    for visible in control.visible_rows() {
        let Some(row) = control.row(visible.key) else {
            continue;
        };
        let mut line = String::new();
        line.push(if control.focused_row() == Some(visible.key) { '>' } else { ' ' });
        line.push(if row.is_selected() { '*' } else { ' ' });
        for (index, (column, &width)) in control.columns().iter().zip(&widths).enumerate() {
            let text = row
                .cells()
                .get(index)
                .map(|cell| cell.value_as_string())
                .unwrap_or_default();
            let text = if index == 0 {
                format!("{}{}{text}", " ".repeat(visible.level * INDENT), glyph(control, visible.key))
            } else {
                text
            };
            let format = column.body_format();
            line.push_str(&fit(&text, width, format.trimming, format.horizontal));
            line.push('|');
        }
        push_line(&mut out, &line);
    }
    out
}

fn push_line(out: &mut String, line: &str) {
    let _ = writeln!(out, "{}", line.trim_end());
}

fn chars_for(pixels: i32, char_width: i32) -> usize {
    usize::try_from(pixels / char_width.max(1)).unwrap_or(0)
}

fn glyph(control: &TreeListControl, key: RowKey) -> &'static str {
    match control.row(key) {
        Some(row) if row.is_expandable() && row.is_expanded() => EXPANDED,
        Some(row) if row.is_expandable() => COLLAPSED,
        _ => LEAF,
    }
}

/// Pads or trims `text` to exactly `width` characters.
pub fn fit(text: &str, width: usize, trimming: Trimming, alignment: HorizontalAlignment) -> String {
    let len = text.chars().count();
    if len <= width {
        let gap = width - len;
        let (left, right) = match alignment {
            HorizontalAlignment::Left => (0, gap),
            HorizontalAlignment::Center => (gap / 2, gap - gap / 2),
            HorizontalAlignment::Right => (gap, 0),
        };
        return format!("{}{text}{}", " ".repeat(left), " ".repeat(right));
    }
    if width == 0 {
        return String::new();
    }

    let head = |n: usize| text.chars().take(n).collect::<String>();
    let at_word = |n: usize| {
        let cut = head(n);
        match cut.rfind(' ') {
            Some(space) if space > 0 => cut[..space].to_string(),
            _ => cut,
        }
    };
    let trimmed = match trimming {
        Trimming::None | Trimming::Character => head(width),
        Trimming::Word => at_word(width),
        Trimming::EllipsisCharacter => format!("{}{ELLIPSIS}", head(width - 1)),
        Trimming::EllipsisWord => format!("{}{ELLIPSIS}", at_word(width - 1)),
        Trimming::EllipsisPath => {
            let tail: String = text.chars().skip(len - (width - 1)).collect();
            format!("{ELLIPSIS}{tail}")
        }
    };
    let pad = width - trimmed.chars().count();
    format!("{trimmed}{}", " ".repeat(pad))
}
