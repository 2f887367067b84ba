//! Positional placeholder rewriting.
//!
//! Clients write `?` placeholders whatever the backend. PostgreSQL expects
//! `$1, $2, ...`, so statements bound for it are rewritten before execution.
//! Quoted strings, quoted identifiers, dollar-quoted bodies and comments are
//! copied verbatim.

/// Rewrite `?` placeholders to `$n`.
///
/// Statements that already use `$n` placeholders are returned unchanged.
pub fn question_to_dollar(sql: &str) -> String {
    let chars: Vec<char> = sql.chars().collect();
    let mut out = String::with_capacity(sql.len() + 8);
    let mut next = 1;
    let mut has_dollar = false;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '\'' if is_escape_prefix(&chars, i) => {
                let end = skip_escaped(&chars, i);
                out.extend(&chars[i..end]);
                i = end;
            }
            '\'' | '"' => {
                let end = skip_quoted(&chars, i, c);
                out.extend(&chars[i..end]);
                i = end;
            }
            '-' if chars.get(i + 1) == Some(&'-') => {
                let end = chars[i..]
                    .iter()
                    .position(|&ch| ch == '\n')
                    .map_or(chars.len(), |p| i + p);
                out.extend(&chars[i..end]);
                i = end;
            }
            '/' if chars.get(i + 1) == Some(&'*') => {
                let end = find_seq(&chars, i + 2, &['*', '/']).map_or(chars.len(), |p| p + 2);
                out.extend(&chars[i..end]);
                i = end;
            }
            '$' => match dollar_tag(&chars, i) {
                Some(tag_len) => {
                    let tag = &chars[i..i + tag_len];
                    let end = find_seq(&chars, i + tag_len, tag)
                        .map_or(chars.len(), |p| p + tag_len);
                    out.extend(&chars[i..end]);
                    i = end;
                }
                None => {
                    if chars.get(i + 1).is_some_and(char::is_ascii_digit)
                        && !(i > 0 && is_ident_char(chars[i - 1]))
                    {
                        has_dollar = true;
                    }
                    out.push(c);
                    i += 1;
                }
            },
            '?' => {
                out.push('$');
                out.push_str(&next.to_string());
                next += 1;
                i += 1;
            }
            _ => {
                out.push(c);
                i += 1;
            }
        }
    }

    if has_dollar {
        return sql.to_string();
    }
    out
}

fn is_ident_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

/// True when the quote at `start` opens an `E'...'` escape string.
fn is_escape_prefix(chars: &[char], start: usize) -> bool {
    start > 0
        && matches!(chars[start - 1], 'E' | 'e')
        && !(start > 1 && is_ident_char(chars[start - 2]))
}

/// Index one past the closing quote of an escape string; backslash escapes
/// the next character.
fn skip_escaped(chars: &[char], start: usize) -> usize {
    let mut i = start + 1;
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 2,
            '\'' if chars.get(i + 1) == Some(&'\'') => i += 2,
            '\'' => return i + 1,
            _ => i += 1,
        }
    }
    chars.len()
}

/// Index one past the closing quote; doubled quotes are escapes.
fn skip_quoted(chars: &[char], start: usize, quote: char) -> usize {
    let mut i = start + 1;
    while i < chars.len() {
        if chars[i] == quote {
            if chars.get(i + 1) == Some(&quote) {
                i += 2;
                continue;
            }
            return i + 1;
        }
        i += 1;
    }
    chars.len()
}

/// Length of a `$tag$` opener starting at `start`, if there is one.
fn dollar_tag(chars: &[char], start: usize) -> Option<usize> {
    let mut i = start + 1;
    while i < chars.len() {
        match chars[i] {
            '$' => return Some(i - start + 1),
            ch if ch.is_alphanumeric() || ch == '_' => {
                if i == start + 1 && ch.is_ascii_digit() {
                    return None;
                }
                i += 1;
            }
            _ => return None,
        }
    }
    None
}

fn find_seq(chars: &[char], from: usize, seq: &[char]) -> Option<usize> {
    if from > chars.len() {
        return None;
    }
    chars[from..]
        .windows(seq.len())
        .position(|w| w == seq)
        .map(|p| from + p)
}
