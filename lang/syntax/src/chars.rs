use phf::phf_map;

/// Named character literals, as in `#\space`.
pub static CHAR_NAMES: phf::Map<&'static str, char> = phf_map! {
    "alarm" => '\u{7}',
    "backspace" => '\u{8}',
    "delete" => '\u{7f}',
    "escape" => '\u{1b}',
    "newline" => '\n',
    "null" => '\0',
    "nul" => '\0',
    "return" => '\r',
    "space" => ' ',
    "tab" => '\t',
};

/// Look up a character by its literal name (the part after `#\`).
pub fn char_by_name(name: &str) -> Option<char> {
    CHAR_NAMES.get(name).copied()
}

/// The literal name of a character, if it has one.
pub fn char_name(c: char) -> Option<&'static str> {
    // "nul" and "null" both map to '\0'; prefer the longer spelling
    CHAR_NAMES
        .entries()
        .filter(|(_, ch)| **ch == c)
        .map(|(name, _)| *name)
        .max_by_key(|name| name.len())
}

/// Source form of a character literal, e.g. `#\a` or `#\newline`.
pub fn char_source(c: char) -> String {
    match char_name(c) {
        | Some(name) => format!("#\\{}", name),
        | None if c.is_control() => format!("#\\x{:x}", c as u32),
        | None => format!("#\\{}", c),
    }
}

/// Source form of a string literal, with quotes and control characters
/// escaped.
pub fn escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            | '"' => out.push_str("\\\""),
            | '\\' => out.push_str("\\\\"),
            | '\n' => out.push_str("\\n"),
            | '\t' => out.push_str("\\t"),
            | '\r' => out.push_str("\\r"),
            | '\0' => out.push_str("\\0"),
            | c if c.is_control() => out.push_str(&format!("\\x{:x};", c as u32)),
            | c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Undo [`escape_string`] on the body of a literal (quotes already removed).
pub fn unescape_string(body: &str) -> Result<String, String> {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            | Some('n') => out.push('\n'),
            | Some('t') => out.push('\t'),
            | Some('r') => out.push('\r'),
            | Some('0') => out.push('\0'),
            | Some('a') => out.push('\u{7}'),
            | Some('"') => out.push('"'),
            | Some('\\') => out.push('\\'),
            | Some('x') => {
                let hex: String = chars.by_ref().take_while(|c| *c != ';').collect();
                let code = u32::from_str_radix(&hex, 16)
                    .map_err(|_| format!("bad hex escape `\\x{};`", hex))?;
                let c = char::from_u32(code)
                    .ok_or_else(|| format!("invalid code point in `\\x{};`", hex))?;
                out.push(c);
            }
            | Some(other) => return Err(format!("unknown escape `\\{}`", other)),
            | None => return Err("dangling `\\` at end of string".to_string()),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn named_chars_both_ways() {
        assert_eq!(char_by_name("space"), Some(' '));
        assert_eq!(char_name('\n'), Some("newline"));
        assert_eq!(char_name('\0'), Some("null"));
        assert_eq!(char_source('a'), "#\\a");
        assert_eq!(char_source(' '), "#\\space");
    }

    #[test]
    fn escapes_control_characters() {
        assert_eq!(escape_string("a\"b\n"), "\"a\\\"b\\n\"");
        assert_eq!(escape_string("\u{1}"), "\"\\x1;\"");
        assert_eq!(unescape_string("a\\nb\\x41;").unwrap(), "a\nbA");
        assert!(unescape_string("\\q").is_err());
    }
}
