use simd_json::OwnedValue;

/// Returns `true` when `text` is one complete JSON document.
///
/// Surrounding whitespace is allowed, anything else around the value is not.
pub fn is_json(text: &str) -> bool {
    parse_json(text).is_some()
}

pub fn parse_json(text: &str) -> Option<OwnedValue> {
    if text.trim().is_empty() {
        return None;
    }
    // simd_json parses in place
    let mut bytes = text.as_bytes().to_vec();
    simd_json::to_owned_value(&mut bytes).ok()
}

/// Finds the first balanced object or array in `text`.
///
/// Returns the byte offset where it starts and the byte offset just past
/// its closing bracket. Braces inside string literals are ignored. `None`
/// means no opening bracket was found or the value is still unterminated.
pub fn find_balanced(text: &str, allow_arrays: bool) -> Option<(usize, usize)> {
    let start = text.find(|c: char| c == '{' || (allow_arrays && c == '['))?;
    let end = balanced_end(&text.as_bytes()[start..])?;
    Some((start, start + end))
}

/// Finds a later value in `text` that is complete on its own, for when the
/// value `text` starts with never closes.
///
/// Only brackets outside string literals and not in value position (after
/// `:`, `,` or `[`) are tried, so nothing nested inside a well-formed but
/// unfinished value is ever picked. Returns the byte offset of the value.
pub fn find_resync(text: &str, allow_arrays: bool) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut previous = *bytes.first()?;
    let mut in_string = false;
    let mut escape = false;

    for (i, &c) in bytes.iter().enumerate().skip(1) {
        if in_string {
            match (escape, c) {
                (true, _) => escape = false,
                (false, b'\\') => escape = true,
                (false, b'"') => in_string = false,
                _ => {}
            }
            previous = b'"';
            continue;
        }

        let opens = c == b'{' || (allow_arrays && c == b'[');
        if opens && !matches!(previous, b':' | b',' | b'[') {
            if let Some((0, end)) = find_balanced(&text[i..], allow_arrays) {
                if is_json(&text[i..i + end]) {
                    return Some(i);
                }
            }
        }
        if c == b'"' {
            in_string = true;
        }
        if !c.is_ascii_whitespace() {
            previous = c;
        }
    }

    None
}

fn balanced_end(bytes: &[u8]) -> Option<usize> {
    let (opening, closing) = match bytes.first()? {
        b'{' => (b'{', b'}'),
        b'[' => (b'[', b']'),
        _ => return None,
    };

    let mut count = 0i32;
    let mut in_string = false;
    let mut escape = false;

    for (i, &c) in bytes.iter().enumerate() {
        match (in_string, escape, c) {
            (true, false, b'\\') => escape = true,
            (true, true, _) => escape = false,
            (true, false, b'"') => in_string = false,
            (false, _, b'"') => in_string = true,
            (false, _, c) if c == opening => count += 1,
            (false, _, c) if c == closing => {
                count -= 1;
                if count == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }

    None
}
