use crate::error::UnescapeError;

/// Decode backslash escape sequences into the characters they stand for.
///
/// Recognised: `\\ \' \" \a \b \f \n \r \t \v`, backslash-newline (dropped),
/// octal `\o`..`\ooo`, `\xhh`, `\uXXXX` and `\UXXXXXXXX`. A `\u` high
/// surrogate followed by a `\u` low surrogate is combined into one character.
/// Any other escape is kept as written. Characters outside escapes, including
/// non-ASCII ones, pass through untouched.
pub fn unescape(input: &str) -> Result<String, UnescapeError> {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c != '\\' {
            out.push(c);
            i += 1;
            continue;
        }

        let start = i;
        let Some(&next) = chars.get(i + 1) else {
            return Err(UnescapeError::TrailingBackslash);
        };
        i += 2;

        match next {
            '\n' => {}
            '\\' => out.push('\\'),
            '\'' => out.push('\''),
            '"' => out.push('"'),
            'a' => out.push('\u{07}'),
            'b' => out.push('\u{08}'),
            'f' => out.push('\u{0c}'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'v' => out.push('\u{0b}'),
            '0'..='7' => {
                let mut value = next.to_digit(8).unwrap_or_default();
                let mut taken = 1;
                while taken < 3 {
                    match chars.get(i).and_then(|d| d.to_digit(8)) {
                        Some(d) => {
                            value = value * 8 + d;
                            i += 1;
                            taken += 1;
                        }
                        None => break,
                    }
                }
                out.push(code_point(value, start)?);
            }
            'x' => {
                let value = hex_digits(&chars, i, 2, 'x', start)?;
                i += 2;
                out.push(code_point(value, start)?);
            }
            'u' => {
                let value = hex_digits(&chars, i, 4, 'u', start)?;
                i += 4;
                if (0xD800..0xDC00).contains(&value) {
                    let low = low_surrogate(&chars, i).ok_or(UnescapeError::InvalidCodePoint {
                        position: start,
                    })?;
                    i += 6;
                    let combined = 0x10000 + ((value - 0xD800) << 10) + (low - 0xDC00);
                    out.push(code_point(combined, start)?);
                } else {
                    out.push(code_point(value, start)?);
                }
            }
            'U' => {
                let value = hex_digits(&chars, i, 8, 'U', start)?;
                i += 8;
                out.push(code_point(value, start)?);
            }
            'N' => return Err(UnescapeError::NamedEscape { position: start }),
            other => {
                out.push('\\');
                out.push(other);
            }
        }
    }

    Ok(out)
}

fn hex_digits(
    chars: &[char],
    from: usize,
    count: usize,
    escape: char,
    position: usize,
) -> Result<u32, UnescapeError> {
    let digits = chars
        .get(from..from + count)
        .ok_or(UnescapeError::Truncated { escape, position })?;

    digits.iter().try_fold(0u32, |acc, d| {
        d.to_digit(16)
            .map(|v| acc * 16 + v)
            .ok_or(UnescapeError::Truncated { escape, position })
    })
}

/// Value of a `\uDC00`..`\uDFFF` escape starting at `from`, if there is one.
fn low_surrogate(chars: &[char], from: usize) -> Option<u32> {
    if chars.get(from) != Some(&'\\') || chars.get(from + 1) != Some(&'u') {
        return None;
    }
    let value = hex_digits(chars, from + 2, 4, 'u', from).ok()?;
    (0xDC00..0xE000).contains(&value).then_some(value)
}

fn code_point(value: u32, position: usize) -> Result<char, UnescapeError> {
    char::from_u32(value).ok_or(UnescapeError::InvalidCodePoint { position })
}
