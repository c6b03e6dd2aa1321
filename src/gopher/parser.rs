/// Longest request line accepted before the client is told it sent a bad request.
pub const MAX_SELECTOR_LEN: usize = 8 * 1024;

#[derive(Debug, PartialEq, Eq)]
pub enum ParseError {
    /// No line terminator yet.
    Incomplete,
    /// Line exceeds [`MAX_SELECTOR_LEN`].
    TooLong,
    /// Selector is not UTF-8.
    InvalidEncoding,
}

/// Parses the single request line a Gopher client sends.
///
/// Returns the normalized selector and the number of bytes consumed,
/// including the line terminator.
pub fn parse_request_line(buf: &[u8]) -> Result<(String, usize), ParseError> {
    let line_end = match buf.iter().position(|&b| b == b'\n') {
        Some(pos) => pos,
        None if buf.len() > MAX_SELECTOR_LEN => return Err(ParseError::TooLong),
        None => return Err(ParseError::Incomplete),
    };

    if line_end > MAX_SELECTOR_LEN {
        return Err(ParseError::TooLong);
    }

    let selector = decode_line(&buf[..line_end])?;
    Ok((selector, line_end + 1))
}

/// Parses whatever is left in the buffer once the client stopped sending.
///
/// A client that half-closes without a terminator still gets an answer.
pub fn parse_unterminated(buf: &[u8]) -> Result<String, ParseError> {
    if buf.len() > MAX_SELECTOR_LEN {
        return Err(ParseError::TooLong);
    }
    decode_line(buf)
}

fn decode_line(line: &[u8]) -> Result<String, ParseError> {
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    let text = std::str::from_utf8(line).map_err(|_| ParseError::InvalidEncoding)?;
    Ok(normalize_selector(text))
}

/// Empty selectors become `/`, and every selector gets a leading `/`.
pub fn normalize_selector(selector: &str) -> String {
    if selector.is_empty() {
        return "/".to_string();
    }

    if selector.starts_with('/') {
        selector.to_string()
    } else {
        format!("/{selector}")
    }
}
