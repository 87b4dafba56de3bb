/// Minimal multipart/form-data parsing for the prediction upload.

/// Returns the index of the first occurrence of `needle` in `haystack`.
pub fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Splits `haystack` on every occurrence of `needle`, returning the pieces
/// between occurrences (excluding the needle itself).
pub fn split_on<'a>(haystack: &'a [u8], needle: &[u8]) -> Vec<&'a [u8]> {
    let mut result = Vec::new();
    let mut start = 0;
    while start <= haystack.len() {
        if let Some(pos) = find_subsequence(&haystack[start..], needle) {
            result.push(&haystack[start..start + pos]);
            start += pos + needle.len();
        } else {
            result.push(&haystack[start..]);
            break;
        }
    }
    result
}

/// Extracts the boundary token from a Content-Type header value like
/// `multipart/form-data; boundary=----WebKitFormBoundaryXXX`.
pub fn extract_boundary(content_type: &str) -> Option<String> {
    content_type
        .split(';')
        .map(|s| s.trim())
        .find(|s| s.get(..9).is_some_and(|k| k.eq_ignore_ascii_case("boundary=")))
        .map(|s| s[9..].trim_matches('"').to_owned())
        .filter(|b| !b.is_empty())
}

/// One body part of a multipart request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    /// `name` parameter of Content-Disposition.
    pub name: String,
    /// `filename` parameter; present (possibly empty) only for file inputs.
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

/// Parses every well-formed part of `body`. Malformed parts are skipped.
pub fn parse_parts(body: &[u8], boundary: &str) -> Vec<Part> {
    let delimiter = format!("--{}", boundary);
    let pieces = split_on(body, delimiter.as_bytes());

    // pieces[0] is the preamble; a piece starting with "--" is the epilogue.
    pieces
        .into_iter()
        .skip(1)
        .take_while(|piece| !piece.starts_with(b"--"))
        .filter_map(parse_part)
        .collect()
}

/// Returns the first file part uploaded under `field`.
pub fn find_file_part(body: &[u8], boundary: &str, field: &str) -> Option<Part> {
    parse_parts(body, boundary)
        .into_iter()
        .find(|p| p.name == field && p.filename.is_some())
}

fn parse_part(piece: &[u8]) -> Option<Part> {
    let sep = b"\r\n\r\n";
    let piece = piece.strip_prefix(b"\r\n").unwrap_or(piece);

    // A part with no headers starts directly with the blank line.
    let (header_section, data_start) = if piece.starts_with(b"\r\n") {
        (&piece[..0], 2)
    } else {
        let pos = find_subsequence(piece, sep)?;
        (&piece[..pos], pos + sep.len())
    };
    let raw = &piece[data_start..];
    let data = raw.strip_suffix(b"\r\n").unwrap_or(raw);

    let headers = String::from_utf8_lossy(header_section);
    let mut name = None;
    let mut filename = None;
    let mut content_type = None;

    for line in headers.split("\r\n") {
        let Some((key, value)) = line.split_once(':') else { continue };
        let key = key.trim();
        if key.eq_ignore_ascii_case("Content-Disposition") {
            for (param, val) in disposition_params(value) {
                if param.eq_ignore_ascii_case("name") {
                    name = Some(val);
                } else if param.eq_ignore_ascii_case("filename") {
                    filename = Some(val);
                }
            }
        } else if key.eq_ignore_ascii_case("Content-Type") {
            content_type = Some(value.trim().to_owned());
        }
    }

    Some(Part { name: name?, filename, content_type, data: data.to_vec() })
}

/// Splits `form-data; name="a"; filename="b;c.jpg"` into `(key, value)`
/// pairs, honouring quotes and backslash escapes inside them.
fn disposition_params(value: &str) -> Vec<(String, String)> {
    let mut params = Vec::new();
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escaped = false;

    for c in value.chars() {
        match c {
            _ if escaped => {
                current.push(c);
                escaped = false;
            }
            '\\' if in_quotes => escaped = true,
            '"' => {
                in_quotes = !in_quotes;
                current.push(c);
            }
            ';' if !in_quotes => segments.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    segments.push(current);

    for segment in segments {
        if let Some((key, val)) = segment.split_once('=') {
            let val = val.trim();
            let val = val
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .unwrap_or(val);
            params.push((key.trim().to_owned(), val.to_owned()));
        }
    }
    params
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOUNDARY: &str = "----WebKitFormBoundary7MA4YWxkTrZu0gW";

    fn body(parts: &[(&str, &[u8])]) -> Vec<u8> {
        let mut out = Vec::new();
        for (headers, data) in parts {
            out.extend_from_slice(format!("--{}\r\n{}\r\n\r\n", BOUNDARY, headers).as_bytes());
            out.extend_from_slice(data);
            out.extend_from_slice(b"\r\n");
        }
        out.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        out
    }

    #[test]
    fn extracts_boundary() {
        assert_eq!(
            extract_boundary("multipart/form-data; boundary=\"abc\"").as_deref(),
            Some("abc")
        );
        assert_eq!(extract_boundary("multipart/form-data").as_deref(), None);
    }

    #[test]
    fn finds_named_file_part_with_binary_data() {
        let data: &[u8] = &[0xFF, 0xD8, b'\r', b'\n', 0x00, 0xD9];
        let b = body(&[
            ("Content-Disposition: form-data; name=\"note\"", b"hello"),
            (
                "Content-Disposition: form-data; name=\"file\"; filename=\"cap;1.jpg\"\r\nContent-Type: image/jpeg",
                data,
            ),
        ]);

        let part = find_file_part(&b, BOUNDARY, "file").unwrap();
        assert_eq!(part.filename.as_deref(), Some("cap;1.jpg"));
        assert_eq!(part.content_type.as_deref(), Some("image/jpeg"));
        assert_eq!(part.data, data);
    }

    #[test]
    fn field_name_is_not_confused_with_filename() {
        let b = body(&[(
            "Content-Disposition: form-data; name=\"upload\"; filename=\"file\"\r\nContent-Type: image/png",
            b"x",
        )]);
        assert!(find_file_part(&b, BOUNDARY, "file").is_none());
    }

    #[test]
    fn keeps_empty_filename() {
        let b = body(&[(
            "Content-Disposition: form-data; name=\"file\"; filename=\"\"\r\nContent-Type: application/octet-stream",
            b"",
        )]);
        let part = find_file_part(&b, BOUNDARY, "file").unwrap();
        assert_eq!(part.filename.as_deref(), Some(""));
        assert!(part.data.is_empty());
    }

    #[test]
    fn text_field_is_not_a_file() {
        let b = body(&[("Content-Disposition: form-data; name=\"file\"", b"just text")]);
        assert!(find_file_part(&b, BOUNDARY, "file").is_none());
        assert_eq!(parse_parts(&b, BOUNDARY).len(), 1);
    }
}
