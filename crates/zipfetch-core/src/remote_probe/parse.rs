//! Parse HTTP response header lines into the size fields we need.

/// Size-related headers of the *last* response in a redirect chain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct SizeHeaders {
    /// `Content-Length`, if present and numeric.
    pub content_length: Option<u64>,
    /// Total from `Content-Range: bytes a-b/total`, if present and not `*`.
    pub content_range_total: Option<u64>,
}

/// Parse collected header lines. Curl hands us the headers of every response
/// when following redirects; a status line starts a new block, so only the
/// final response's values survive.
pub(crate) fn parse_headers(lines: &[String]) -> SizeHeaders {
    let mut out = SizeHeaders::default();

    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.get(..5).is_some_and(|p| p.eq_ignore_ascii_case("HTTP/")) {
            out = SizeHeaders::default();
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim();
            let value = value.trim();
            if name.eq_ignore_ascii_case("content-length") {
                out.content_length = value.parse::<u64>().ok();
            } else if name.eq_ignore_ascii_case("content-range") {
                out.content_range_total = parse_content_range_total(value);
            }
        }
    }

    out
}

/// `bytes 0-0/1234` → `Some(1234)`; `bytes */1234` → `Some(1234)`; `bytes 0-0/*` → `None`.
fn parse_content_range_total(value: &str) -> Option<u64> {
    let (_, total) = value.rsplit_once('/')?;
    total.trim().parse::<u64>().ok()
}
