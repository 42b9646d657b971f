//! Remote size probe.
//!
//! Learns the size the server declares for a resource without downloading
//! its body: a HEAD request, or a one-byte `Range: bytes=0-0` GET when the
//! server refuses HEAD (405/501).

mod parse;

pub(crate) use parse::{parse_headers, SizeHeaders};

use std::cell::{Cell, RefCell};
use std::str;

use crate::control::CancelToken;
use crate::http::{is_success, CurlOptions};
use crate::retry::TransferError;

/// What the remote declares about a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoteInfo {
    /// Declared total size; `None` when the server sends no usable size.
    pub size: Option<u64>,
}

/// Probes `url` for its declared size. Non-2xx answers are `TransferError::Http`.
/// Setting `cancel` aborts the request; the caller sees a curl error.
pub fn probe(
    url: &str,
    opts: &CurlOptions,
    cancel: &CancelToken,
) -> Result<RemoteInfo, TransferError> {
    let (code, lines) = head(url, opts, cancel)?;
    if is_success(code) {
        let headers = parse_headers(&lines);
        return Ok(RemoteInfo {
            size: headers.content_length,
        });
    }
    if code == 405 || code == 501 {
        tracing::debug!(url, code, "HEAD refused, probing with a one-byte range request");
        return probe_range(url, opts, cancel);
    }
    Err(TransferError::Http(code))
}

fn head(
    url: &str,
    opts: &CurlOptions,
    cancel: &CancelToken,
) -> Result<(u32, Vec<String>), TransferError> {
    let mut lines: Vec<String> = Vec::new();
    let mut easy = curl::easy::Easy::new();
    opts.apply(&mut easy, url)?;
    easy.nobody(true)?;
    easy.progress(true)?;
    {
        let mut transfer = easy.transfer();
        transfer.progress_function(|_, _, _, _| !cancel.is_cancelled())?;
        transfer.header_function(|data| {
            if let Ok(s) = str::from_utf8(data) {
                lines.push(s.trim_end().to_string());
            }
            true
        })?;
        transfer.perform()?;
    }
    let code = easy.response_code()?;
    Ok((code, lines))
}

/// GET with `Range: bytes=0-0`. A 206 carries the total in `Content-Range`;
/// a server that ignores the range answers 200 with the full `Content-Length`,
/// and we stop reading as soon as the body starts.
fn probe_range(
    url: &str,
    opts: &CurlOptions,
    cancel: &CancelToken,
) -> Result<RemoteInfo, TransferError> {
    let lines: RefCell<Vec<String>> = RefCell::new(Vec::new());
    let stopped_early = Cell::new(false);
    let mut easy = curl::easy::Easy::new();
    opts.apply(&mut easy, url)?;
    easy.range("0-0")?;
    easy.progress(true)?;
    let perform_result = {
        let mut transfer = easy.transfer();
        transfer.progress_function(|_, _, _, _| !cancel.is_cancelled())?;
        transfer.header_function(|data| {
            if let Ok(s) = str::from_utf8(data) {
                lines.borrow_mut().push(s.trim_end().to_string());
            }
            true
        })?;
        transfer.write_function(|data| {
            if data.len() > 1 {
                stopped_early.set(true);
                return Ok(0);
            }
            Ok(data.len())
        })?;
        transfer.perform()
    };
    match perform_result {
        Ok(()) => {}
        Err(e) if e.is_write_error() && stopped_early.get() => {}
        Err(e) => return Err(TransferError::Curl(e)),
    }

    let code = easy.response_code()?;
    if !is_success(code) {
        return Err(TransferError::Http(code));
    }
    let headers = parse_headers(&lines.into_inner());
    let size = if code == 206 {
        headers.content_range_total
    } else {
        headers.content_length
    };
    Ok(RemoteInfo { size })
}
