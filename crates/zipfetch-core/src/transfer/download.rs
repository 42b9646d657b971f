//! Streamed GET of one resource into `<final>.part`, then rename into place.

use std::cell::RefCell;
use std::io;
use std::path::Path;
use std::str;

use crate::control::CancelToken;
use crate::http::{is_success, CurlOptions};
use crate::remote_probe::parse_headers;
use crate::retry::TransferError;
use crate::storage::{self, remove_quietly, StorageWriter};

/// How a body transfer ended when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Fetched {
    Complete { bytes: u64 },
    Cancelled,
}

enum StreamEnd {
    Complete,
    Cancelled,
}

/// Downloads `url` to `final_path`. The final name is only touched by the
/// rename at the very end; on any failure or cancellation the `.part` file is
/// removed and whatever was at `final_path` before is left as it was.
pub(crate) fn fetch_to(
    url: &str,
    final_path: &Path,
    opts: &CurlOptions,
    cancel: &CancelToken,
) -> Result<Fetched, TransferError> {
    let temp = storage::temp_path(final_path);
    let mut writer = StorageWriter::create(&temp).map_err(TransferError::Storage)?;

    match stream_body(url, opts, cancel, &mut writer) {
        Ok(StreamEnd::Complete) => {
            let bytes = writer.written();
            if let Err(e) = writer.finalize(final_path) {
                remove_quietly(&temp);
                return Err(TransferError::Storage(e));
            }
            Ok(Fetched::Complete { bytes })
        }
        Ok(StreamEnd::Cancelled) => {
            writer.discard();
            Ok(Fetched::Cancelled)
        }
        Err(e) => {
            writer.discard();
            Err(e)
        }
    }
}

fn stream_body(
    url: &str,
    opts: &CurlOptions,
    cancel: &CancelToken,
    writer: &mut StorageWriter,
) -> Result<StreamEnd, TransferError> {
    let lines: RefCell<Vec<String>> = RefCell::new(Vec::new());
    let mut storage_error: Option<io::Error> = None;

    let mut easy = curl::easy::Easy::new();
    opts.apply(&mut easy, url)?;
    // Error statuses end the transfer before any body byte reaches the writer.
    easy.fail_on_error(true)?;
    easy.progress(true)?;

    let perform_result = {
        let mut transfer = easy.transfer();
        transfer.header_function(|data| {
            if let Ok(s) = str::from_utf8(data) {
                lines.borrow_mut().push(s.trim_end().to_string());
            }
            true
        })?;
        transfer.progress_function(|_, _, _, _| !cancel.is_cancelled())?;
        transfer.write_function(|data| {
            if writer.written() == 0 {
                if let Some(len) = parse_headers(&lines.borrow()).content_length {
                    if let Err(e) = writer.preallocate(len) {
                        storage_error = Some(e);
                        return Ok(0);
                    }
                }
            }
            match writer.write_chunk(data) {
                Ok(()) => Ok(data.len()),
                Err(e) => {
                    storage_error = Some(e);
                    Ok(0)
                }
            }
        })?;
        transfer.perform()
    };

    if let Err(e) = perform_result {
        if cancel.is_cancelled() {
            return Ok(StreamEnd::Cancelled);
        }
        if e.is_http_returned_error() {
            return Err(TransferError::Http(easy.response_code()?));
        }
        if let Some(io_err) = storage_error.take() {
            return Err(TransferError::Storage(io_err));
        }
        return Err(TransferError::Curl(e));
    }

    let code = easy.response_code()?;
    if !is_success(code) {
        return Err(TransferError::Http(code));
    }

    let received = writer.written();
    if let Some(expected) = parse_headers(&lines.into_inner()).content_length {
        if received != expected {
            return Err(TransferError::PartialTransfer { expected, received });
        }
    }
    Ok(StreamEnd::Complete)
}
