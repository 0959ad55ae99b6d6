use serde_json::Value;
use std::io::{self, Read};
use tracing::debug;

/// The bond request piped on stdin, if any. An interactive terminal or an
/// empty pipe gives `None` so the caller can report the missing input.
pub fn read_stdin() -> Result<Option<Value>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut body = String::new();
    io::stdin().lock().read_to_string(&mut body)?;

    match body.trim() {
        "" => Ok(None),
        request => {
            debug!(bytes = request.len(), "read request from stdin");
            super::parse_request("stdin", request).map(Some)
        }
    }
}
