//! Rendering of handled requests for the command line.

use anyhow::Result;
use std::io::Write;
use tracing::debug;

use crate::api::ApiResponse;

/// Serializes a response body as compact or indented JSON.
pub fn render_body(response: &ApiResponse, pretty: bool) -> Result<String> {
    let text = if pretty {
        serde_json::to_string_pretty(&response.body)?
    } else {
        serde_json::to_string(&response.body)?
    };
    Ok(text)
}

/// Writes the response body followed by a newline.
pub fn write_response<W: Write>(mut writer: W, response: &ApiResponse, pretty: bool) -> Result<()> {
    debug!(status = response.status, "Writing response");
    writeln!(writer, "{}", render_body(response, pretty)?)?;
    writer.flush()?;
    Ok(())
}
