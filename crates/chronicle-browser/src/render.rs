//! Rendering readings into the text container.

use chronicle_core::{PlatformError, ReadingToken};
use chronicle_core::selection::READING_SEPARATOR;

/// Class carried by every reading span.
pub const READING_CLASS: &str = "reading";

/// Class marking readings covered by the active selection.
pub const SELECTED_CLASS: &str = "selected";

/// Replace the container's content with one span per reading.
///
/// Readings are separated by bare whitespace text nodes, which is what the
/// selection reader expects to find between them.
pub fn render_readings(
    container: &web_sys::Element,
    readings: &[ReadingToken],
) -> Result<(), PlatformError> {
    let document = container.owner_document().ok_or("container is detached")?;
    container.set_text_content(None);

    for (idx, reading) in readings.iter().enumerate() {
        if idx > 0 {
            let gap = document.create_text_node(READING_SEPARATOR);
            container
                .append_child(&gap)
                .map_err(|e| format!("append_child failed: {:?}", e))?;
        }

        let span = document
            .create_element("span")
            .map_err(|e| format!("create_element failed: {:?}", e))?;
        span.set_class_name(READING_CLASS);
        span.set_id(&reading.id.to_string());
        span.set_text_content(Some(&reading.text));
        container
            .append_child(&span)
            .map_err(|e| format!("append_child failed: {:?}", e))?;
    }

    tracing::debug!(
        target: "chronicle::render",
        count = readings.len(),
        "rendered readings"
    );
    Ok(())
}
