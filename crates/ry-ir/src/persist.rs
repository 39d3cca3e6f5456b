//! JSON persistence of layouts.

use std::fs;
use std::path::Path;

use crate::error::{LayoutError, LayoutResult};
use crate::layout::Layout;

/// Serialize a layout to pretty-printed JSON.
pub fn to_json(layout: &Layout) -> LayoutResult<String> {
    Ok(serde_json::to_string_pretty(layout)?)
}

/// Parse a layout, backfilling missing optional fields and validating
/// pattern references.
pub fn from_json(json: &str) -> LayoutResult<Layout> {
    let layout: Layout = serde_json::from_str(json)?;
    validate(&layout)?;
    Ok(layout)
}

/// Check the invariants the scheduler relies on.
pub fn validate(layout: &Layout) -> LayoutResult<()> {
    if layout.patterns.is_empty() {
        return Err(LayoutError::CorruptLayout("pattern list is empty".into()));
    }
    if let Some((bar, index)) = layout
        .arrangement
        .iter()
        .enumerate()
        .find_map(|(bar, entry)| entry.filter(|i| *i >= layout.patterns.len()).map(|i| (bar, i)))
    {
        return Err(LayoutError::CorruptLayout(format!(
            "bar {bar} references pattern {index} but only {} exist",
            layout.patterns.len()
        )));
    }
    Ok(())
}

pub fn save(path: &Path, layout: &Layout) -> LayoutResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, to_json(layout)?)?;
    Ok(())
}

pub fn load(path: &Path) -> LayoutResult<Layout> {
    let json = fs::read_to_string(path)?;
    from_json(&json)
}

/// Load a layout, falling back to the default layout when the file is
/// missing, unreadable or corrupt.
pub fn load_or_default(path: &Path) -> Layout {
    match load(path) {
        Ok(layout) => layout,
        Err(e) => {
            log::warn!(target: "layout", "{}: {e}; using default layout", path.display());
            Layout::default()
        }
    }
}
