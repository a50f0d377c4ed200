//! CLI command implementations.

pub(crate) mod check;
pub(crate) mod components;
pub(crate) mod render;

use std::io::Read;
use std::path::Path;

pub(crate) use check::CheckArgs;
pub(crate) use components::ComponentsArgs;
pub(crate) use render::RenderArgs;

/// Read a markdown document from a file, or from stdin when `path` is `-`.
fn read_input(path: &Path) -> std::io::Result<String> {
    if path == Path::new("-") {
        let mut input = String::new();
        std::io::stdin().lock().read_to_string(&mut input)?;
        Ok(input)
    } else {
        std::fs::read_to_string(path)
    }
}
