pub mod detect;
pub mod formats;
pub mod import;

/// File name component handed to adapters for extension and board-name hints.
pub(crate) fn file_name(path: &std::path::Path) -> Option<&str> {
    path.file_name().and_then(|name| name.to_str())
}
