//! Identifier-to-path mapping shared by the file-backed stores.

use dsc_core::{canonical, DscError, DscResult};

/// Storage path component for an identifier.
///
/// Returns the canonical form of `id`, or a validation error when `id` could
/// name anything other than a single entry inside the store directory.
pub(crate) fn component(kind: &str, id: &str) -> DscResult<String> {
    if id.contains(['/', '\\', '\0']) || id.contains("..") {
        return Err(DscError::validation(format!("invalid {kind}: {id}")));
    }
    Ok(canonical(id))
}
