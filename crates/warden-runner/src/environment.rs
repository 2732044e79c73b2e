//! Inherit-and-extend environment construction.

use std::collections::BTreeMap;
use std::ffi::OsString;

/// Appends `overrides` to the `ambient` environment.
///
/// Entries are not deduplicated: an override for a variable already present
/// in `ambient` appears twice, and the spawn applies them in order so the
/// later value wins. The process-wide environment is never touched.
#[must_use]
pub fn merge_environment<I>(
    ambient: I,
    overrides: &BTreeMap<String, String>,
) -> Vec<(OsString, OsString)>
where
    I: IntoIterator<Item = (OsString, OsString)>,
{
    ambient
        .into_iter()
        .chain(
            overrides
                .iter()
                .map(|(key, value)| (OsString::from(key), OsString::from(value))),
        )
        .collect()
}
