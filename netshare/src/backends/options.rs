//! Per-volume option merging.

use std::borrow::Cow;

use netshare_shared::protocol::VolumeOptions;

static EMPTY_OPTIONS: VolumeOptions = VolumeOptions::new();

/// Shallow merge of per-volume options over backend defaults.
///
/// For each key the per-volume value wins wholesale; keys present on only one
/// side are kept. Borrows instead of allocating when either side is empty.
pub fn merge_options<'a>(
    specific: &'a VolumeOptions,
    defaults: &'a VolumeOptions,
) -> Cow<'a, VolumeOptions> {
    match (specific.is_empty(), defaults.is_empty()) {
        (true, true) => Cow::Borrowed(&EMPTY_OPTIONS),
        (true, false) => Cow::Borrowed(defaults),
        (false, true) => Cow::Borrowed(specific),
        (false, false) => {
            let mut merged = defaults.clone();
            merged.extend(specific.iter().map(|(k, v)| (k.clone(), v.clone())));
            Cow::Owned(merged)
        }
    }
}
