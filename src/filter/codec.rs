// SPDX-License-Identifier: GPL-3.0-only

//! Filter ↔ persisted record mapping
//!
//! A record is `(owner, type tag, name, JSON parameter blob)`. Decoding
//! dispatches on the tag: an unknown tag yields `None` so newer catalogs
//! still load, while a known tag with a malformed blob is a [`DecodeError`]
//! that only costs that one filter.

pub use crate::persistence::PersistedFilterRecord;

use super::{ColorAdjustment, Filter, FilterKind, FilterTag};
use crate::errors::{DecodeError, PersistenceError};
use crate::persistence::PersistenceGateway;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

/// Flatten a filter into a record owned by `owner_image_id`
///
/// The blob is the variant's parameter struct, the same schema `decode`
/// reads back.
pub fn encode(
    filter: &Filter,
    owner_image_id: i64,
) -> Result<PersistedFilterRecord, PersistenceError> {
    Ok(PersistedFilterRecord {
        owner_image_id,
        type_tag: filter.tag().as_str().to_string(),
        name: filter.name().to_string(),
        parameter_blob: filter.kind().to_json()?,
    })
}

/// Rebuild a filter from its record
///
/// Returns `Ok(None)` for tags this build does not know.
pub fn decode(record: &PersistedFilterRecord) -> Result<Option<Filter>, DecodeError> {
    let Ok(tag) = record.type_tag.parse::<FilterTag>() else {
        debug!(tag = %record.type_tag, "Skipping filter with unknown tag");
        return Ok(None);
    };

    let blob = record.parameter_blob.as_str();
    let parsed = match tag {
        FilterTag::Saturation => FilterKind::Saturation(parse(tag, blob)?),
        FilterTag::Brightness => FilterKind::Brightness(parse(tag, blob)?),
        FilterTag::Contrast => FilterKind::Contrast(parse(tag, blob)?),
        FilterTag::Warmth => FilterKind::Warmth(parse(tag, blob)?),
        FilterTag::Sepia => FilterKind::Sepia(parse(tag, blob)?),
    };

    // Re-apply through the control surface so stored values get the same
    // range checks as edits made in the editor
    let mut filter = Filter::with_name(record.name.clone(), tag.default_kind());
    for control in Filter::new(parsed).describe_controls() {
        filter
            .set_control(control.key, control.value)
            .map_err(|e| DecodeError::MalformedBlob {
                tag: tag.as_str().to_string(),
                reason: e.to_string(),
            })?;
    }

    Ok(Some(filter))
}

fn parse<T: DeserializeOwned>(tag: FilterTag, blob: &str) -> Result<T, DecodeError> {
    serde_json::from_str(blob).map_err(|e| DecodeError::MalformedBlob {
        tag: tag.as_str().to_string(),
        reason: e.to_string(),
    })
}

/// Load an image's filters in persisted order
///
/// Records that fail to decode are logged and dropped; the rest still load.
pub fn decode_all(
    gateway: &dyn PersistenceGateway,
    owner_image_id: i64,
) -> Result<Vec<Filter>, PersistenceError> {
    let records = gateway.get_filter_records(owner_image_id)?;
    let total = records.len();

    let filters: Vec<Filter> = records
        .iter()
        .filter_map(|record| match decode(record) {
            Ok(filter) => filter,
            Err(e) => {
                warn!(owner_image_id, error = %e, "Dropping corrupt filter record");
                None
            }
        })
        .collect();

    debug!(owner_image_id, total, loaded = filters.len(), "Filters loaded");
    Ok(filters)
}

/// Replace the stored stack of an image with `filters`
pub fn save_all<'a>(
    gateway: &dyn PersistenceGateway,
    owner_image_id: i64,
    filters: impl IntoIterator<Item = &'a Filter>,
) -> Result<(), PersistenceError> {
    let records = filters
        .into_iter()
        .map(|f| encode(f, owner_image_id))
        .collect::<Result<Vec<_>, _>>()?;
    gateway.replace_filter_records(owner_image_id, &records)
}
