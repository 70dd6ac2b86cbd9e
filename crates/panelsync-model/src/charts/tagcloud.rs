use panelsync_value::OpaqueValue;
use serde::{Deserialize, Serialize};

use super::{Chart, EsqlColumn};
use crate::defaults::AttachRole;

/// Tag cloud display fields
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TagcloudDisplay {
    /// `horizontal`, `vertical` or `angled`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orientation: Option<String>,

    /// Min and max font size
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<OpaqueValue>,
}

/// Tag cloud body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de> + AttachRole"))]
pub struct TagcloudBody<T> {
    /// Tag weight
    #[serde(deserialize_with = "crate::defaults::de::operation::one")]
    pub metric: T,

    /// Tag grouping
    #[serde(deserialize_with = "crate::defaults::de::grouping::one")]
    pub tag_by: T,
}

/// Lens `tagcloud` chart
pub type TagcloudChart = Chart<TagcloudDisplay, TagcloudBody<OpaqueValue>, TagcloudBody<EsqlColumn>>;
