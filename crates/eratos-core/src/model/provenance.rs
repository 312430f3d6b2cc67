use super::serde_helpers::one_or_many;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A cited span of source media.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawProvenance", into = "RawProvenance")]
pub struct ProvenanceDatum {
    pub id: String,
    pub child_id: Option<String>,
    pub parent_ids: Vec<String>,
    pub media_type: String,
    pub span: MediaSpan,
    pub extra: Map<String, Value>,
}

/// Media-specific location, chosen by the `mediaType` prefix.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaSpan {
    Text {
        offset: Option<i64>,
        length: Option<i64>,
    },
    /// `video/*` and `image/*`.
    Visual {
        bounding_box: Vec<f64>,
        keyframes: Vec<i64>,
        start_time: Option<f64>,
        end_time: Option<f64>,
    },
    Audio {
        start_time: Option<f64>,
        end_time: Option<f64>,
    },
    Other,
}

impl ProvenanceDatum {
    pub fn text(id: impl Into<String>, offset: i64, length: i64) -> Self {
        Self {
            id: id.into(),
            child_id: None,
            parent_ids: Vec::new(),
            media_type: "text/plain".to_string(),
            span: MediaSpan::Text {
                offset: Some(offset),
                length: Some(length),
            },
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RawProvenance {
    #[serde(rename = "provenanceID")]
    id: String,
    #[serde(rename = "childID", default, skip_serializing_if = "Option::is_none")]
    child_id: Option<String>,
    #[serde(
        rename = "parentIDs",
        default,
        deserialize_with = "one_or_many",
        skip_serializing_if = "Vec::is_empty"
    )]
    parent_ids: Vec<String>,
    #[serde(rename = "mediaType", default)]
    media_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    offset: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    length: Option<i64>,
    #[serde(
        rename = "boundingBox",
        default,
        deserialize_with = "one_or_many",
        skip_serializing_if = "Vec::is_empty"
    )]
    bounding_box: Vec<f64>,
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    keyframes: Vec<i64>,
    #[serde(rename = "startTime", default, skip_serializing_if = "Option::is_none")]
    start_time: Option<f64>,
    #[serde(rename = "endTime", default, skip_serializing_if = "Option::is_none")]
    end_time: Option<f64>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

fn put<T: Serialize>(extra: &mut Map<String, Value>, key: &str, value: T) {
    if let Ok(v) = serde_json::to_value(value) {
        if !v.is_null() && v.as_array().is_none_or(|a| !a.is_empty()) {
            extra.insert(key.to_string(), v);
        }
    }
}

impl From<RawProvenance> for ProvenanceDatum {
    fn from(raw: RawProvenance) -> Self {
        let mut extra = raw.extra;
        let kind = raw.media_type.split('/').next().unwrap_or("");
        // Fields that do not belong to the media kind are kept verbatim.
        let span = match kind {
            "text" => {
                put(&mut extra, "boundingBox", raw.bounding_box);
                put(&mut extra, "keyframes", raw.keyframes);
                put(&mut extra, "startTime", raw.start_time);
                put(&mut extra, "endTime", raw.end_time);
                MediaSpan::Text {
                    offset: raw.offset,
                    length: raw.length,
                }
            }
            "video" | "image" => {
                put(&mut extra, "offset", raw.offset);
                put(&mut extra, "length", raw.length);
                MediaSpan::Visual {
                    bounding_box: raw.bounding_box,
                    keyframes: raw.keyframes,
                    start_time: raw.start_time,
                    end_time: raw.end_time,
                }
            }
            "audio" => {
                put(&mut extra, "offset", raw.offset);
                put(&mut extra, "length", raw.length);
                put(&mut extra, "boundingBox", raw.bounding_box);
                put(&mut extra, "keyframes", raw.keyframes);
                MediaSpan::Audio {
                    start_time: raw.start_time,
                    end_time: raw.end_time,
                }
            }
            _ => {
                put(&mut extra, "offset", raw.offset);
                put(&mut extra, "length", raw.length);
                put(&mut extra, "boundingBox", raw.bounding_box);
                put(&mut extra, "keyframes", raw.keyframes);
                put(&mut extra, "startTime", raw.start_time);
                put(&mut extra, "endTime", raw.end_time);
                MediaSpan::Other
            }
        };
        Self {
            id: raw.id,
            child_id: raw.child_id,
            parent_ids: raw.parent_ids,
            media_type: raw.media_type,
            span,
            extra,
        }
    }
}

impl From<ProvenanceDatum> for RawProvenance {
    fn from(p: ProvenanceDatum) -> Self {
        let mut raw = RawProvenance {
            id: p.id,
            child_id: p.child_id,
            parent_ids: p.parent_ids,
            media_type: p.media_type,
            extra: p.extra,
            ..Default::default()
        };
        match p.span {
            MediaSpan::Text { offset, length } => {
                raw.offset = offset;
                raw.length = length;
            }
            MediaSpan::Visual {
                bounding_box,
                keyframes,
                start_time,
                end_time,
            } => {
                raw.bounding_box = bounding_box;
                raw.keyframes = keyframes;
                raw.start_time = start_time;
                raw.end_time = end_time;
            }
            MediaSpan::Audio {
                start_time,
                end_time,
            } => {
                raw.start_time = start_time;
                raw.end_time = end_time;
            }
            MediaSpan::Other => {}
        }
        raw
    }
}
