//! Wire model of the detection backend payloads.
//!
//! Decoding is lenient: a bad box or frame record is dropped on its own and
//! never poisons the rest of the payload.

use serde::{Deserialize as _, Deserializer};
use serde_derive::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::Result;
use crate::point::TrackId;

/// One tracked box, reduced to what trajectory building needs
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BoxRecord {
    #[serde(deserialize_with = "deserialize_track_id")]
    pub id: TrackId,
    pub x: f64,
    pub y: f64,
}

/// All boxes reported for a single video frame
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FrameRecord {
    pub frame: u32,
    #[serde(default)]
    pub boxes: Vec<BoxRecord>,
}

impl FrameRecord {
    #[inline]
    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &BoxRecord> {
        self.boxes.iter()
    }
}

/// Body of `GET /videos/{task}/trajectories`
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct DetectionsPayload {
    #[serde(default)]
    pub detections: Vec<FrameRecord>,
}

impl DetectionsPayload {
    /// Strict decoding, any malformed entry fails the whole payload.
    pub fn from_json_strict(body: &str) -> Result<Self> {
        Ok(serde_json::from_str(body)?)
    }

    /// Lenient decoding from text. Unparseable text yields an empty payload.
    pub fn from_json(body: &str) -> Self {
        match serde_json::from_str::<Value>(body) {
            Ok(value) => Self::from_value(&value),
            Err(err) => {
                warn!("detections payload is not valid JSON: {}", err);
                Self::default()
            }
        }
    }

    /// Lenient decoding from an already parsed JSON document.
    pub fn from_value(value: &Value) -> Self {
        let records = match value.get("detections").and_then(Value::as_array) {
            Some(records) => records,
            None => {
                warn!("detections payload has no `detections` array");
                return Self::default();
            }
        };

        let detections = records
            .iter()
            .enumerate()
            .filter_map(|(idx, record)| {
                let frame = decode_frame(record);
                if frame.is_none() {
                    debug!("skipping frame record #{}: no usable frame index", idx);
                }
                frame
            })
            .collect();

        Self { detections }
    }
}

fn decode_frame(record: &Value) -> Option<FrameRecord> {
    let frame = record.get("frame").and_then(Value::as_u64)?;
    let frame = u32::try_from(frame).ok()?;

    let boxes = record
        .get("boxes")
        .and_then(Value::as_array)
        .map(|boxes| {
            boxes
                .iter()
                .filter_map(|b| {
                    let decoded = decode_box(b);
                    if decoded.is_none() {
                        debug!("skipping malformed box in frame {}: {}", frame, b);
                    }
                    decoded
                })
                .collect()
        })
        .unwrap_or_default();

    Some(FrameRecord { frame, boxes })
}

fn decode_box(value: &Value) -> Option<BoxRecord> {
    let id = value.get("id").and_then(track_id_from_value)?;
    let x = value.get("x").and_then(Value::as_f64)?;
    let y = value.get("y").and_then(Value::as_f64)?;

    if !x.is_finite() || !y.is_finite() {
        return None;
    }

    Some(BoxRecord { id, x, y })
}

/// Canonical string form of a JSON id, integral floats collapse to integers.
fn track_id_from_value(value: &Value) -> Option<TrackId> {
    match value {
        Value::String(s) if !s.is_empty() => Some(TrackId::new(s.as_str())),
        Value::Number(n) => {
            if let Some(v) = n.as_u64() {
                Some(v.into())
            } else if let Some(v) = n.as_i64() {
                Some(v.into())
            } else {
                let v = n.as_f64()?;
                if v.fract() == 0.0 && v.abs() < i64::MAX as f64 {
                    Some((v as i64).into())
                } else {
                    Some(TrackId::new(v.to_string()))
                }
            }
        }
        _ => None,
    }
}

fn deserialize_track_id<'de, D: Deserializer<'de>>(de: D) -> std::result::Result<TrackId, D::Error> {
    let value = Value::deserialize(de)?;

    track_id_from_value(&value)
        .ok_or_else(|| serde::de::Error::custom("expected a string or integer id"))
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Default for Resolution {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

/// Body of `GET /videos/{task}/metrics`, only the fields trajectories care about
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct VideoMetrics {
    #[serde(default)]
    pub processed_resolution: Option<Resolution>,
    #[serde(default)]
    pub processed_fps: Option<f64>,
    #[serde(default)]
    pub original_fps: Option<f64>,
}

impl VideoMetrics {
    /// Resolution the detections were produced at, 1280x720 when unknown.
    #[inline]
    pub fn resolution(&self) -> Resolution {
        self.processed_resolution.unwrap_or_default()
    }

    /// Playback rate of the analysed frames if the backend reported a usable one.
    pub fn frames_per_second(&self) -> Option<f64> {
        [self.processed_fps, self.original_fps]
            .into_iter()
            .flatten()
            .find(|fps| fps.is_finite() && *fps > 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_ids_are_canonicalized() {
        let payload = DetectionsPayload::from_json(
            r#"{"detections":[{"frame":3,"boxes":[
                {"id":7,"x":1.0,"y":2.0},
                {"id":"7","x":2.0,"y":3.0},
                {"id":8.0,"x":0,"y":0,"w":10,"h":20,"conf":0.9}
            ]}]}"#,
        );

        let ids: Vec<_> = payload.detections[0].iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["7", "7", "8"]);
    }

    #[test]
    fn malformed_boxes_are_dropped_individually() {
        let payload = DetectionsPayload::from_json(
            r#"{"detections":[
                {"frame":0,"boxes":[
                    {"id":1,"x":"abc","y":2.0},
                    {"id":1,"y":2.0},
                    {"x":1.0,"y":2.0},
                    {"id":null,"x":1.0,"y":2.0},
                    {"id":2,"x":5.5,"y":6.5},
                    42
                ]},
                {"boxes":[{"id":3,"x":0,"y":0}]},
                {"frame":-1,"boxes":[{"id":3,"x":0,"y":0}]},
                {"frame":4,"boxes":"oops"}
            ]}"#,
        );

        assert_eq!(payload.detections.len(), 2);
        assert_eq!(
            payload.detections[0].boxes,
            vec![BoxRecord {
                id: "2".into(),
                x: 5.5,
                y: 6.5
            }]
        );
        assert_eq!(payload.detections[1].frame, 4);
        assert!(payload.detections[1].is_empty());
    }

    #[test]
    fn garbage_text_is_empty() {
        assert!(DetectionsPayload::from_json("<html>502</html>")
            .detections
            .is_empty());
        assert!(DetectionsPayload::from_json(r#"{"status":"pending"}"#)
            .detections
            .is_empty());
    }

    #[test]
    fn strict_decoding_reports_errors() {
        assert!(DetectionsPayload::from_json_strict(r#"{"detections":[{"frame":"x"}]}"#).is_err());

        let payload = DetectionsPayload::from_json_strict(
            r#"{"detections":[{"frame":1,"boxes":[{"id":5,"x":1.5,"y":2.5}]}]}"#,
        )
        .unwrap();
        assert_eq!(payload.detections[0].boxes[0].id.as_str(), "5");
    }

    #[test]
    fn metrics_fps_preference() {
        let metrics: VideoMetrics = serde_json::from_str(
            r#"{"processed_resolution":{"width":640,"height":480},"processed_fps":0,"original_fps":25.0}"#,
        )
        .unwrap();

        assert_eq!(metrics.frames_per_second(), Some(25.0));
        assert_eq!(
            metrics.resolution(),
            Resolution {
                width: 640,
                height: 480
            }
        );
        assert_eq!(VideoMetrics::default().resolution().width, 1280);
        assert_eq!(VideoMetrics::default().frames_per_second(), None);
    }
}
