use std::collections::HashMap;

use tracing::debug;

use crate::detection::{DetectionsPayload, FrameRecord, Resolution};
use crate::point::{Point, TrackId};

pub type Trajectories = HashMap<TrackId, Vec<Point>>;

/// Per-object point sequences rebuilt from one detections payload.
///
/// Points keep the order they were encountered in, sorting by frame is left
/// to the analyzer. Ids are remembered in first-seen order so listings and
/// default selections are stable across rebuilds of the same payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrajectoryStore {
    trajectories: Trajectories,
    order: Vec<TrackId>,
    total_frames: u32,
}

impl TrajectoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build(frames: &[FrameRecord]) -> Self {
        let mut store = Self::new();

        for record in frames {
            store.total_frames = store.total_frames.max(record.frame);

            for b in record.iter() {
                store.push(b.id.clone(), Point::at(b.x, b.y, record.frame));
            }
        }

        debug!(
            "built {} trajectories from {} frame records (total frames {})",
            store.order.len(),
            frames.len(),
            store.total_frames
        );

        store
    }

    #[inline]
    pub fn from_payload(payload: &DetectionsPayload) -> Self {
        Self::build(&payload.detections)
    }

    /// Builds from a raw response body, malformed bodies give an empty store.
    #[inline]
    pub fn from_json(body: &str) -> Self {
        Self::from_payload(&DetectionsPayload::from_json(body))
    }

    /// Appends a point, duplicates of an existing (id, frame) are kept.
    pub fn push(&mut self, id: TrackId, point: Point) {
        if let Some(frame) = point.frame {
            self.total_frames = self.total_frames.max(frame);
        }

        match self.trajectories.get_mut(&id) {
            Some(points) => points.push(point),
            None => {
                self.order.push(id.clone());
                self.trajectories.insert(id, vec![point]);
            }
        }
    }

    /// Largest frame index seen, 0 for an empty store.
    #[inline]
    pub fn total_frames(&self) -> u32 {
        self.total_frames
    }

    #[inline]
    pub fn trajectories(&self) -> &Trajectories {
        &self.trajectories
    }

    #[inline]
    pub fn into_parts(self) -> (Trajectories, u32) {
        (self.trajectories, self.total_frames)
    }

    #[inline]
    pub fn get(&self, id: &str) -> Option<&[Point]> {
        self.trajectories.get(id).map(Vec::as_slice)
    }

    /// Ids in first-seen order.
    #[inline]
    pub fn ids(&self) -> impl Iterator<Item = &TrackId> {
        self.order.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// The first `count` ids in listing order: integer ids ascending, then
    /// the rest in first-seen order. This is what the dashboard preselects.
    pub fn default_selection(&self, count: usize) -> Vec<TrackId> {
        let mut numeric: Vec<(u32, &TrackId)> = self
            .order
            .iter()
            .filter_map(|id| array_index(id.as_str()).map(|n| (n, id)))
            .collect();
        numeric.sort_unstable_by_key(|&(n, _)| n);

        numeric
            .into_iter()
            .map(|(_, id)| id)
            .chain(self.order.iter().filter(|id| array_index(id.as_str()).is_none()))
            .take(count)
            .cloned()
            .collect()
    }

    /// Points shown once playback reaches `frame`: untagged points and
    /// points at or before it. `frame` is clamped to `total_frames`.
    ///
    /// Ids with nothing visible yet are left out.
    pub fn visible_until(&self, frame: u32) -> Trajectories {
        let current = frame.min(self.total_frames);

        self.trajectories
            .iter()
            .filter_map(|(id, points)| {
                let visible: Vec<Point> = points
                    .iter()
                    .filter(|p| p.frame.map_or(true, |f| f <= current))
                    .copied()
                    .collect();

                (!visible.is_empty()).then(|| (id.clone(), visible))
            })
            .collect()
    }

    /// Copy with every point mapped from the `from` resolution onto `to`.
    pub fn rescaled(&self, from: Resolution, to: Resolution) -> Self {
        if from == to || from.width == 0 || from.height == 0 {
            return self.clone();
        }

        let sx = to.width as f64 / from.width as f64;
        let sy = to.height as f64 / from.height as f64;

        let trajectories = self
            .trajectories
            .iter()
            .map(|(id, points)| {
                let points = points
                    .iter()
                    .map(|p| Point {
                        x: p.x * sx,
                        y: p.y * sy,
                        frame: p.frame,
                    })
                    .collect();

                (id.clone(), points)
            })
            .collect();

        Self {
            trajectories,
            order: self.order.clone(),
            total_frames: self.total_frames,
        }
    }
}

/// Canonical decimal form of an integer below 2^32 - 1, as used for array-like keys.
fn array_index(id: &str) -> Option<u32> {
    let n: u32 = id.parse().ok()?;

    (n != u32::MAX && n.to_string() == id).then_some(n)
}

/// Groups frame records into per-id point sequences and reports the highest frame index.
pub fn build_trajectories(frames: &[FrameRecord]) -> (Trajectories, u32) {
    TrajectoryStore::build(frames).into_parts()
}
