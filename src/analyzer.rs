use serde_derive::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::config::{AnalyzerConfig, Strategy};
use crate::error::Result;
use crate::heading::Heading;
use crate::math;
use crate::point::{Point, TrackId};
use crate::store::Trajectories;

/// A turning point along a trajectory
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DirectionChangeEvent {
    pub frame: u32,

    // deviation between incoming and outgoing motion, 0..=180 degrees
    pub angle: f64,

    pub from_coord: Point,
    pub to_coord: Point,
    pub from_direction: Heading,
    pub to_direction: Heading,
}

impl DirectionChangeEvent {
    #[inline]
    pub fn seconds(&self, fps: f64) -> f64 {
        self.frame as f64 / fps
    }
}

/// Motion summary of one object
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrajectoryAnalysis {
    pub id: TrackId,
    pub first_detection: u32,
    pub last_detection: u32,
    pub duration_seconds: f64,
    pub direction_changes: Vec<DirectionChangeEvent>,

    // in px
    pub total_distance: f64,

    // in px per frame
    pub average_speed: f64,
}

impl TrajectoryAnalysis {
    #[inline]
    pub fn first_seconds(&self, fps: f64) -> f64 {
        self.first_detection as f64 / fps
    }

    #[inline]
    pub fn last_seconds(&self, fps: f64) -> f64 {
        self.last_detection as f64 / fps
    }
}

/// Points of one object in frame order, with the frame each one is accounted at.
struct SortedPath {
    points: Vec<Point>,
    frames: Vec<u32>,
}

impl SortedPath {
    fn new(points: &[Point]) -> Self {
        let mut indexed: Vec<(u32, Point)> = points
            .iter()
            .enumerate()
            .filter(|(_, p)| p.x.is_finite() && p.y.is_finite())
            .map(|(idx, p)| (p.frame_or(idx), *p))
            .collect();

        // equal frames are ordered by position so input order never matters
        indexed.sort_by(|(fa, a), (fb, b)| {
            fa.cmp(fb)
                .then_with(|| a.x.total_cmp(&b.x))
                .then_with(|| a.y.total_cmp(&b.y))
        });

        let (frames, points) = indexed.into_iter().unzip();

        Self { points, frames }
    }

    #[inline]
    fn len(&self) -> usize {
        self.points.len()
    }
}

#[derive(Debug, Clone, Default)]
pub struct TrajectoryAnalyzer {
    config: AnalyzerConfig,
}

impl TrajectoryAnalyzer {
    /// Fails when `config` does not pass [`AnalyzerConfig::validate`].
    pub fn new(config: AnalyzerConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self { config })
    }

    #[inline]
    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Analyzes every selected id, in selection order.
    ///
    /// Ids that are unknown or have fewer than 2 usable points are left out
    /// of the result. An empty selection returns immediately.
    pub fn analyze<'a, I>(
        &self,
        selected: I,
        trajectories: &Trajectories,
        angle_threshold: f64,
    ) -> Vec<TrajectoryAnalysis>
    where
        I: IntoIterator<Item = &'a TrackId>,
    {
        let mut selected = selected.into_iter().peekable();
        if selected.peek().is_none() {
            return Vec::new();
        }

        let mut analysis = Vec::new();

        for id in selected {
            let points = match trajectories.get(id) {
                Some(points) => points,
                None => {
                    debug!("trajectory {} not found, skipping", id);
                    continue;
                }
            };

            match self.analyze_track(id, points, angle_threshold) {
                Some(item) => analysis.push(item),
                None => debug!("trajectory {} has too few points ({}), skipping", id, points.len()),
            }
        }

        analysis
    }

    /// Summary of a single trajectory, `None` below 2 usable points.
    pub fn analyze_track(
        &self,
        id: &TrackId,
        points: &[Point],
        angle_threshold: f64,
    ) -> Option<TrajectoryAnalysis> {
        let path = SortedPath::new(points);

        if path.len() < 2 {
            return None;
        }

        let first_detection = path.points.first()?.frame.unwrap_or(0);
        let last_detection = path.points.last()?.frame.unwrap_or(0);
        let duration_seconds = self
            .config
            .seconds(last_detection as f64 - first_detection as f64);

        let mut total_distance = 0.0;
        let mut speeds = Vec::with_capacity(path.len() - 1);

        for i in 1..path.len() {
            let distance = path.points[i - 1].distance(&path.points[i]);
            total_distance += distance;

            let frame_delta = i64::from(path.frames[i]) - i64::from(path.frames[i - 1]);
            if frame_delta > 0 {
                speeds.push(distance / frame_delta as f64);
            }
        }

        let average_speed = if speeds.is_empty() {
            0.0
        } else {
            speeds.iter().sum::<f64>() / speeds.len() as f64
        };

        let direction_changes = self.direction_changes(&path, angle_threshold);

        Some(TrajectoryAnalysis {
            id: id.clone(),
            first_detection,
            last_detection,
            duration_seconds,
            direction_changes,
            total_distance,
            average_speed,
        })
    }

    fn direction_changes(&self, path: &SortedPath, threshold: f64) -> Vec<DirectionChangeEvent> {
        if path.len() < 3 {
            return Vec::new();
        }

        match self.config.strategy {
            Strategy::Simple => self.simple_changes(path, threshold),
            Strategy::Segmented => self.segmented_changes(path, threshold),
        }
    }

    fn simple_changes(&self, path: &SortedPath, threshold: f64) -> Vec<DirectionChangeEvent> {
        let pts = &path.points;
        let mut changes = Vec::new();

        for i in 1..pts.len() - 1 {
            let v1 = pts[i - 1].delta(&pts[i]);
            let v2 = pts[i].delta(&pts[i + 1]);

            let angle = match math::angle_between(&v1, &v2, self.config.min_vector_norm) {
                Some(angle) if angle > threshold => angle,
                _ => continue,
            };

            trace!("turn of {:.1} deg at frame {}", angle, path.frames[i]);

            changes.push(DirectionChangeEvent {
                frame: path.frames[i],
                angle,
                from_coord: pts[i - 1],
                to_coord: pts[i + 1],
                from_direction: self.config.labeling.heading(&v1),
                to_direction: self.config.labeling.heading(&v2),
            });
        }

        changes
    }

    fn segmented_changes(&self, path: &SortedPath, threshold: f64) -> Vec<DirectionChangeEvent> {
        let window = self.config.smoothing_window;
        let reach = self.config.min_segment_len;
        let n = path.len();

        // fewer than two windows of points would average into a straight line
        let smooth = if n >= 2 * window {
            math::moving_average(&path.points, window)
        } else {
            path.points.clone()
        };

        let mut breaks: Vec<(usize, f64)> = Vec::new();
        let mut peak: Option<(usize, f64)> = None;

        for i in 1..n - 1 {
            // incoming and outgoing spans have equal length and stay inside the current segment
            let start = breaks.last().map_or(0, |&(last, _)| last);
            let span = (i - start).min(n - 1 - i).min(reach);

            let incoming = math::mean_delta(&smooth[i - span..=i]);
            let outgoing = math::mean_delta(&smooth[i..=i + span]);

            match math::angle_between(&incoming, &outgoing, self.config.min_vector_norm) {
                Some(angle) if angle > threshold => {
                    if peak.map_or(true, |(_, best)| angle > best) {
                        peak = Some((i, angle));
                    }
                }
                _ => {
                    if let Some(candidate) = peak.take() {
                        self.push_break(&mut breaks, candidate, path);
                    }
                }
            }
        }

        if let Some(candidate) = peak.take() {
            self.push_break(&mut breaks, candidate, path);
        }

        breaks
            .iter()
            .enumerate()
            .map(|(k, &(i, angle))| {
                let start = if k > 0 { breaks[k - 1].0 } else { 0 };
                let end = breaks.get(k + 1).map(|b| b.0).unwrap_or(n - 1);

                let incoming = math::mean_delta(&smooth[start..=i]);
                let outgoing = math::mean_delta(&smooth[i..=end]);

                DirectionChangeEvent {
                    frame: path.frames[i],
                    angle,
                    from_coord: path.points[start],
                    to_coord: path.points[end],
                    from_direction: self.config.labeling.heading(&incoming),
                    to_direction: self.config.labeling.heading(&outgoing),
                }
            })
            .collect()
    }

    /// Keeps the sharpest point of a run of candidates unless it lands
    /// within `min_segment_len` of the previous break.
    fn push_break(&self, breaks: &mut Vec<(usize, f64)>, (i, angle): (usize, f64), path: &SortedPath) {
        let spaced = breaks
            .last()
            .map_or(true, |&(last, _)| i - last >= self.config.min_segment_len);

        if spaced {
            trace!("segment break of {:.1} deg at frame {}", angle, path.frames[i]);
            breaks.push((i, angle));
        }
    }
}

/// Analyzes the selected ids with the default configuration.
pub fn analyze_trajectories<'a, I>(
    selected: I,
    trajectories: &Trajectories,
    angle_threshold: f64,
) -> Vec<TrajectoryAnalysis>
where
    I: IntoIterator<Item = &'a TrackId>,
{
    TrajectoryAnalyzer::default().analyze(selected, trajectories, angle_threshold)
}
