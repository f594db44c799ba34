//! Trajectory reconstruction and motion analysis for tracked video objects.
//!
//! Raw per-frame detections are grouped into per-object paths by the
//! [`TrajectoryStore`], then [`TrajectoryAnalyzer`] summarizes the selected
//! paths: duration, distance, speed and the points where they turn.
//!
//! ```
//! use trackpath::{analyze_trajectories, Heading, TrajectoryStore};
//!
//! let store = TrajectoryStore::from_json(
//!     r#"{"detections":[
//!         {"frame":0,"boxes":[{"id":1,"x":0,"y":0}]},
//!         {"frame":1,"boxes":[{"id":1,"x":10,"y":0}]},
//!         {"frame":2,"boxes":[{"id":1,"x":10,"y":10}]},
//!         {"frame":3,"boxes":[{"id":1,"x":20,"y":10}]}
//!     ]}"#,
//! );
//!
//! let selection = store.default_selection(3);
//! let report = analyze_trajectories(&selection, store.trajectories(), 45.0);
//!
//! assert_eq!(report.len(), 1);
//! assert_eq!(report[0].direction_changes.len(), 1);
//! assert_eq!(report[0].direction_changes[0].from_direction, Heading::Right);
//! ```

pub mod analyzer;
pub mod config;
pub mod detection;
pub mod error;
pub mod heading;
pub mod math;
pub mod palette;
pub mod point;
pub mod store;

#[cfg(feature = "http")]
pub mod client;

pub use analyzer::{analyze_trajectories, DirectionChangeEvent, TrajectoryAnalysis, TrajectoryAnalyzer};
pub use config::{AnalyzerConfig, Strategy};
pub use detection::{BoxRecord, DetectionsPayload, FrameRecord, Resolution, VideoMetrics};
pub use error::{Error, Result};
pub use heading::{Heading, Labeling};
pub use point::{Point, TrackId};
pub use store::{build_trajectories, Trajectories, TrajectoryStore};

#[cfg(feature = "http")]
pub use client::{ClientConfig, DetectionClient};
