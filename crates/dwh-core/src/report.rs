//! Resolved frame reports
//!
//! A serializable snapshot of a built part: where its origin and every
//! declared reference point ended up after placement.

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use dwh_kernel::Aabb;

use crate::frame::Axis;
use crate::part::{Part, PartResult, PartState};
use crate::placement::Placement;

/// Output format of a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReportFormat {
    #[default]
    Ron,
    Json,
}

impl std::str::FromStr for ReportFormat {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ron" => Ok(ReportFormat::Ron),
            "json" => Ok(ReportFormat::Json),
            other => Err(ReportError::UnknownFormat(other.to_string())),
        }
    }
}

/// One reference point in world coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointReport {
    pub axis: Axis,
    pub index: i32,
    pub world: Vec3,
}

/// World-space snapshot of a part and its children
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartReport {
    pub name: String,
    pub state: PartState,
    /// Local origin in world coordinates
    pub pos_o: Vec3,
    /// World directions of d, w and h
    pub axes: [Vec3; 3],
    /// Placement relative to the world
    pub placement: Placement,
    pub bounds: Aabb,
    pub points: Vec<PointReport>,
    pub children: Vec<PartReport>,
}

impl PartReport {
    pub fn from_part(part: &Part) -> PartResult<Self> {
        Self::within(part, &Placement::IDENTITY)
    }

    fn within(part: &Part, outer: &Placement) -> PartResult<Self> {
        let placement = part.placement().within(outer);
        let frame = part.frame();

        let mut points = Vec::new();
        for axis in Axis::ALL {
            for index in frame.table().indices(axis) {
                points.push(PointReport {
                    axis,
                    index,
                    world: placement.apply(frame.axis_point(axis, index)?),
                });
            }
        }

        let children = part
            .children()
            .iter()
            .map(|child| Self::within(child, &placement))
            .collect::<PartResult<Vec<_>>>()?;

        Ok(Self {
            name: part.name().to_string(),
            state: part.state(),
            pos_o: placement.apply(frame.pos_o()),
            axes: Axis::ALL.map(|axis| placement.apply_vector(frame.axes().axis(axis))),
            placement,
            bounds: placement.apply_bounds(part.bounds()),
            points,
            children,
        })
    }

    /// World position of one reference point, if declared
    pub fn point(&self, axis: Axis, index: i32) -> Option<Vec3> {
        self.points
            .iter()
            .find(|p| p.axis == axis && p.index == index)
            .map(|p| p.world)
    }

    pub fn render(&self, format: ReportFormat) -> Result<String, ReportError> {
        match format {
            ReportFormat::Ron => {
                ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                    .map_err(|e| ReportError::Serialize(e.to_string()))
            }
            ReportFormat::Json => {
                serde_json::to_string_pretty(self).map_err(|e| ReportError::Serialize(e.to_string()))
            }
        }
    }

    pub fn save(&self, path: impl AsRef<Path>, format: ReportFormat) -> Result<(), ReportError> {
        let content = self.render(format)?;
        std::fs::write(path.as_ref(), content).map_err(|e| ReportError::Io(e.to_string()))?;
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>, format: ReportFormat) -> Result<Self, ReportError> {
        let content =
            std::fs::read_to_string(path.as_ref()).map_err(|e| ReportError::Io(e.to_string()))?;
        match format {
            ReportFormat::Ron => {
                ron::from_str(&content).map_err(|e| ReportError::Deserialize(e.to_string()))
            }
            ReportFormat::Json => {
                serde_json::from_str(&content).map_err(|e| ReportError::Deserialize(e.to_string()))
            }
        }
    }
}

/// Report-related errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialize(String),
    #[error("Deserialization error: {0}")]
    Deserialize(String),
    #[error("Unknown report format: {0}")]
    UnknownFormat(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::AxisTriple;
    use crate::part::PartBuilder;
    use dwh_kernel::MemoryKernel;

    fn placed_bar(kernel: &MemoryKernel) -> Part {
        let mut part = PartBuilder::new("bar", AxisTriple::CANONICAL)
            .tabulate(|t| {
                t.centered(Axis::D)?.set(Axis::D, 1, 5.0)?;
                t.set(Axis::H, 1, 2.0)?;
                Ok(())
            })
            .unwrap()
            .locate(Vec3::ZERO, (0, 0, 0))
            .unwrap()
            .shape(kernel, |frame, kernel| {
                Ok(kernel.make_box(
                    frame.point(-1, 0, 0)?,
                    [frame.vec(Axis::D, 10.0), frame.vec(Axis::W, 1.0), frame.vec(Axis::H, 2.0)],
                )?)
            })
            .unwrap();
        part.place(Vec3::new(0.0, 0.0, 10.0), (0, 0, 0)).unwrap();
        part
    }

    #[test]
    fn test_report_points_in_world() {
        let kernel = MemoryKernel::new();
        let report = PartReport::from_part(&placed_bar(&kernel)).unwrap();
        assert_eq!(report.pos_o, Vec3::new(0.0, 0.0, 10.0));
        assert_eq!(report.point(Axis::D, -1), Some(Vec3::new(-5.0, 0.0, 10.0)));
        assert_eq!(report.point(Axis::H, 1), Some(Vec3::new(0.0, 0.0, 12.0)));
        assert_eq!(report.point(Axis::W, 1), None);
        // d: -1, 0, 1; w: 0; h: 0, 1
        assert_eq!(report.points.len(), 6);
        assert_eq!(report.state, PartState::Placed);
    }

    #[test]
    fn test_report_file_round_trip() {
        let kernel = MemoryKernel::new();
        let report = PartReport::from_part(&placed_bar(&kernel)).unwrap();
        let dir = tempfile::tempdir().unwrap();
        for format in [ReportFormat::Ron, ReportFormat::Json] {
            let path = dir.path().join("bar.report");
            report.save(&path, format).unwrap();
            assert_eq!(PartReport::load(&path, format).unwrap(), report);
        }
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("JSON".parse::<ReportFormat>().unwrap(), ReportFormat::Json);
        assert!(matches!(
            "yaml".parse::<ReportFormat>(),
            Err(ReportError::UnknownFormat(_))
        ));
    }
}
