//! Camera and scroll effects laid over the chart.

use super::line_graph::LineGraph;
use crate::MapTime;

/// Selects one graph of an [`EffectTimeline`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GraphType {
    /// Zoom of the near end of the track.
    ZoomBottom,
    /// Zoom of the far end of the track.
    ZoomTop,
    /// Horizontal shift of the track.
    ShiftX,
    /// Manual tilt of the track.
    RotationZ,
    /// Multiplier of the scroll speed.
    ScrollSpeed,
}

impl GraphType {
    /// Every graph type, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::ZoomBottom,
        Self::ZoomTop,
        Self::ShiftX,
        Self::RotationZ,
        Self::ScrollSpeed,
    ];
}

/// A point where the chart scroll stops for a while.
///
/// Stops are carried along with the timeline but are not applied to any time or
/// distance conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChartStop {
    /// Time at which the scroll stops.
    pub time: MapTime,
    /// How long the scroll stays stopped.
    pub duration: MapTime,
}

/// One layer of continuous effects.
///
/// A chart has a base layer and any number of auxiliary layers which are added on top of
/// it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectTimeline {
    chart_stops: Vec<ChartStop>,
    zoom_bottom: LineGraph,
    zoom_top: LineGraph,
    shift_x: LineGraph,
    rotation_z: LineGraph,
    scroll_speed: LineGraph,
}

impl Default for EffectTimeline {
    fn default() -> Self {
        Self {
            chart_stops: Vec::new(),
            zoom_bottom: LineGraph::default(),
            zoom_top: LineGraph::default(),
            shift_x: LineGraph::default(),
            rotation_z: LineGraph::default(),
            scroll_speed: LineGraph::new(1.0),
        }
    }
}

impl EffectTimeline {
    /// The graph selected by `graph_type`.
    #[must_use]
    pub const fn graph(&self, graph_type: GraphType) -> &LineGraph {
        match graph_type {
            GraphType::ZoomBottom => &self.zoom_bottom,
            GraphType::ZoomTop => &self.zoom_top,
            GraphType::ShiftX => &self.shift_x,
            GraphType::RotationZ => &self.rotation_z,
            GraphType::ScrollSpeed => &self.scroll_speed,
        }
    }

    /// Mutable access to the graph selected by `graph_type`.
    pub const fn graph_mut(&mut self, graph_type: GraphType) -> &mut LineGraph {
        match graph_type {
            GraphType::ZoomBottom => &mut self.zoom_bottom,
            GraphType::ZoomTop => &mut self.zoom_top,
            GraphType::ShiftX => &mut self.shift_x,
            GraphType::RotationZ => &mut self.rotation_z,
            GraphType::ScrollSpeed => &mut self.scroll_speed,
        }
    }

    /// Insert a value into the graph selected by `graph_type`.
    pub fn insert_graph_value(&mut self, graph_type: GraphType, time: MapTime, value: f64) {
        self.graph_mut(graph_type).insert(time, value);
    }

    /// Scroll stops of this layer.
    #[must_use]
    pub fn chart_stops(&self) -> &[ChartStop] {
        &self.chart_stops
    }

    /// Mutable access to the scroll stops of this layer.
    pub const fn chart_stops_mut(&mut self) -> &mut Vec<ChartStop> {
        &mut self.chart_stops
    }

    /// Whether the first rotation point after `bound` is a slam reached by `time`.
    #[must_use]
    pub fn has_manual_tilt_slam(&self, bound: MapTime, time: MapTime) -> bool {
        self.rotation_z
            .first_point_after(bound)
            .is_some_and(|(at, point)| point.is_slam() && at <= time)
    }
}
