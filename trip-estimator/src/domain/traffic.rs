//! Traffic condition types.
//!
//! Traffic along a route is summarised from two provider feeds: incidents
//! inside a bounding box, and flow measurements at sampled points. The
//! summary is reduced to a single impact score and then to a coarse
//! `TrafficLevel`, which is what the cost estimate consumes.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::Coordinates;

/// Impact below which traffic counts as light.
const LIGHT_IMPACT_LIMIT: f64 = 1.15;

/// Impact below which traffic counts as moderate.
const MODERATE_IMPACT_LIMIT: f64 = 1.4;

/// Incident category, from the provider's icon category code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum IncidentType {
    Unknown,
    Accident,
    Fog,
    DangerousConditions,
    Rain,
    Ice,
    Jam,
    LaneClosed,
    RoadClosed,
    RoadWorks,
    Wind,
    Flooding,
    BrokenDownVehicle,
}

impl IncidentType {
    pub fn from_icon_category(code: i64) -> Self {
        match code {
            1 => IncidentType::Accident,
            2 => IncidentType::Fog,
            3 => IncidentType::DangerousConditions,
            4 => IncidentType::Rain,
            5 => IncidentType::Ice,
            6 => IncidentType::Jam,
            7 => IncidentType::LaneClosed,
            8 => IncidentType::RoadClosed,
            9 => IncidentType::RoadWorks,
            10 => IncidentType::Wind,
            11 => IncidentType::Flooding,
            14 => IncidentType::BrokenDownVehicle,
            _ => IncidentType::Unknown,
        }
    }

    /// Whether this incident slows traffic enough to raise the level.
    pub fn is_disruptive(self) -> bool {
        matches!(
            self,
            IncidentType::Accident | IncidentType::Jam | IncidentType::RoadClosed
        )
    }
}

/// A reported incident.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Incident {
    pub kind: IncidentType,
    pub coordinates: Coordinates,
    pub icon_category: i64,
}

/// Functional road class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RoadType {
    Motorway,
    Trunk,
    Primary,
    Secondary,
    Tertiary,
    Local,
    Other,
}

impl RoadType {
    /// Map an `FRC0`..`FRC6` code.
    pub fn from_frc(frc: &str) -> Self {
        match frc {
            "FRC0" => RoadType::Motorway,
            "FRC1" => RoadType::Trunk,
            "FRC2" => RoadType::Primary,
            "FRC3" => RoadType::Secondary,
            "FRC4" => RoadType::Tertiary,
            "FRC5" | "FRC6" => RoadType::Local,
            _ => RoadType::Other,
        }
    }
}

/// Flow measurement for the road segment nearest a sampled point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowSegment {
    pub frc: String,
    pub road_type: RoadType,
    /// km/h
    pub current_speed: f64,
    /// km/h
    pub free_flow_speed: f64,
    /// 0.0 to 1.0
    pub confidence: f64,
    /// seconds
    pub current_travel_time: f64,
    /// seconds
    pub free_flow_travel_time: f64,
    pub road_closure: bool,
    pub start_point: Option<Coordinates>,
    pub end_point: Option<Coordinates>,
}

impl FlowSegment {
    /// Current over free-flow travel time; 1.0 when unknown.
    pub fn delay_ratio(&self) -> f64 {
        if self.free_flow_travel_time > 0.0 && self.current_travel_time > 0.0 {
            self.current_travel_time / self.free_flow_travel_time
        } else {
            1.0
        }
    }
}

/// Coarse traffic category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrafficLevel {
    Light,
    Moderate,
    Heavy,
}

impl TrafficLevel {
    pub const ALL: [TrafficLevel; 3] = [
        TrafficLevel::Light,
        TrafficLevel::Moderate,
        TrafficLevel::Heavy,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TrafficLevel::Light => "light",
            TrafficLevel::Moderate => "moderate",
            TrafficLevel::Heavy => "heavy",
        }
    }

    /// Classify an impact score.
    pub fn from_impact(impact: f64) -> Self {
        if impact < LIGHT_IMPACT_LIMIT {
            TrafficLevel::Light
        } else if impact < MODERATE_IMPACT_LIMIT {
            TrafficLevel::Moderate
        } else {
            TrafficLevel::Heavy
        }
    }

    /// One step worse, saturating at heavy.
    pub fn worsen(self) -> Self {
        match self {
            TrafficLevel::Light => TrafficLevel::Moderate,
            TrafficLevel::Moderate | TrafficLevel::Heavy => TrafficLevel::Heavy,
        }
    }
}

impl fmt::Display for TrafficLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a traffic condition name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown traffic condition: {0}")]
pub struct UnknownTrafficCondition(pub String);

impl FromStr for TrafficLevel {
    type Err = UnknownTrafficCondition;

    /// Accepts `light`, `moderate` or `heavy`, trimmed and case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|level| level.as_str() == wanted)
            .ok_or_else(|| UnknownTrafficCondition(s.to_string()))
    }
}

/// Traffic summary along a route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrafficCondition {
    /// Confidence-weighted mean delay ratio (1.0 = free flow)
    pub traffic_impact: f64,
    pub flow_segments: Vec<FlowSegment>,
    pub incidents: Vec<Incident>,
}

impl TrafficCondition {
    /// Summarise flow segments and incidents, computing the impact score.
    pub fn new(flow_segments: Vec<FlowSegment>, incidents: Vec<Incident>) -> Self {
        let traffic_impact = impact_score(&flow_segments);
        Self {
            traffic_impact,
            flow_segments,
            incidents,
        }
    }

    /// Derive a traffic level.
    ///
    /// Any road closure is heavy. Otherwise the impact score is
    /// classified, then each disruptive incident worsens the level by one.
    pub fn level(&self) -> TrafficLevel {
        if self.flow_segments.iter().any(|s| s.road_closure) {
            return TrafficLevel::Heavy;
        }
        self.incidents
            .iter()
            .filter(|i| i.kind.is_disruptive())
            .fold(TrafficLevel::from_impact(self.traffic_impact), |level, _| {
                level.worsen()
            })
    }
}

fn impact_score(segments: &[FlowSegment]) -> f64 {
    let (weighted, total_weight) = segments
        .iter()
        .filter(|s| s.confidence > 0.0)
        .fold((0.0, 0.0), |(sum, weight), s| {
            (sum + s.delay_ratio() * s.confidence, weight + s.confidence)
        });

    if total_weight > 0.0 {
        weighted / total_weight
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(current: f64, free: f64, confidence: f64) -> FlowSegment {
        FlowSegment {
            frc: "FRC2".into(),
            road_type: RoadType::Primary,
            current_speed: 40.0,
            free_flow_speed: 60.0,
            confidence,
            current_travel_time: current,
            free_flow_travel_time: free,
            road_closure: false,
            start_point: None,
            end_point: None,
        }
    }

    fn incident(kind: IncidentType) -> Incident {
        Incident {
            kind,
            coordinates: Coordinates::new(0.0, 0.0).unwrap(),
            icon_category: 0,
        }
    }

    #[test]
    fn incident_categories() {
        assert_eq!(IncidentType::from_icon_category(1), IncidentType::Accident);
        assert_eq!(IncidentType::from_icon_category(6), IncidentType::Jam);
        assert_eq!(
            IncidentType::from_icon_category(14),
            IncidentType::BrokenDownVehicle
        );
        assert_eq!(IncidentType::from_icon_category(12), IncidentType::Unknown);
        assert_eq!(IncidentType::from_icon_category(-3), IncidentType::Unknown);
    }

    #[test]
    fn road_types() {
        assert_eq!(RoadType::from_frc("FRC0"), RoadType::Motorway);
        assert_eq!(RoadType::from_frc("FRC6"), RoadType::Local);
        assert_eq!(RoadType::from_frc(""), RoadType::Other);
    }

    #[test]
    fn no_segments_is_free_flow() {
        let condition = TrafficCondition::new(vec![], vec![]);
        assert_eq!(condition.traffic_impact, 1.0);
        assert_eq!(condition.level(), TrafficLevel::Light);
    }

    #[test]
    fn impact_is_confidence_weighted() {
        // ratios 2.0 (weight 1.0) and 1.0 (weight 3.0) -> 5/4
        let condition =
            TrafficCondition::new(vec![segment(200.0, 100.0, 1.0), segment(50.0, 50.0, 3.0)], vec![]);
        assert!((condition.traffic_impact - 1.25).abs() < 1e-9);
        assert_eq!(condition.level(), TrafficLevel::Moderate);
    }

    #[test]
    fn zero_confidence_segments_ignored() {
        let condition = TrafficCondition::new(vec![segment(500.0, 100.0, 0.0)], vec![]);
        assert_eq!(condition.traffic_impact, 1.0);
    }

    #[test]
    fn road_closure_is_heavy() {
        let mut closed = segment(100.0, 100.0, 1.0);
        closed.road_closure = true;
        let condition = TrafficCondition::new(vec![closed], vec![]);
        assert_eq!(condition.level(), TrafficLevel::Heavy);
    }

    #[test]
    fn disruptive_incidents_worsen_level() {
        let condition = TrafficCondition::new(
            vec![segment(100.0, 100.0, 1.0)],
            vec![incident(IncidentType::Accident), incident(IncidentType::Rain)],
        );
        assert_eq!(condition.level(), TrafficLevel::Moderate);

        let condition = TrafficCondition::new(
            vec![],
            vec![
                incident(IncidentType::Jam),
                incident(IncidentType::RoadClosed),
                incident(IncidentType::Accident),
            ],
        );
        assert_eq!(condition.level(), TrafficLevel::Heavy);
    }

    #[test]
    fn impact_thresholds() {
        assert_eq!(TrafficLevel::from_impact(1.0), TrafficLevel::Light);
        assert_eq!(TrafficLevel::from_impact(1.15), TrafficLevel::Moderate);
        assert_eq!(TrafficLevel::from_impact(1.39), TrafficLevel::Moderate);
        assert_eq!(TrafficLevel::from_impact(1.4), TrafficLevel::Heavy);
    }

    #[test]
    fn parse_level() {
        assert_eq!("heavy".parse(), Ok(TrafficLevel::Heavy));
        assert_eq!("  MODERATE ".parse(), Ok(TrafficLevel::Moderate));
        assert_eq!("Light".parse(), Ok(TrafficLevel::Light));
        assert_eq!(
            "extreme".parse::<TrafficLevel>(),
            Err(UnknownTrafficCondition("extreme".into()))
        );
    }
}
