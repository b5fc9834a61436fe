use serde::Serialize;

use super::category::{DistanceCategory, DistanceFilter, categorize};
use super::color::{Rgba, arc_color};
use super::geo::{geodesic_distance_km, normalize};
use super::matrix::SimilarityMatrix;
use super::nodes::{LanguageNode, NodeRegistry};

const SELECTED_COLOR: Rgba = Rgba::rgb(34, 197, 94);
const PRIMARY_COLOR: Rgba = Rgba::rgb(59, 130, 246);
const SECONDARY_COLOR: Rgba = Rgba::rgb(156, 163, 175);
const SAME_LANGUAGE_COLOR: Rgba = Rgba::rgb(156, 163, 175).with_alpha(0.3);

const SELECTED_RADIUS: f32 = 0.8;
const PRIMARY_RADIUS: f32 = 0.5;
const SECONDARY_RADIUS: f32 = 0.3;

const SAME_LANGUAGE_ALTITUDE: f64 = 0.01;
const SAME_LANGUAGE_STROKE: f32 = 0.3;
const SIMILARITY_BASE_ALTITUDE: f64 = 0.02;
const SIMILARITY_ALTITUDE_SCALE: f64 = 0.35;
const SIMILARITY_STROKE: f32 = 0.5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PointRole {
    Selected,
    Primary,
    Secondary,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphPoint {
    pub code: String,
    pub label: String,
    pub lat: f64,
    pub lng: f64,
    pub color: Rgba,
    pub radius: f32,
    pub role: PointRole,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ArcKind {
    /// Structural link between regional variants of one language.
    SameLanguage,
    Similarity {
        category: DistanceCategory,
        distance: f64,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphArc {
    pub source_code: String,
    pub target_code: String,
    pub start_lat: f64,
    pub start_lng: f64,
    pub end_lat: f64,
    pub end_lng: f64,
    pub color: Rgba,
    pub altitude: f64,
    pub stroke: f32,
    pub normalized_geo_distance: f64,
    pub label: String,
    pub kind: ArcKind,
}

impl GraphArc {
    pub fn clickable(&self) -> bool {
        matches!(self.kind, ArcKind::Similarity { .. })
    }

    pub fn category(&self) -> Option<DistanceCategory> {
        match self.kind {
            ArcKind::Similarity { category, .. } => Some(category),
            ArcKind::SameLanguage => None,
        }
    }

    pub fn touches(&self, code: &str) -> bool {
        self.source_code == code || self.target_code == code
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Graph {
    pub points: Vec<GraphPoint>,
    pub arcs: Vec<GraphArc>,
}

impl Graph {
    pub fn similarity_arcs(&self) -> impl Iterator<Item = &GraphArc> {
        self.arcs.iter().filter(|arc| arc.clickable())
    }

    pub fn same_language_arcs(&self) -> impl Iterator<Item = &GraphArc> {
        self.arcs.iter().filter(|arc| !arc.clickable())
    }
}

fn make_point(node: &LanguageNode, selected: Option<&str>) -> GraphPoint {
    let role = if selected == Some(node.code.as_str()) {
        PointRole::Selected
    } else if node.is_primary() {
        PointRole::Primary
    } else {
        PointRole::Secondary
    };

    let (color, radius) = match role {
        PointRole::Selected => (SELECTED_COLOR, SELECTED_RADIUS),
        PointRole::Primary => (PRIMARY_COLOR, PRIMARY_RADIUS),
        PointRole::Secondary => (SECONDARY_COLOR, SECONDARY_RADIUS),
    };

    let label = if node.is_primary() {
        node.display_name.clone()
    } else {
        format!("{} ({})", node.display_name, node.country)
    };

    GraphPoint {
        code: node.code.clone(),
        label,
        lat: node.latitude,
        lng: node.longitude,
        color,
        radius,
        role,
    }
}

struct ArcStyle {
    color: Rgba,
    altitude: f64,
    stroke: f32,
}

const SAME_LANGUAGE_STYLE: ArcStyle = ArcStyle {
    color: SAME_LANGUAGE_COLOR,
    altitude: SAME_LANGUAGE_ALTITUDE,
    stroke: SAME_LANGUAGE_STROKE,
};

fn make_arc(
    a: &LanguageNode,
    b: &LanguageNode,
    style: ArcStyle,
    normalized_geo_distance: f64,
    label: String,
    kind: ArcKind,
) -> GraphArc {
    let ArcStyle {
        color,
        altitude,
        stroke,
    } = style;
    GraphArc {
        source_code: a.code.clone(),
        target_code: b.code.clone(),
        start_lat: a.latitude,
        start_lng: a.longitude,
        end_lat: b.latitude,
        end_lng: b.longitude,
        color,
        altitude,
        stroke,
        normalized_geo_distance,
        label,
        kind,
    }
}

/// Builds the point and arc lists for one frame of the atlas.
///
/// Same-language arcs come first and ignore both the filter and the selection.
/// Similarity arcs follow; with a selection only arcs touching the selected
/// node are kept, otherwise only arcs whose category passes `filter`. Pairs
/// without a matrix entry in either direction, or with an endpoint whose
/// language cannot be resolved, produce no arc.
pub fn build(
    nodes: &NodeRegistry,
    matrix: &SimilarityMatrix,
    filter: &DistanceFilter,
    selected: Option<&str>,
) -> Graph {
    let all = nodes.nodes();
    let points = all.iter().map(|node| make_point(node, selected)).collect();

    let mut same_language = Vec::new();
    let mut similarity = Vec::new();

    for (index, a) in all.iter().enumerate() {
        for b in &all[index + 1..] {
            let normalized_geo_distance = normalize(geodesic_distance_km(
                a.latitude,
                a.longitude,
                b.latitude,
                b.longitude,
            ));

            if nodes.same_language(a, b) {
                same_language.push(make_arc(
                    a,
                    b,
                    SAME_LANGUAGE_STYLE,
                    normalized_geo_distance,
                    format!("{} ({} / {})", a.display_name, a.code, b.code),
                    ArcKind::SameLanguage,
                ));
                continue;
            }

            let (Some(name_a), Some(name_b)) =
                (nodes.representative_name(a), nodes.representative_name(b))
            else {
                continue;
            };

            let Some(distance) = matrix.distance(name_a, name_b) else {
                continue;
            };

            let category = categorize(distance);
            let visible = match selected {
                Some(code) => a.code == code || b.code == code,
                None => filter.is_enabled(category),
            };
            if !visible {
                continue;
            }

            similarity.push(make_arc(
                a,
                b,
                ArcStyle {
                    color: arc_color(distance),
                    altitude: SIMILARITY_BASE_ALTITUDE
                        + normalized_geo_distance * SIMILARITY_ALTITUDE_SCALE,
                    stroke: SIMILARITY_STROKE,
                },
                normalized_geo_distance,
                format!("{name_a} ↔ {name_b}: {distance:.3} ({category})"),
                ArcKind::Similarity { category, distance },
            ));
        }
    }

    same_language.extend(similarity);
    Graph {
        points,
        arcs: same_language,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atlas::nodes::tests::node;

    fn worked_example() -> (NodeRegistry, SimilarityMatrix) {
        let nodes = NodeRegistry::new(vec![
            node("ja", "Japanese", 35.68, 139.65, None),
            node("en", "English", 51.51, -0.13, None),
        ])
        .unwrap();
        let mut matrix = SimilarityMatrix::new();
        matrix.insert("Japanese", "English", 0.82);
        matrix.insert("English", "Japanese", 0.82);
        (nodes, matrix)
    }

    fn europe() -> (NodeRegistry, SimilarityMatrix) {
        let nodes = NodeRegistry::new(vec![
            node("en", "English", 51.51, -0.13, None),
            node("en-us", "English", 38.90, -77.04, Some("en")),
            node("en-au", "English", -35.28, 149.13, Some("en")),
            node("de", "German", 52.52, 13.40, None),
            node("es", "Spanish", 40.42, -3.70, None),
            node("pt", "Portuguese", 38.72, -9.14, None),
            node("zz", "Klingon", 0.0, 0.0, Some("nowhere")),
        ])
        .unwrap();
        let mut matrix = SimilarityMatrix::new();
        matrix.insert("English", "German", 0.12);
        matrix.insert("English", "Spanish", 0.35);
        matrix.insert("German", "Spanish", 0.41);
        matrix.insert("Spanish", "Portuguese", 0.03);
        (nodes, matrix)
    }

    #[test]
    fn worked_example_far_filter_emits_nothing() {
        let (nodes, matrix) = worked_example();
        let graph = build(&nodes, &matrix, &DistanceFilter::only(DistanceCategory::Far), None);
        assert_eq!(graph.similarity_arcs().count(), 0);
        assert_eq!(graph.points.len(), 2);
    }

    #[test]
    fn worked_example_very_far_filter_emits_one_arc() {
        let (nodes, matrix) = worked_example();
        let graph = build(
            &nodes,
            &matrix,
            &DistanceFilter::only(DistanceCategory::VeryFar),
            None,
        );
        let arcs = graph.similarity_arcs().collect::<Vec<_>>();
        assert_eq!(arcs.len(), 1);
        assert_eq!((arcs[0].source_code.as_str(), arcs[0].target_code.as_str()), ("ja", "en"));
        assert_eq!(arcs[0].category(), Some(DistanceCategory::VeryFar));
        assert!(arcs[0].clickable());

        let expected_altitude = 0.02 + arcs[0].normalized_geo_distance * 0.35;
        assert!((arcs[0].altitude - expected_altitude).abs() < 1e-12);
        assert_eq!((arcs[0].color.r, arcs[0].color.g, arcs[0].color.b), (239, 68, 68));
    }

    #[test]
    fn build_is_idempotent() {
        let (nodes, matrix) = europe();
        let filter = DistanceFilter::all();
        assert_eq!(
            build(&nodes, &matrix, &filter, Some("de")),
            build(&nodes, &matrix, &filter, Some("de"))
        );
        assert_eq!(
            build(&nodes, &matrix, &filter, None),
            build(&nodes, &matrix, &filter, None)
        );
    }

    #[test]
    fn same_language_arcs_ignore_filter_and_selection() {
        let (nodes, matrix) = europe();
        for (filter, selected) in [
            (DistanceFilter::all(), None),
            (DistanceFilter::none(), None),
            (DistanceFilter::none(), Some("de")),
        ] {
            let graph = build(&nodes, &matrix, &filter, selected);
            let pairs = graph
                .same_language_arcs()
                .map(|arc| (arc.source_code.as_str(), arc.target_code.as_str()))
                .collect::<Vec<_>>();
            assert_eq!(pairs, vec![("en", "en-us"), ("en", "en-au"), ("en-us", "en-au")]);
            assert!(graph.same_language_arcs().all(|arc| !arc.clickable()));
            assert!(
                graph
                    .same_language_arcs()
                    .all(|arc| arc.altitude == SAME_LANGUAGE_ALTITUDE)
            );
        }
    }

    #[test]
    fn same_language_arcs_come_first() {
        let (nodes, matrix) = europe();
        let graph = build(&nodes, &matrix, &DistanceFilter::all(), None);
        let first_similarity = graph.arcs.iter().position(GraphArc::clickable).unwrap();
        assert!(graph.arcs[first_similarity..].iter().all(GraphArc::clickable));
        assert_eq!(first_similarity, 3);
    }

    #[test]
    fn variants_inherit_their_primary_similarity() {
        let (nodes, matrix) = europe();
        let graph = build(&nodes, &matrix, &DistanceFilter::all(), None);
        let us_de = graph
            .similarity_arcs()
            .find(|arc| arc.source_code == "en-us" && arc.target_code == "de")
            .unwrap();
        assert_eq!(
            us_de.kind,
            ArcKind::Similarity {
                category: DistanceCategory::SlightlyClose,
                distance: 0.12,
            }
        );
    }

    #[test]
    fn selection_scopes_arcs_and_ignores_the_filter() {
        let (nodes, matrix) = europe();
        let graph = build(&nodes, &matrix, &DistanceFilter::none(), Some("es"));
        let arcs = graph.similarity_arcs().collect::<Vec<_>>();
        assert!(!arcs.is_empty());
        assert!(arcs.iter().all(|arc| arc.touches("es")));
        assert_eq!(arcs.len(), 5);

        let selected = graph.points.iter().find(|point| point.code == "es").unwrap();
        assert_eq!(selected.role, PointRole::Selected);
        assert_eq!(selected.color, SELECTED_COLOR);
        assert!(selected.radius > PRIMARY_RADIUS);
    }

    #[test]
    fn filter_scopes_arcs_without_selection() {
        let (nodes, matrix) = europe();
        let mut filter = DistanceFilter::none();
        filter.set(DistanceCategory::VeryClose, true);
        filter.set(DistanceCategory::SlightlyFar, true);
        let graph = build(&nodes, &matrix, &filter, None);
        assert!(
            graph
                .similarity_arcs()
                .all(|arc| arc.category().is_some_and(|category| filter.is_enabled(category)))
        );
        let pairs = graph
            .similarity_arcs()
            .map(|arc| (arc.source_code.as_str(), arc.target_code.as_str()))
            .collect::<Vec<_>>();
        assert_eq!(
            pairs,
            vec![
                ("en", "es"),
                ("en-us", "es"),
                ("en-au", "es"),
                ("de", "es"),
                ("es", "pt")
            ]
        );
    }

    #[test]
    fn one_directional_entries_still_produce_arcs() {
        let nodes = NodeRegistry::new(vec![
            node("a", "A", 0.0, 0.0, None),
            node("b", "B", 10.0, 10.0, None),
            node("c", "C", 20.0, 20.0, None),
        ])
        .unwrap();
        let mut matrix = SimilarityMatrix::new();
        matrix.insert("B", "A", 0.2);
        let graph = build(&nodes, &matrix, &DistanceFilter::all(), None);
        let arcs = graph.similarity_arcs().collect::<Vec<_>>();
        assert_eq!(arcs.len(), 1);
        assert_eq!((arcs[0].source_code.as_str(), arcs[0].target_code.as_str()), ("a", "b"));
    }

    #[test]
    fn orphans_are_points_without_arcs() {
        let (nodes, matrix) = europe();
        let graph = build(&nodes, &matrix, &DistanceFilter::all(), None);
        assert!(graph.points.iter().any(|point| point.code == "zz"));
        assert!(!graph.arcs.iter().any(|arc| arc.touches("zz")));
    }

    #[test]
    fn points_are_colored_by_role() {
        let (nodes, matrix) = europe();
        let graph = build(&nodes, &matrix, &DistanceFilter::all(), None);
        let en = &graph.points[0];
        let us = &graph.points[1];
        assert_eq!((en.role, en.color), (PointRole::Primary, PRIMARY_COLOR));
        assert_eq!((us.role, us.color), (PointRole::Secondary, SECONDARY_COLOR));
        assert!(en.radius > us.radius);
    }

    #[test]
    fn empty_matrix_renders_points_only() {
        let (nodes, _) = europe();
        let graph = build(&nodes, &SimilarityMatrix::new(), &DistanceFilter::all(), None);
        assert_eq!(graph.points.len(), 7);
        assert_eq!(graph.similarity_arcs().count(), 0);
        assert_eq!(graph.same_language_arcs().count(), 3);
    }
}
