// User-facing chart configuration (sparse, every field optional)

use serde::de::value::StrDeserializer;
use serde::de::IntoDeserializer;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Shape drawn for the primary series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    #[default]
    Bar,
    Line,
    Scatter,
}

/// How several bar series share one category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BarMode {
    #[default]
    Stacked,
    Grouped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Orientation {
    #[serde(rename = "h")]
    Horizontal,
    #[serde(rename = "v")]
    #[default]
    Vertical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegendPosition {
    #[default]
    Right,
    Left,
    Top,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Show,
    #[default]
    Hide,
}

/// Complete chart configuration as supplied by the caller.
/// Unknown keys are ignored; missing keys are filled by `resolve::normalize`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub style: StyleConfig,
    pub piston: OverlayConfig,
    pub marker: OverlayConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<Vec<Threshold>>,
    pub legend: LegendConfig,
    /// Series name -> color. These always win over palette colors.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub color: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub chart_type: Option<ChartType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barmode: Option<BarMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orientation: Option<Orientation>,
    pub canvas: CanvasConfig,
    pub margin: MarginConfig,
    pub legend: LegendStyleConfig,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MarginConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bottom: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left: Option<f64>,
}

/// Legend geometry.
///
/// `position` distinguishes an absent key (use the default) from an explicit
/// `null` or `"none"` (no legend area): `None` vs `Some(None)`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LegendStyleConfig {
    #[serde(
        deserialize_with = "legend_position",
        skip_serializing_if = "Option::is_none"
    )]
    pub position: Option<Option<LegendPosition>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orient: Option<Orientation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translate_x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translate_y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
}

/// An overlay series (piston or marker) taken out of the dataset columns
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
}

/// Horizontal reference line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Threshold {
    #[serde(default)]
    pub name: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LegendConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orient: Option<Orientation>,
}

impl ChartConfig {
    pub fn from_json_str(text: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

fn legend_position<'de, D>(deserializer: D) -> Result<Option<Option<LegendPosition>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)?.as_deref() {
        None | Some("none") => Ok(Some(None)),
        Some(name) => {
            let de: StrDeserializer<D::Error> = name.into_deserializer();
            LegendPosition::deserialize(de).map(|p| Some(Some(p)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object() {
        let cfg = ChartConfig::from_json_str("{}").unwrap();
        assert_eq!(cfg, ChartConfig::default());
    }

    #[test]
    fn test_parse_full() {
        let cfg = ChartConfig::from_json_str(
            r##"{
                "style": {"type": "line", "barmode": "grouped", "orientation": "h",
                          "canvas": {"width": 400, "height": 250},
                          "legend": {"position": "right", "orient": "h"}},
                "piston": {"name": "cap", "fill": "#333"},
                "threshold": [{"name": "limit", "value": 12.5}],
                "legend": {"visibility": "show", "orient": "v"},
                "color": {"a": "red"}
            }"##,
        )
        .unwrap();
        assert_eq!(cfg.style.chart_type, Some(ChartType::Line));
        assert_eq!(cfg.style.barmode, Some(BarMode::Grouped));
        assert_eq!(cfg.style.orientation, Some(Orientation::Horizontal));
        assert_eq!(cfg.style.canvas.width, Some(400.0));
        assert_eq!(cfg.style.legend.position, Some(Some(LegendPosition::Right)));
        assert_eq!(cfg.piston.name.as_deref(), Some("cap"));
        assert_eq!(cfg.threshold.as_ref().map(|t| t.len()), Some(1));
        assert_eq!(cfg.legend.visibility, Some(Visibility::Show));
        assert_eq!(cfg.color.get("a").map(String::as_str), Some("red"));
    }

    #[test]
    fn test_explicit_null_legend_position() {
        let cfg = ChartConfig::from_json_str(r#"{"style": {"legend": {"position": null}}}"#).unwrap();
        assert_eq!(cfg.style.legend.position, Some(None));
        let cfg = ChartConfig::from_json_str(r#"{"style": {"legend": {"position": "none"}}}"#).unwrap();
        assert_eq!(cfg.style.legend.position, Some(None));
        let cfg = ChartConfig::from_json_str(r#"{"style": {"legend": {}}}"#).unwrap();
        assert_eq!(cfg.style.legend.position, None);
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let cfg = ChartConfig::from_json_str(r#"{"title": "x", "style": {"animate": true}}"#).unwrap();
        assert_eq!(cfg, ChartConfig::default());
    }

    #[test]
    fn test_bad_enum_value_is_error() {
        assert!(ChartConfig::from_json_str(r#"{"style": {"type": "pie"}}"#).is_err());
    }
}
