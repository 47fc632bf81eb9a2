use serde::{Deserialize, Serialize};

/// A place/transition net.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PnmlNetDto {
    pub id: String,
    #[serde(default)]
    pub name: String,

    pub places: Vec<PnmlPlaceDto>,
    pub transitions: Vec<PnmlTransitionDto>,
    pub arcs: Vec<PnmlArcDto>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PnmlPlaceDto {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub initial_marking: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PnmlTransitionDto {
    pub id: String,
    /// Silent (tau) transitions carry no label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PnmlArcDto {
    pub id: String,
    pub source: String,
    pub target: String,
}
