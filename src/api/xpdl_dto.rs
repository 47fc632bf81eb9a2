use serde::{Deserialize, Serialize};

/// An XPDL package. The first workflow process is the main process; the others are
/// only reachable as sub-flows.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct XpdlPackageDto {
    pub id: String,
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub participants: Vec<XpdlParticipantDto>,
    pub workflow_processes: Vec<XpdlProcessDto>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct XpdlParticipantDto {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct XpdlProcessDto {
    pub id: String,
    #[serde(default)]
    pub name: String,

    pub activities: Vec<XpdlActivityDto>,
    #[serde(default)]
    pub transitions: Vec<XpdlTransitionDto>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct XpdlActivityDto {
    pub id: String,
    #[serde(default)]
    pub name: String,

    #[serde(flatten)]
    pub kind: XpdlActivityKindDto,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub performers: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multi_instance_loop: Option<XpdlMultiInstanceLoopDto>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum XpdlActivityKindDto {
    Task,
    SubFlow { process: String },
    Route { gateway: XpdlGatewayTypeDto },
    StartEvent,
    EndEvent,
    IntermediateEvent,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum XpdlGatewayTypeDto {
    Parallel,
    Exclusive,
    Inclusive,
    EventBased,
    Complex,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct XpdlMultiInstanceLoopDto {
    pub minimum: u32,
    #[serde(default)]
    pub maximum: Option<u32>,
    #[serde(default)]
    pub complex_threshold: Option<u32>,
    #[serde(default)]
    pub dynamic: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct XpdlTransitionDto {
    pub id: String,
    pub from: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    /// Transition taken when no other condition holds.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub otherwise: bool,
}
