use serde::{Deserialize, Serialize};

/// A YAWL specification: a set of net decompositions, one of them the root net.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct YawlSpecificationDto {
    pub uri: String,
    #[serde(default)]
    pub name: String,

    pub root_net: String,
    pub decompositions: Vec<YawlNetDto>,

    #[serde(default)]
    pub roles: Vec<YawlRoleDto>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct YawlRoleDto {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct YawlNetDto {
    pub id: String,
    #[serde(default)]
    pub name: String,

    pub input_condition: YawlConditionDto,
    pub output_condition: YawlConditionDto,

    #[serde(default)]
    pub conditions: Vec<YawlConditionDto>,
    #[serde(default)]
    pub tasks: Vec<YawlTaskDto>,
    #[serde(default)]
    pub flows: Vec<YawlFlowDto>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct YawlConditionDto {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct YawlTaskDto {
    pub id: String,
    #[serde(default)]
    pub name: String,

    #[serde(default = "YawlCodeDto::default_join")]
    pub join: YawlCodeDto,
    #[serde(default = "YawlCodeDto::default_split")]
    pub split: YawlCodeDto,

    /// Net decomposition of a composite task.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decomposes_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multi_instance: Option<YawlMultiInstanceDto>,
    /// Ids of the tasks and conditions in this task's cancellation set.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cancels: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum YawlCodeDto {
    And,
    Or,
    Xor,
}

impl YawlCodeDto {
    fn default_join() -> Self {
        YawlCodeDto::Xor
    }

    fn default_split() -> Self {
        YawlCodeDto::And
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct YawlMultiInstanceDto {
    pub minimum: u32,
    #[serde(default)]
    pub maximum: Option<u32>,
    #[serde(default)]
    pub threshold: Option<u32>,
    #[serde(default)]
    pub creation_mode: YawlCreationModeDto,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum YawlCreationModeDto {
    #[default]
    Static,
    Dynamic,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct YawlFlowDto {
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicate: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_default: bool,
}
