use k8s_openapi::api::core::v1::PodTemplateSpec;
use kube::CustomResource;
use serde::{Deserialize, Serialize};

/// Describes a deployable build of a game server. GameServers are created
/// from, and owned by, a GameServerBuild.
#[derive(Clone, Debug, Default, PartialEq, CustomResource, Deserialize, Serialize)]
#[kube(
    group = "mps.playfab.com",
    version = "v1alpha1",
    kind = "GameServerBuild",
    namespaced,
    schema = "disabled"
)]
#[serde(rename_all = "camelCase")]
pub struct GameServerBuildSpec {
    #[serde(rename = "buildID")]
    pub build_id: String,

    #[serde(rename = "titleID", default)]
    pub title_id: String,

    /// Number of game servers to keep in the StandingBy state.
    pub standing_by: i32,

    /// Upper bound on the total number of game servers for this build.
    pub max: i32,

    #[serde(default)]
    pub ports_to_expose: Vec<i32>,

    pub template: PodTemplateSpec,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crashes_to_mark_unhealthy: Option<i32>,
}
