#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod gameserver;
pub mod gameserver_build;

pub use self::{
    gameserver::{BuildMetadataItem, GameServer, GameServerSpec},
    gameserver_build::{GameServerBuild, GameServerBuildSpec},
};
pub use k8s_openapi::{
    api::{
        self,
        core::v1::{Container, ContainerPort, PodSpec, PodTemplateSpec},
    },
    apimachinery::pkg::apis::meta::v1::{ObjectMeta, OwnerReference},
};
pub use kube::{Resource, ResourceExt};

/// The API group that serves game server resources.
pub const GROUP: &str = "mps.playfab.com";

pub const VERSION: &str = "v1alpha1";

pub const GAME_SERVER_KIND: &str = "GameServer";

/// The kind that must own every GameServer.
///
/// Must match the `kind` registered for [`GameServerBuild`].
pub const GAME_SERVER_BUILD_KIND: &str = "GameServerBuild";
