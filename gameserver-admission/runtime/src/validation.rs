use crate::k8s::{
    gameserver::declared_ports, Container, GameServer, OwnerReference, ResourceExt,
    GAME_SERVER_BUILD_KIND,
};
use anyhow::{anyhow, Result};
use std::collections::HashSet;
use thiserror::Error;

/// Reasons a GameServer is refused admission.
///
/// The messages are surfaced to the submitter verbatim.
#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum Rejection {
    /// No owner reference names a GameServerBuild.
    #[error("a GameServer must have a GameServerBuild as an owner")]
    Ownership,

    /// A value in `portsToExpose` matches no declared container port.
    #[error("there must be at least one port that matches each value in portsToExpose")]
    PortExposure,

    /// A container port that must be named has an empty name.
    #[error("ports to expose must have a name")]
    PortNaming,
}

/// Selects which container ports must carry a name.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum PortNamePolicy {
    /// Every port declared by any container.
    #[default]
    AllDeclared,

    /// Only declared ports whose number appears in `portsToExpose`.
    ExposedOnly,
}

/// Runs every admission rule against a GameServer.
#[derive(Copy, Clone, Debug, Default)]
pub struct Validator {
    port_names: PortNamePolicy,
}

// === impl Rejection ===

impl Rejection {
    /// A stable, metric-friendly name for the rule that was violated.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ownership => "ownership",
            Self::PortExposure => "port_exposure",
            Self::PortNaming => "port_naming",
        }
    }
}

// === impl PortNamePolicy ===

impl std::str::FromStr for PortNamePolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "all-declared" => Ok(Self::AllDeclared),
            "exposed-only" => Ok(Self::ExposedOnly),
            s => Err(anyhow!("invalid port name policy: {:?}", s)),
        }
    }
}

impl std::fmt::Display for PortNamePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AllDeclared => "all-declared".fmt(f),
            Self::ExposedOnly => "exposed-only".fmt(f),
        }
    }
}

// === impl Validator ===

impl Validator {
    pub fn new(port_names: PortNamePolicy) -> Self {
        Self { port_names }
    }

    /// Checks ownership, then port exposure, then port names, returning the
    /// first violation.
    pub fn validate(&self, gs: &GameServer) -> Result<(), Rejection> {
        check_ownership(gs.owner_references())?;

        let containers = gs.spec.containers();
        check_ports_to_expose(
            &gs.spec.ports_to_expose,
            containers,
            gs.spec.host_network(),
        )?;
        check_port_names(containers, &gs.spec.ports_to_expose, self.port_names)
    }
}

/// Requires at least one owner of kind GameServerBuild. The owner's group and
/// version are not considered.
pub fn check_ownership(owners: &[OwnerReference]) -> Result<(), Rejection> {
    if owners.iter().any(|o| o.kind == GAME_SERVER_BUILD_KIND) {
        return Ok(());
    }
    Err(Rejection::Ownership)
}

/// Requires every exposed port to match a port declared by some container.
///
/// Pods on the host network have no per-container ports to match against, so
/// the check is skipped for them.
pub fn check_ports_to_expose(
    ports_to_expose: &[i32],
    containers: &[Container],
    host_network: bool,
) -> Result<(), Rejection> {
    if host_network {
        return Ok(());
    }

    let declared = declared_ports(containers)
        .map(|p| p.container_port)
        .collect::<HashSet<_>>();
    if ports_to_expose.iter().all(|p| declared.contains(p)) {
        return Ok(());
    }
    Err(Rejection::PortExposure)
}

/// Requires names on the container ports selected by `policy`. A missing name
/// is treated the same as an empty one.
pub fn check_port_names(
    containers: &[Container],
    ports_to_expose: &[i32],
    policy: PortNamePolicy,
) -> Result<(), Rejection> {
    let unnamed = declared_ports(containers)
        .filter(|p| match policy {
            PortNamePolicy::AllDeclared => true,
            PortNamePolicy::ExposedOnly => ports_to_expose.contains(&p.container_port),
        })
        .any(|p| p.name.as_deref().unwrap_or_default().is_empty());
    if unnamed {
        return Err(Rejection::PortNaming);
    }
    Ok(())
}
