use k8s_openapi::api::core::v1::{Container, ContainerPort, PodTemplateSpec};
use kube::CustomResource;
use serde::{Deserialize, Deserializer, Serialize};

/// Describes a single game server instance created on behalf of a
/// GameServerBuild.
#[derive(Clone, Debug, Default, PartialEq, CustomResource, Deserialize, Serialize)]
#[kube(
    group = "mps.playfab.com",
    version = "v1alpha1",
    kind = "GameServer",
    namespaced,
    schema = "disabled"
)]
#[serde(rename_all = "camelCase")]
pub struct GameServerSpec {
    #[serde(rename = "buildID")]
    pub build_id: String,

    /// Container port numbers that must be reachable from outside the cluster.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub ports_to_expose: Vec<i32>,

    pub template: PodTemplateSpec,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_metadata: Option<Vec<BuildMetadataItem>>,
}

/// Free-form metadata passed from the build to the game server process.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct BuildMetadataItem {
    pub key: String,
    pub value: String,
}

// === impl GameServerSpec ===

impl GameServerSpec {
    pub fn containers(&self) -> &[Container] {
        self.template
            .spec
            .as_ref()
            .map(|pod| pod.containers.as_slice())
            .unwrap_or_default()
    }

    /// Indicates whether the pod shares the node's network namespace.
    pub fn host_network(&self) -> bool {
        self.template
            .spec
            .as_ref()
            .and_then(|pod| pod.host_network)
            .unwrap_or(false)
    }
}

/// Flattens the ports of all `containers`, ignoring which container declares
/// each port.
pub fn declared_ports(containers: &[Container]) -> impl Iterator<Item = &ContainerPort> {
    containers.iter().flat_map(|c| c.ports.iter().flatten())
}

/// Reads an explicit `null` list as empty, the same as an omitted one.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::core::v1::PodSpec;

    fn port(container_port: i32, name: &str) -> ContainerPort {
        ContainerPort {
            container_port,
            name: Some(name.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn empty_template() {
        let spec = GameServerSpec::default();
        assert!(spec.containers().is_empty());
        assert!(!spec.host_network());
        assert_eq!(declared_ports(spec.containers()).count(), 0);
    }

    #[test]
    fn flattens_ports_across_containers() {
        let spec = GameServerSpec {
            template: PodTemplateSpec {
                spec: Some(PodSpec {
                    containers: vec![
                        Container {
                            name: "game".to_string(),
                            ports: Some(vec![port(80, "gamePort"), port(81, "queryPort")]),
                            ..Default::default()
                        },
                        Container {
                            name: "sidecar".to_string(),
                            ports: None,
                            ..Default::default()
                        },
                        Container {
                            name: "metrics".to_string(),
                            ports: Some(vec![port(9090, "metrics")]),
                            ..Default::default()
                        },
                    ],
                    host_network: Some(true),
                    ..Default::default()
                }),
                ..Default::default()
            },
            ..Default::default()
        };

        let ports = declared_ports(spec.containers())
            .map(|p| p.container_port)
            .collect::<Vec<_>>();
        assert_eq!(ports, vec![80, 81, 9090]);
        assert!(spec.host_network());
    }

    #[test]
    fn deserializes_wire_names() {
        let spec: GameServerSpec = serde_json::from_value(serde_json::json!({
            "buildID": "85ffe8da-c82f-4035-86c5-9d2b5f42d6f6",
            "portsToExpose": [80],
            "template": {
                "spec": {
                    "containers": [{
                        "name": "testcontainer",
                        "image": "game:latest",
                        "ports": [{ "containerPort": 80, "name": "gamePort" }],
                    }],
                },
            },
        }))
        .expect("spec must parse");

        assert_eq!(spec.build_id, "85ffe8da-c82f-4035-86c5-9d2b5f42d6f6");
        assert_eq!(spec.ports_to_expose, vec![80]);
        assert_eq!(spec.containers().len(), 1);
        assert_eq!(spec.build_metadata, None);
    }

    #[test]
    fn null_ports_to_expose_is_empty() {
        for ports in [serde_json::json!(null), serde_json::json!([])] {
            let spec: GameServerSpec = serde_json::from_value(serde_json::json!({
                "buildID": "85ffe8da-c82f-4035-86c5-9d2b5f42d6f6",
                "portsToExpose": ports,
                "template": {},
            }))
            .expect("spec must parse");
            assert!(spec.ports_to_expose.is_empty());
        }

        let spec: GameServerSpec = serde_json::from_value(serde_json::json!({
            "buildID": "85ffe8da-c82f-4035-86c5-9d2b5f42d6f6",
            "template": {},
        }))
        .expect("spec must parse");
        assert!(spec.ports_to_expose.is_empty());
    }
}
