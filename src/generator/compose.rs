//! Composition-file generator: one service description per manifest,
//! referencing the same image the build-file targets.

use serde_yaml::{Mapping, Value};

use crate::model::Manifest;

use super::IMAGE_TAG;

pub(crate) fn generate(manifest: &Manifest) -> String {
    let mut service = Mapping::new();
    service.insert(key("build"), str_value("."));
    service.insert(key("image"), str_value(IMAGE_TAG));
    // Containers reach servers on the host through the gateway alias.
    service.insert(
        key("extra_hosts"),
        Value::Sequence(vec![str_value("host.docker.internal:host-gateway")]),
    );

    if !manifest.secrets.is_empty() {
        let mut environment = Mapping::new();
        for secret in &manifest.secrets {
            let value = match &secret.value {
                Some(literal) => literal.clone(),
                None => format!("${{{}}}", secret.name),
            };
            environment.insert(key(&secret.name), str_value(&value));
        }
        service.insert(key("environment"), Value::Mapping(environment));
    }

    if !manifest.expose_ports.is_empty() {
        let ports = manifest
            .expose_ports
            .iter()
            .map(|port| str_value(&format!("{port}:{port}")))
            .collect();
        service.insert(key("ports"), Value::Sequence(ports));
    }

    let mut services = Mapping::new();
    services.insert(key("agent"), Value::Mapping(service));
    let mut root = Mapping::new();
    root.insert(key("services"), Value::Mapping(services));

    serde_yaml::to_string(&Value::Mapping(root)).unwrap_or_default()
}

fn key(name: &str) -> Value {
    Value::String(name.to_string())
}

fn str_value(value: &str) -> Value {
    Value::String(value.to_string())
}
