// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `crd.rs`

#[cfg(test)]
mod tests {
    use crate::constants::{API_GROUP, API_VERSION, KIND_GENERATOR, KIND_PROXY, KIND_PROXY_SERVICE};
    use crate::crd::{Generator, GeneratorSpec, Proxy, ProxyService};
    use kube::{CustomResourceExt, Resource};

    #[test]
    fn test_crd_names() {
        let cases = [
            (Generator::crd(), KIND_GENERATOR, "generators"),
            (Proxy::crd(), KIND_PROXY, "proxies"),
            (ProxyService::crd(), KIND_PROXY_SERVICE, "proxyservices"),
        ];

        for (crd, kind, plural) in cases {
            assert_eq!(crd.spec.group, API_GROUP);
            assert_eq!(crd.spec.names.kind, kind);
            assert_eq!(crd.spec.names.plural, plural);
            assert_eq!(crd.spec.scope, "Namespaced");
            assert_eq!(crd.spec.versions.len(), 1);
            assert_eq!(crd.spec.versions[0].name, API_VERSION);
        }
    }

    #[test]
    fn test_api_version() {
        assert_eq!(
            Generator::api_version(&()),
            format!("{API_GROUP}/{API_VERSION}")
        );
    }

    #[test]
    fn test_empty_spec_round_trips() {
        let json = serde_json::json!({
            "apiVersion": "managed.openshift.io/v1alpha1",
            "kind": "Generator",
            "metadata": { "name": "generator", "namespace": "ops" },
            "spec": {}
        });

        let generator: Generator = serde_json::from_value(json).unwrap();

        assert_eq!(generator.spec, GeneratorSpec::default());
        assert_eq!(generator.metadata.name.as_deref(), Some("generator"));
    }

    #[test]
    fn test_unknown_spec_fields_are_ignored() {
        let json = serde_json::json!({
            "apiVersion": "managed.openshift.io/v1alpha1",
            "kind": "Proxy",
            "metadata": { "name": "edge", "namespace": "ops" },
            "spec": { "replicas": 3 }
        });

        let proxy: Proxy = serde_json::from_value(json).unwrap();
        assert_eq!(proxy.metadata.name.as_deref(), Some("edge"));
    }
}
