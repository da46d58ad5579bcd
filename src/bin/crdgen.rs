// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! CRD YAML Generator
//!
//! Generates Kubernetes CRD YAML files from Rust types defined in src/crd.rs.
//! This keeps the YAML files in deploy/crds/ in sync with the Rust code.
//!
//! Usage:
//!   cargo run --bin crdgen [output-dir]
//!
//! Generated files are written to deploy/crds/ unless another directory is given.

use generator_operator::crd::{Generator, Proxy, ProxyService};
use kube::CustomResourceExt;
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_OUTPUT_DIR: &str = "deploy/crds";

const COPYRIGHT_HEADER: &str = "# Copyright (c) 2025 Erick Bourgeois, firestoned
# SPDX-License-Identifier: MIT
#
# This file is AUTO-GENERATED from src/crd.rs
# DO NOT EDIT MANUALLY - Run `cargo run --bin crdgen` to regenerate
#
";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let output_dir = std::env::args()
        .nth(1)
        .map_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR), PathBuf::from);

    fs::create_dir_all(&output_dir)?;

    println!("Generating CRD YAML files from src/crd.rs...");

    generate_crd::<Generator>("generators.crd.yaml", &output_dir)?;
    generate_crd::<Proxy>("proxies.crd.yaml", &output_dir)?;
    generate_crd::<ProxyService>("proxyservices.crd.yaml", &output_dir)?;

    println!(
        "✓ Successfully generated CRD YAML files in {}",
        output_dir.display()
    );
    println!("\nNext steps:");
    println!("  1. Review the generated files");
    println!("  2. Deploy with: kubectl apply -f {}", output_dir.display());

    Ok(())
}

fn generate_crd<T>(filename: &str, output_dir: &Path) -> Result<(), Box<dyn std::error::Error>>
where
    T: CustomResourceExt,
{
    let yaml = serde_yaml::to_string(&T::crd())?;
    let content = format!("{COPYRIGHT_HEADER}{yaml}");

    fs::write(output_dir.join(filename), content)?;

    println!("  ✓ Generated {filename}");

    Ok(())
}
