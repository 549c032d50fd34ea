//! Service descriptor loading and service name resolution

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use prost_reflect::{DescriptorPool, DeserializeOptions, SerializeOptions, ServiceDescriptor};
use serde::Deserialize;

use crate::common::{Error, Result};

/// Options controlling how descriptors are loaded and how messages map to JSON
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct LoaderOptions {
    /// Extra directories searched for `import`ed proto files
    #[serde(default)]
    pub include_paths: Vec<PathBuf>,

    /// Keep proto field names in responses instead of lowerCamelCase JSON names
    #[serde(default)]
    pub keep_case: bool,

    /// Emit fields that hold their default value
    #[serde(default)]
    pub defaults: bool,

    /// Render enum values as numbers instead of names
    #[serde(default)]
    pub enum_numbers: bool,
}

impl LoaderOptions {
    pub(crate) fn serialize_options(&self) -> SerializeOptions {
        SerializeOptions::new()
            .use_proto_field_name(self.keep_case)
            .skip_default_fields(!self.defaults)
            .use_enum_numbers(self.enum_numbers)
    }

    pub(crate) fn deserialize_options(&self) -> DeserializeOptions {
        DeserializeOptions::new().deny_unknown_fields(false)
    }
}

/// Load a descriptor pool from `location`
///
/// `.proto` sources are compiled in-process; anything else is read as an
/// encoded `FileDescriptorSet` (e.g. `protoc --descriptor_set_out`).
pub fn load_descriptor(location: &Path, options: &LoaderOptions) -> Result<DescriptorPool> {
    let is_source = location.extension().and_then(|e| e.to_str()) == Some("proto");

    if is_source {
        let mut includes = options.include_paths.clone();
        if let Some(parent) = location.parent() {
            let parent = if parent.as_os_str().is_empty() {
                PathBuf::from(".")
            } else {
                parent.to_path_buf()
            };
            includes.push(parent);
        }

        let mut compiler =
            protox::Compiler::new(includes).map_err(|e| Error::descriptor_load(location, e))?;
        compiler.include_imports(true);
        compiler
            .open_file(location)
            .map_err(|e| Error::descriptor_load(location, e))?;

        tracing::debug!(path = %location.display(), "Compiled proto source");
        DescriptorPool::from_file_descriptor_set(compiler.file_descriptor_set())
            .map_err(|e| Error::descriptor_load(location, e))
    } else {
        let bytes = std::fs::read(location).map_err(|e| Error::descriptor_load(location, e))?;
        tracing::debug!(path = %location.display(), bytes = bytes.len(), "Read descriptor set");
        DescriptorPool::decode(bytes.as_slice()).map_err(|e| Error::descriptor_load(location, e))
    }
}

/// Resolve a fully-qualified service name against the loaded package tree
///
/// Each dot-separated segment must name a package, a type, or the service
/// itself; the first segment that does not exist is reported along with
/// the path resolved so far.
pub fn resolve_service(pool: &DescriptorPool, service_name: &str) -> Result<ServiceDescriptor> {
    let namespaces = package_namespaces(pool);
    let mut resolved = String::new();

    for segment in service_name.split('.') {
        if segment.is_empty() {
            return Err(Error::client_construction(
                service_name,
                "service name contains an empty segment",
            ));
        }

        let candidate = if resolved.is_empty() {
            segment.to_string()
        } else {
            format!("{resolved}.{segment}")
        };

        let known = namespaces.contains(candidate.as_str())
            || pool.get_service_by_name(&candidate).is_some()
            || pool.get_message_by_name(&candidate).is_some()
            || pool.get_enum_by_name(&candidate).is_some();

        if !known {
            let parent = if resolved.is_empty() { "<root>" } else { resolved.as_str() };
            return Err(Error::client_construction(
                &candidate,
                format!("'{segment}' not found under {parent}"),
            ));
        }
        resolved = candidate;
    }

    pool.get_service_by_name(&resolved).ok_or_else(|| {
        let kind = if namespaces.contains(resolved.as_str()) {
            "a package"
        } else if pool.get_message_by_name(&resolved).is_some() {
            "a message type"
        } else {
            "an enum type"
        };
        Error::client_construction(&resolved, format!("{kind}, not a service"))
    })
}

/// Every package name and each of its dotted prefixes
fn package_namespaces(pool: &DescriptorPool) -> HashSet<String> {
    let mut namespaces = HashSet::new();
    for file in pool.files() {
        let package = file.package_name();
        if package.is_empty() {
            continue;
        }
        let mut prefix = String::new();
        for part in package.split('.') {
            if !prefix.is_empty() {
                prefix.push('.');
            }
            prefix.push_str(part);
            namespaces.insert(prefix.clone());
        }
    }
    namespaces
}
