use std::collections::HashMap;

use ember_glow::{Access, Parameter, ParameterType, Path};

/// Per-session cache of `identifier`/`access`/`type` per parameter path, so a
/// value-only update (e.g. a stream-driven change) still presents a coherent
/// record to the host. Does not persist across disconnect.
#[derive(Debug, Default)]
pub struct ParameterMetadataCache {
    entries: HashMap<Path, Metadata>,
}

#[derive(Debug, Clone, Default)]
struct Metadata {
    identifier: Option<String>,
    access: Option<Access>,
    param_type: Option<ParameterType>,
}

impl ParameterMetadataCache {
    pub fn new() -> Self {
        ParameterMetadataCache::default()
    }

    pub fn record(&mut self, path: &Path, parameter: &Parameter) {
        let entry = self.entries.entry(path.clone()).or_default();
        if parameter.identifier.is_some() {
            entry.identifier = parameter.identifier.clone();
        }
        if parameter.access.is_some() {
            entry.access = parameter.access;
        }
        if parameter.param_type.is_some() {
            entry.param_type = parameter.param_type;
        }
    }

    /// Fill in identifier/access/type on `parameter` from the cache when the
    /// update itself didn't carry them.
    pub fn fill(&self, path: &Path, parameter: &mut Parameter) {
        let Some(entry) = self.entries.get(path) else { return };
        if parameter.identifier.is_none() {
            parameter.identifier = entry.identifier.clone();
        }
        if parameter.access.is_none() {
            parameter.access = entry.access;
        }
        if parameter.param_type.is_none() {
            parameter.param_type = entry.param_type;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_only_update_is_completed_from_cache() {
        let mut cache = ParameterMetadataCache::new();
        let path = Path::parse("1.1").unwrap();
        cache.record(
            &path,
            &Parameter {
                identifier: Some("gain".to_string()),
                access: Some(Access::ReadWrite),
                param_type: Some(ParameterType::Real),
                ..Default::default()
            },
        );

        let mut update = Parameter { value: Some(ember_glow::GlowValue::Real(-3.0)), ..Default::default() };
        cache.fill(&path, &mut update);

        assert_eq!(update.identifier.as_deref(), Some("gain"));
        assert_eq!(update.access, Some(Access::ReadWrite));
        assert_eq!(update.param_type, Some(ParameterType::Real));
    }

    #[test]
    fn unknown_path_leaves_update_untouched() {
        let cache = ParameterMetadataCache::new();
        let mut update = Parameter { value: Some(ember_glow::GlowValue::Integer(1)), ..Default::default() };
        cache.fill(&Path::parse("9.9").unwrap(), &mut update);
        assert!(update.identifier.is_none());
    }
}
