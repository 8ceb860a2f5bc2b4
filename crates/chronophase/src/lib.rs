//! Chronophase: pluggable conversion registry for temporal values
//!
//! Re-exports the core registry and assembles one from [`Settings`], using
//! the providers compiled into this build.
//!
//! # Features
//!
//! - `excel` (default) - spreadsheet serial numbers, provider `excel`
//! - `sample` - the `MyDate` example type, provider `my-date`
//! - `parallel` - run `Registry::convert_many` on rayon

pub use rhi_chronophase_core::*;

#[cfg(feature = "excel")]
pub use rhi_chronophase_excel as excel;

#[cfg(feature = "sample")]
pub use rhi_chronophase_sample as sample;

/// Names of the providers compiled into this build, in install order.
pub fn provider_names() -> Vec<&'static str> {
    vec![
        "core",
        #[cfg(feature = "excel")]
        rhi_chronophase_excel::PROVIDER_NAME,
        #[cfg(feature = "sample")]
        "my-date",
    ]
}

/// Build a registry with every compiled-in provider and default options.
pub fn default_registry() -> Result<Registry, RegistryError> {
    let mut registry = Registry::new();
    for name in provider_names() {
        let provider = provider_for(&ProviderSpec::new(name)).map_err(|e| {
            RegistryError::Provider {
                name: name.to_string(),
                message: e.to_string(),
            }
        })?;
        registry.install(provider.as_ref())?;
    }
    Ok(registry)
}

/// Build a registry from settings. An empty provider list installs every
/// compiled-in provider.
pub fn build_registry(settings: &Settings) -> Result<Registry, SettingsError> {
    if settings.uses_all_providers() {
        return Ok(default_registry()?);
    }

    let mut registry = Registry::new();
    for spec in &settings.providers {
        let provider = provider_for(spec)?;
        registry.install(provider.as_ref())?;
    }
    tracing::debug!(
        providers = settings.providers.len(),
        entries = registry.len(),
        "built registry from settings"
    );
    Ok(registry)
}

/// Parse settings (format from the path extension) and build a registry.
pub fn load_registry(data: &[u8], path: Option<&str>) -> Result<Registry, SettingsError> {
    build_registry(&Settings::from_bytes(data, path)?)
}

fn provider_for(spec: &ProviderSpec) -> Result<Box<dyn Provider>, SettingsError> {
    match spec.name.as_str() {
        "core" => {
            reject_options(spec)?;
            Ok(Box::new(CoreProvider))
        }
        #[cfg(feature = "excel")]
        rhi_chronophase_excel::PROVIDER_NAME => Ok(Box::new(
            rhi_chronophase_excel::ExcelProvider::from_options(&spec.options)?,
        )),
        #[cfg(feature = "sample")]
        "my-date" => {
            reject_options(spec)?;
            Ok(Box::new(rhi_chronophase_sample::MyDateProvider))
        }
        _ => Err(SettingsError::UnknownProvider {
            name: spec.name.clone(),
        }),
    }
}

fn reject_options(spec: &ProviderSpec) -> Result<(), SettingsError> {
    match spec.options.keys().next() {
        Some(key) => Err(SettingsError::InvalidOption {
            provider: spec.name.clone(),
            key: key.clone(),
            message: "provider takes no options".to_string(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_always_available() {
        assert_eq!(provider_names()[0], "core");
        assert!(provider_for(&ProviderSpec::new("core")).is_ok());
    }

    #[test]
    fn test_core_rejects_options() {
        let spec = ProviderSpec::new("core").option("zone", "UTC");
        assert!(matches!(
            provider_for(&spec),
            Err(SettingsError::InvalidOption { ref key, .. }) if key == "zone"
        ));
    }

    #[test]
    fn test_unknown_provider() {
        let settings = Settings::new().provider(ProviderSpec::new("joda"));
        let err = build_registry(&settings).err().unwrap();
        assert!(matches!(err, SettingsError::UnknownProvider { ref name } if name == "joda"));
    }
}
