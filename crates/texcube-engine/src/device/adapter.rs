use crate::error::RenderError;

/// Minimum capability level an adapter must report.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum FeatureLevel {
    /// Full WebGPU limits on a compliant adapter.
    #[default]
    Core,
    /// wgpu's downlevel defaults (older GL/GLES-class hardware).
    Downlevel,
}

impl FeatureLevel {
    /// Limits requested from the device for this level.
    pub fn required_limits(self) -> wgpu::Limits {
        match self {
            Self::Core => wgpu::Limits::default(),
            Self::Downlevel => wgpu::Limits::downlevel_defaults(),
        }
    }

    fn requires_webgpu_compliance(self) -> bool {
        matches!(self, Self::Core)
    }
}

/// What selection needs to know about an adapter.
///
/// Built from the adapter's reported info and limits; no device is opened.
#[derive(Debug, Clone)]
pub struct AdapterCandidate {
    pub name: String,
    pub backend: wgpu::Backend,
    pub device_type: wgpu::DeviceType,
    pub limits: wgpu::Limits,
    pub webgpu_compliant: bool,
}

impl AdapterCandidate {
    pub fn from_adapter(adapter: &wgpu::Adapter) -> Self {
        let info = adapter.get_info();
        Self {
            name: info.name,
            backend: info.backend,
            device_type: info.device_type,
            limits: adapter.limits(),
            webgpu_compliant: adapter.get_downlevel_capabilities().is_webgpu_compliant(),
        }
    }

    /// CPU rasterizers (WARP, llvmpipe, SwiftShader).
    pub fn is_software(&self) -> bool {
        self.device_type == wgpu::DeviceType::Cpu
    }

    pub fn supports(&self, level: FeatureLevel) -> bool {
        if level.requires_webgpu_compliance() && !self.webgpu_compliant {
            return false;
        }
        level.required_limits().check_limits(&self.limits)
    }
}

/// Outcome of adapter selection: index into the candidate list.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AdapterChoice {
    Hardware(usize),
    Software(usize),
}

impl AdapterChoice {
    pub fn index(self) -> usize {
        match self {
            Self::Hardware(i) | Self::Software(i) => i,
        }
    }
}

/// Picks the first adapter that meets `level`.
///
/// Without `use_software`, software adapters are skipped so a slow fallback
/// renderer is never chosen by accident. With it, only software adapters are
/// considered.
pub fn select_adapter(
    candidates: &[AdapterCandidate],
    level: FeatureLevel,
    use_software: bool,
) -> Result<AdapterChoice, RenderError> {
    let found = candidates
        .iter()
        .position(|c| c.is_software() == use_software && c.supports(level));

    match (found, use_software) {
        (Some(i), false) => Ok(AdapterChoice::Hardware(i)),
        (Some(i), true) => Ok(AdapterChoice::Software(i)),
        (None, software) => Err(RenderError::NoSuitableAdapter {
            kind: if software { "software" } else { "hardware" },
            level,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(name: &str, device_type: wgpu::DeviceType, level: FeatureLevel) -> AdapterCandidate {
        AdapterCandidate {
            name: name.to_string(),
            backend: wgpu::Backend::Vulkan,
            device_type,
            limits: level.required_limits(),
            webgpu_compliant: level == FeatureLevel::Core,
        }
    }

    #[test]
    fn skips_software_adapters_for_hardware_requests() {
        let list = [
            candidate("llvmpipe", wgpu::DeviceType::Cpu, FeatureLevel::Core),
            candidate("discrete", wgpu::DeviceType::DiscreteGpu, FeatureLevel::Core),
        ];
        assert_eq!(
            select_adapter(&list, FeatureLevel::Core, false).unwrap(),
            AdapterChoice::Hardware(1)
        );
    }

    #[test]
    fn picks_first_qualifying_hardware_adapter() {
        let list = [
            candidate("old", wgpu::DeviceType::IntegratedGpu, FeatureLevel::Downlevel),
            candidate("a", wgpu::DeviceType::DiscreteGpu, FeatureLevel::Core),
            candidate("b", wgpu::DeviceType::DiscreteGpu, FeatureLevel::Core),
        ];
        assert_eq!(
            select_adapter(&list, FeatureLevel::Core, false).unwrap(),
            AdapterChoice::Hardware(1)
        );
        assert_eq!(
            select_adapter(&list, FeatureLevel::Downlevel, false).unwrap(),
            AdapterChoice::Hardware(0)
        );
    }

    #[test]
    fn hardware_request_without_qualifying_adapter_is_fatal() {
        let list = [
            candidate("old", wgpu::DeviceType::IntegratedGpu, FeatureLevel::Downlevel),
            candidate("warp", wgpu::DeviceType::Cpu, FeatureLevel::Core),
        ];
        let err = select_adapter(&list, FeatureLevel::Core, false).unwrap_err();
        assert!(matches!(
            err,
            RenderError::NoSuitableAdapter { kind: "hardware", level: FeatureLevel::Core }
        ));
    }

    #[test]
    fn software_flag_selects_software_adapter() {
        let list = [
            candidate("old", wgpu::DeviceType::IntegratedGpu, FeatureLevel::Downlevel),
            candidate("warp", wgpu::DeviceType::Cpu, FeatureLevel::Core),
        ];
        assert_eq!(
            select_adapter(&list, FeatureLevel::Core, true).unwrap(),
            AdapterChoice::Software(1)
        );
    }

    #[test]
    fn software_flag_never_picks_hardware() {
        let list = [candidate("discrete", wgpu::DeviceType::DiscreteGpu, FeatureLevel::Core)];
        assert!(select_adapter(&list, FeatureLevel::Core, true).is_err());
    }

    #[test]
    fn non_compliant_adapter_fails_core_level() {
        let mut c = candidate("gles", wgpu::DeviceType::IntegratedGpu, FeatureLevel::Core);
        c.webgpu_compliant = false;
        assert!(!c.supports(FeatureLevel::Core));
        assert!(c.supports(FeatureLevel::Downlevel));
    }

    #[test]
    fn empty_list_is_fatal() {
        assert!(select_adapter(&[], FeatureLevel::Downlevel, false).is_err());
    }
}
