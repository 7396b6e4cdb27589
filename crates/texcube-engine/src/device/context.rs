use crate::error::RenderError;

use super::adapter::{select_adapter, AdapterCandidate, AdapterChoice};
use super::{DeviceInit, FeatureLevel};

/// Owns the wgpu instance, the selected adapter, the logical device and its
/// direct queue.
///
/// Built once at startup and kept for the process lifetime. Everything else in
/// the pipeline (swap chain, uploads, pipeline state, fence) is created from it.
pub struct DeviceContext {
    /// Instance used to enumerate adapters and create surfaces.
    instance: wgpu::Instance,

    /// Selected adapter.
    adapter: wgpu::Adapter,

    /// Logical device.
    device: wgpu::Device,

    /// Direct (graphics) command queue.
    queue: wgpu::Queue,
}

impl DeviceContext {
    /// Selects an adapter and creates the device and queue.
    ///
    /// Adapter/device acquisition is asynchronous under wgpu.
    pub async fn new(init: DeviceInit) -> Result<Self, RenderError> {
        let instance = create_instance(&init);
        let adapters = instance.enumerate_adapters(init.backends).await;
        let candidates: Vec<AdapterCandidate> =
            adapters.iter().map(AdapterCandidate::from_adapter).collect();

        for c in &candidates {
            log::debug!(
                "adapter candidate: {} ({:?}, {:?}, compliant: {})",
                c.name,
                c.backend,
                c.device_type,
                c.webgpu_compliant
            );
        }

        let adapter = match select_adapter(&candidates, init.feature_level, init.use_software_adapter) {
            Ok(choice) => {
                let index = choice.index();
                adapters
                    .into_iter()
                    .nth(index)
                    .ok_or(RenderError::NoSuitableAdapter {
                        kind: choice_kind(choice),
                        level: init.feature_level,
                    })?
            }
            // Some platforms only expose their software rasterizer through the
            // fallback request, not through enumeration.
            Err(err) if init.use_software_adapter => {
                request_fallback_adapter(&instance, init.feature_level).await.ok_or(err)?
            }
            Err(err) => return Err(err),
        };

        Self::with_adapter(instance, adapter, &init).await
    }

    async fn with_adapter(
        instance: wgpu::Instance,
        adapter: wgpu::Adapter,
        init: &DeviceInit,
    ) -> Result<Self, RenderError> {
        let info = adapter.get_info();
        let required_features = init.optional_features.intersection(adapter.features());

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("texcube device"),
                required_features,
                required_limits: init.feature_level.required_limits(),
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .map_err(|source| RenderError::RequestDevice {
                adapter: info.name.clone(),
                source,
            })?;

        log::info!(
            "device created on `{}` ({:?}, {:?}), feature level {:?}, debug layer {}",
            info.name,
            info.backend,
            info.device_type,
            init.feature_level,
            if init.debug_layer { "on" } else { "off" }
        );

        Ok(Self {
            instance,
            adapter,
            device,
            queue,
        })
    }

    pub fn instance(&self) -> &wgpu::Instance {
        &self.instance
    }

    pub fn adapter(&self) -> &wgpu::Adapter {
        &self.adapter
    }

    pub fn adapter_info(&self) -> wgpu::AdapterInfo {
        self.adapter.get_info()
    }

    /// Returns a reference to the logical device.
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    /// Returns a reference to the direct queue.
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }
}

fn create_instance(init: &DeviceInit) -> wgpu::Instance {
    let flags = if init.debug_layer {
        wgpu::InstanceFlags::debugging()
    } else {
        wgpu::InstanceFlags::empty()
    };

    wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: init.backends,
        flags: flags.with_env(),
        ..Default::default()
    })
}

async fn request_fallback_adapter(
    instance: &wgpu::Instance,
    level: FeatureLevel,
) -> Option<wgpu::Adapter> {
    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: None,
            force_fallback_adapter: true,
        })
        .await
        .ok()?;

    if AdapterCandidate::from_adapter(&adapter).supports(level) {
        Some(adapter)
    } else {
        log::warn!(
            "fallback adapter `{}` does not support feature level {level:?}",
            adapter.get_info().name
        );
        None
    }
}

fn choice_kind(choice: AdapterChoice) -> &'static str {
    match choice {
        AdapterChoice::Hardware(_) => "hardware",
        AdapterChoice::Software(_) => "software",
    }
}
