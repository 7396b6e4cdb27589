use std::path::{Path, PathBuf};

use crate::error::RenderError;

pub const VERTEX_ENTRY: &str = "vs_main";
pub const FRAGMENT_ENTRY: &str = "fs_main";

/// WGSL source read from disk.
#[derive(Debug, Clone)]
pub struct ShaderSource {
    pub path: PathBuf,
    pub text: String,
}

impl ShaderSource {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RenderError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| RenderError::AssetIo {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            text,
        })
    }

    pub fn from_text(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
        }
    }

    /// Parses and validates the source, and checks that both entry points
    /// exist with the right stages.
    ///
    /// wgpu would otherwise report shader errors through its uncaptured-error
    /// handler, which aborts instead of returning an error.
    pub fn validate(&self) -> Result<naga::Module, RenderError> {
        let module = naga::front::wgsl::parse_str(&self.text).map_err(|err| self.compile_error(
            err.emit_to_string(&self.text),
        ))?;

        let mut validator = naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::empty(),
        );
        validator
            .validate(&module)
            .map_err(|err| self.compile_error(err.emit_to_string(&self.text)))?;

        for (stage, name) in [
            (naga::ShaderStage::Vertex, VERTEX_ENTRY),
            (naga::ShaderStage::Fragment, FRAGMENT_ENTRY),
        ] {
            let found = module
                .entry_points
                .iter()
                .any(|ep| ep.name == name && ep.stage == stage);
            if !found {
                return Err(self.compile_error(format!("missing {stage:?} entry point `{name}`")));
            }
        }

        Ok(module)
    }

    /// Validates and compiles the source into a shader module.
    pub fn compile(&self, device: &wgpu::Device) -> Result<wgpu::ShaderModule, RenderError> {
        self.validate()?;

        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("texcube shaders"),
            source: wgpu::ShaderSource::Wgsl(self.text.as_str().into()),
        });
        log::debug!("compiled shader `{}`", self.path.display());
        Ok(module)
    }

    fn compile_error(&self, message: String) -> RenderError {
        RenderError::ShaderCompile {
            path: self.path.clone(),
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHADERS: &str = include_str!("../../assets/shaders.wgsl");

    #[test]
    fn bundled_shaders_validate() {
        let source = ShaderSource::from_text("shaders.wgsl", SHADERS);
        let module = source.validate().unwrap();
        assert_eq!(module.entry_points.len(), 2);
    }

    #[test]
    fn syntax_errors_are_compile_errors() {
        let source = ShaderSource::from_text("broken.wgsl", "fn vs_main( {");
        let err = source.validate().unwrap_err();
        assert!(matches!(err, RenderError::ShaderCompile { .. }));
    }

    #[test]
    fn missing_fragment_entry_is_reported() {
        let text = "@vertex fn vs_main() -> @builtin(position) vec4<f32> { return vec4<f32>(0.0); }";
        let err = ShaderSource::from_text("vs_only.wgsl", text).validate().unwrap_err();
        assert!(err.to_string().contains("fs_main"));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        assert!(matches!(
            ShaderSource::load("/no/such/shaders.wgsl").unwrap_err(),
            RenderError::AssetIo { .. }
        ));
    }
}
