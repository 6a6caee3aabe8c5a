use std::fs;
use std::path::{Path, PathBuf};

use crate::error::CubeError;

/// Name of the MVP uniform expected in the vertex shader.
pub const MVP_UNIFORM: &str = "u_MVP";

/// Compile logs longer than this are truncated.
pub const MAX_LOG_LEN: usize = 512;

/// What to do when a shader fails to compile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileFailure {
    /// Return the error to the caller, ending the program.
    Fatal,
    /// Log the error and carry on without the module.
    LogAndContinue,
}

/// Which pipeline stage a shader file feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    pub fn entry_point(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vs_main",
            ShaderStage::Fragment => "fs_main",
        }
    }
}

/// A WGSL source read from disk.
#[derive(Debug, Clone)]
pub struct ShaderFile {
    path: PathBuf,
    source: String,
}

impl ShaderFile {
    /// Reads the whole file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CubeError> {
        let path = path.as_ref().to_path_buf();
        let source = fs::read_to_string(&path).map_err(|source| CubeError::ShaderRead {
            path: path.clone(),
            source,
        })?;

        Ok(Self { path, source })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether the source declares a uniform called `name`.
    pub fn declares_uniform(&self, name: &str) -> bool {
        declares_uniform(&self.source, name)
    }
}

/// A compiled shader module and its entry point.
#[derive(Debug)]
pub struct CompiledShader {
    pub module: wgpu::ShaderModule,
    pub entry_point: &'static str,
}

/// Compiles `file` for `stage`, capturing validation errors instead of
/// letting them reach the device's uncaptured-error handler.
///
/// Returns `Ok(None)` when compilation failed under
/// [`CompileFailure::LogAndContinue`].
pub fn compile(
    device: &wgpu::Device,
    file: &ShaderFile,
    stage: ShaderStage,
    on_failure: CompileFailure,
) -> Result<Option<CompiledShader>, CubeError> {
    let label = format!("{:?} Shader ({})", stage, file.path.display());

    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(&label),
        source: wgpu::ShaderSource::Wgsl(file.source.as_str().into()),
    });
    let error = pollster::block_on(device.pop_error_scope());

    let Some(error) = error else {
        log::debug!("compiled {}", file.path.display());
        return Ok(Some(CompiledShader {
            module,
            entry_point: stage.entry_point(),
        }));
    };

    let message = bounded_log(&error.to_string());
    match on_failure {
        CompileFailure::Fatal => Err(CubeError::ShaderCompile {
            path: file.path.clone(),
            log: message,
        }),
        CompileFailure::LogAndContinue => {
            log::error!("shader compile failed ({}):\n{}", file.path.display(), message);
            Ok(None)
        }
    }
}

/// Logs a warning when the vertex source has no [`MVP_UNIFORM`].
///
/// Returns whether the uniform was found. A missing uniform is not an error;
/// the cube is drawn with whatever the shader computes.
pub fn check_mvp_uniform(file: &ShaderFile) -> bool {
    let found = file.declares_uniform(MVP_UNIFORM);
    if !found {
        log::warn!("uniform '{}' not found in {}", MVP_UNIFORM, file.path.display());
    }
    found
}

/// Truncates a compiler log to [`MAX_LOG_LEN`] bytes on a char boundary.
pub fn bounded_log(log: &str) -> String {
    if log.len() <= MAX_LOG_LEN {
        return log.to_string();
    }
    let mut end = MAX_LOG_LEN;
    while !log.is_char_boundary(end) {
        end -= 1;
    }
    log[..end].to_string()
}

/// Looks for `var<uniform> name` in WGSL source, ignoring line comments.
pub fn declares_uniform(source: &str, name: &str) -> bool {
    source
        .lines()
        .map(|line| line.split("//").next().unwrap_or(""))
        .filter_map(|line| line.split_once("var<uniform>"))
        .any(|(_, rest)| {
            let ident = rest
                .trim_start()
                .split(|c: char| !(c.is_alphanumeric() || c == '_'))
                .next()
                .unwrap_or("");
            ident == name
        })
}
