use crate::error::{RenderError, Result};
use crate::renderer::shaders::PassKind;

/// What was being created when a validation error was captured.
#[derive(Copy, Clone, Debug)]
pub(crate) enum Stage {
    Shader,
    Pipeline,
}

/// Run `build` inside a validation error scope and turn a captured error into
/// a [`RenderError`] tagged with the pass name.
///
/// wgpu reports shader and pipeline validation failures asynchronously through
/// the device's error handler; the scope routes them back to the caller.
pub(crate) fn scoped<T>(
    device: &wgpu::Device,
    pass: PassKind,
    stage: Stage,
    build: impl FnOnce() -> T,
) -> Result<T> {
    let scope = device.push_error_scope(wgpu::ErrorFilter::Validation);
    let value = build();
    match pollster::block_on(scope.pop()) {
        None => Ok(value),
        Some(err) => {
            let message = err.to_string();
            log::error!("{} {:?} failed validation: {}", pass.label(), stage, message);
            Err(match stage {
                Stage::Shader => RenderError::ShaderCompilation { pass: pass.label(), message },
                Stage::Pipeline => RenderError::PipelineCreation { pass: pass.label(), message },
            })
        }
    }
}

/// Compile the WGSL module for `pass`.
pub(crate) fn shader_module(device: &wgpu::Device, pass: PassKind) -> Result<wgpu::ShaderModule> {
    let source = pass.wgsl();
    scoped(device, pass, Stage::Shader, || {
        device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(pass.label()),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        })
    })
}
