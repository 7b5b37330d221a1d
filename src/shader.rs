//! WGSL sources. Shared declarations live in their own fragments and are
//! concatenated in front of each pass's shader before compilation.

use std::borrow::Cow;

pub const COMMON: &str = include_str!("shaders/common.wgsl");
pub const FULLSCREEN: &str = include_str!("shaders/fullscreen.wgsl");
pub const RAYTRACE: &str = include_str!("shaders/raytrace.wgsl");
pub const COPY: &str = include_str!("shaders/copy.wgsl");

pub fn concat(fragments: &[&str]) -> String {
    let mut source = String::with_capacity(fragments.iter().map(|f| f.len() + 1).sum());
    for fragment in fragments {
        source.push_str(fragment);
        if !fragment.ends_with('\n') {
            source.push('\n');
        }
    }
    source
}

pub fn compose(device: &wgpu::Device, label: &str, fragments: &[&str]) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(Cow::Owned(concat(fragments))),
    })
}
