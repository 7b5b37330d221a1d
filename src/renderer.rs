use crate::passes::*;
use crate::scene::{SceneBuffers, SceneTextures};
use crate::wgpu_ctx::WgpuContext;
use crate::wgpu_utils::create_buffer;

pub const MAX_BOUNCES: u32 = 4;

/// Off-screen accumulation target, sized to the surface.
pub struct SceneTarget {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl SceneTarget {
    pub fn new(ctx: &WgpuContext) -> Self {
        let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Scene Target"),
            size: wgpu::Extent3d {
                width: ctx.config.width,
                height: ctx.config.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: HDR_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&Default::default());
        Self { texture, view }
    }
}

pub struct Renderer {
    pub width: u32,
    pub height: u32,

    // Passes
    raytrace_pass: RaytracePass,
    copy_pass: CopyPass,

    // Shared Resources
    pub target: SceneTarget,
    pub uniform_buffer: wgpu::Buffer,
}

impl Renderer {
    pub fn new(ctx: &WgpuContext, buffers: &SceneBuffers, textures: &SceneTextures) -> Self {
        let uniform_buffer = create_buffer(
            &ctx.device,
            "Raytrace Uniform Buffer",
            std::mem::size_of::<RaytraceUniform>() as u64,
            wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        );

        let target = SceneTarget::new(ctx);

        let raytrace_pass = RaytracePass::new(ctx, buffers, textures, &uniform_buffer, MAX_BOUNCES);
        let copy_pass = CopyPass::new(ctx, &target.view);

        Self {
            width: ctx.config.width,
            height: ctx.config.height,
            raytrace_pass,
            copy_pass,
            target,
            uniform_buffer,
        }
    }

    /// Recreate the accumulation target at the new surface size. The old
    /// contents are meaningless afterwards, so the caller must restart
    /// accumulation.
    pub fn resize(&mut self, ctx: &WgpuContext) {
        self.width = ctx.config.width;
        self.height = ctx.config.height;
        self.target = SceneTarget::new(ctx);
        self.copy_pass.set_source(ctx, &self.target.view);
    }

    pub fn update_uniform(&self, ctx: &WgpuContext, uniform: &RaytraceUniform) {
        ctx.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(uniform));
    }

    pub fn render(&mut self, ctx: &WgpuContext, view: &wgpu::TextureView) {
        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        // 1. Ray Tracing Pass (HDRターゲットに累積)
        self.raytrace_pass.execute(&mut encoder, &self.target.view);

        // 2. Copy Pass
        self.copy_pass.execute(&mut encoder, view);

        ctx.queue.submit(std::iter::once(encoder.finish()));
    }
}
