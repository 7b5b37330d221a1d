use crate::accumulation::Accumulation;
use crate::camera::CameraController;
use crate::config::AppConfig;
use crate::passes::RaytraceUniform;
use crate::renderer::Renderer;
use crate::scene::texture::{checker_image, load_or, white_image};
use crate::scene::{AnalyticScene, SceneBuffers, SceneTextures, scenes};
use crate::wgpu_ctx::WgpuContext;
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Instant;
use winit::event::WindowEvent;
use winit::window::Window;

// --- State 構造体定義 ---
pub struct State {
    pub window: Arc<Window>,
    pub ctx: WgpuContext,
    pub camera: CameraController,
    pub accumulation: Accumulation,
    pub analytic: AnalyticScene,

    // GPUリソース (バインドグループから参照されるので保持しておく)
    _scene_buffers: SceneBuffers,
    _scene_textures: SceneTextures,
    renderer: Renderer,

    last_frame: Instant,
}

impl State {
    pub async fn new(window: Arc<Window>, config: &AppConfig) -> Result<Self> {
        // 1. デバイス初期化
        let ctx = WgpuContext::new(window.clone()).await?;

        // 2. シーン構築 (CPU側で三角形・変換・マテリアルを詰める)
        let packed = scenes::build_scene(config)?;
        let scene_buffers =
            SceneBuffers::upload(&ctx.device, &packed).context("scene does not fit on the device")?;

        // 3. テクスチャ
        let textures = &config.textures;
        let wall = load_or(textures.wall.as_deref(), white_image).context("wall texture")?;
        let floor = load_or(textures.floor.as_deref(), || checker_image(8))
            .context("floor texture")?;
        let picture = load_or(textures.picture.as_deref(), || checker_image(2))
            .context("picture texture")?;
        let scene_textures = SceneTextures::upload(&ctx.device, &ctx.queue, &wall, &floor, &picture)
            .context("textures do not fit on the device")?;

        // 4. パイプライン
        let renderer = Renderer::new(&ctx, &scene_buffers, &scene_textures);

        log::info!(
            "renderer ready: {}x{}, {} triangles",
            renderer.width,
            renderer.height,
            scene_buffers.triangle_count
        );

        Ok(Self {
            window,
            ctx,
            camera: CameraController::new(&config.camera),
            accumulation: Accumulation::new(),
            analytic: config.analytic_scene(),
            _scene_buffers: scene_buffers,
            _scene_textures: scene_textures,
            renderer,
            last_frame: Instant::now(),
        })
    }

    pub fn input(&mut self, event: &WindowEvent) -> bool {
        self.camera.process_events(event)
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if self.ctx.resize(new_size) {
            self.renderer.resize(&self.ctx);
            self.accumulation.invalidate();
            log::debug!("resized to {}x{}", new_size.width, new_size.height);
        }
    }

    /// Step the camera, restart accumulation if the view changed, and upload
    /// this frame's uniform.
    pub fn update(&mut self) {
        let now = Instant::now();
        let dt = now.duration_since(self.last_frame);
        self.last_frame = now;

        let moved = self.camera.update_camera(dt);
        let frame_count = self
            .accumulation
            .advance(moved || self.camera.is_engaged());

        let uniform = RaytraceUniform::new(
            &self.camera.matrices(self.ctx.aspect()),
            &self.analytic,
            frame_count,
            self.renderer.width,
            self.renderer.height,
        );
        self.renderer.update_uniform(&self.ctx, &uniform);
    }

    pub fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let output = match self.ctx.surface.get_current_texture() {
            Ok(output) => output,
            Err(e) => {
                // このフレームの分が描かれないので、平均が崩れないよう最初からやり直す
                self.accumulation.invalidate();
                return Err(e);
            }
        };
        let view = output.texture.create_view(&Default::default());

        self.renderer.render(&self.ctx, &view);

        self.window.pre_present_notify();
        output.present();
        Ok(())
    }

    pub fn reconfigure(&mut self) {
        self.ctx.reconfigure();
        self.accumulation.invalidate();
    }
}
