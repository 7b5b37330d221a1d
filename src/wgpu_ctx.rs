use anyhow::{Context, Result};
use std::sync::Arc;

pub struct WgpuContext {
    pub _instance: wgpu::Instance,
    pub _adapter: wgpu::Adapter,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub surface: wgpu::Surface<'static>,
    pub config: wgpu::SurfaceConfiguration,
}

impl WgpuContext {
    pub async fn new(window: Arc<winit::window::Window>) -> Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::from_env().unwrap_or(wgpu::Backends::PRIMARY),
            flags: wgpu::InstanceFlags::from_env_or_default(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("creating window surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                ..Default::default()
            })
            .await
            .context("no graphics adapter compatible with the window")?;

        // アダプターの情報を取得
        let info = adapter.get_info();
        log::info!("adapter: {} ({:?})", info.name, info.backend);
        log::info!("driver: {}", info.driver_info);

        // フラグメントシェーダーからストレージバッファを読むので下限を確認
        let limits = adapter.limits();
        if limits.max_storage_buffers_per_shader_stage < 3 {
            anyhow::bail!(
                "adapter supports {} storage buffers per stage, 3 are required",
                limits.max_storage_buffers_per_shader_stage
            );
        }

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Raytracer Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                ..Default::default()
            })
            .await
            .context("requesting device")?;

        let size = window.inner_size();
        let mut config = surface
            .get_default_config(&adapter, size.width.max(1), size.height.max(1))
            .context("surface is not supported by the adapter")?;
        // sRGB変換はコピーパスで行う
        config.format = config.format.remove_srgb_suffix();
        surface.configure(&device, &config);
        log::debug!(
            "surface {}x{} {:?}",
            config.width,
            config.height,
            config.format
        );

        Ok(Self {
            _instance: instance,
            _adapter: adapter,
            device,
            queue,
            surface,
            config,
        })
    }

    pub fn aspect(&self) -> f32 {
        self.config.width as f32 / self.config.height as f32
    }

    /// Returns false for a zero-sized (minimized) window.
    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) -> bool {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            true
        } else {
            false
        }
    }

    pub fn reconfigure(&self) {
        self.surface.configure(&self.device, &self.config);
    }
}
