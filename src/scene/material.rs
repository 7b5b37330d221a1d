// GPUに送るマテリアルデータ (48バイト)
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct RaytracingMaterial {
    pub material_id: u32,
    pub roughness: f32,
    pub metallic: f32,
    pub ior: f32,
    pub albedo: [f32; 4],
    pub emissive: [f32; 4],
}

impl RaytracingMaterial {
    /// Dielectric, fully rough, no refraction (`ior == 0` disables it in the shader).
    pub fn new(albedo: [f32; 4]) -> Self {
        Self {
            material_id: 0,
            roughness: 1.0,
            metallic: 0.0,
            ior: 0.0,
            albedo,
            emissive: [0.0; 4],
        }
    }

    pub fn roughness(mut self, roughness: f32) -> Self {
        self.roughness = roughness;
        self
    }

    pub fn metallic(mut self, metallic: f32) -> Self {
        self.metallic = metallic;
        self
    }

    pub fn ior(mut self, ior: f32) -> Self {
        self.ior = ior;
        self
    }

    pub fn emissive(mut self, emissive: [f32; 4]) -> Self {
        self.emissive = emissive;
        self
    }
}

impl Default for RaytracingMaterial {
    fn default() -> Self {
        Self::new([1.0; 4])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gpu_layout_is_48_bytes() {
        assert_eq!(std::mem::size_of::<RaytracingMaterial>(), 48);
        assert_eq!(std::mem::align_of::<RaytracingMaterial>(), 4);
        // albedo must start on a vec4 boundary for std430
        assert_eq!(std::mem::offset_of!(RaytracingMaterial, albedo), 16);
    }

    #[test]
    fn builder_sets_fields() {
        let mat = RaytracingMaterial::new([1.0, 0.0, 0.0, 0.0])
            .roughness(0.5)
            .metallic(0.25)
            .ior(1.35)
            .emissive([2.0; 4]);
        assert_eq!(mat.roughness, 0.5);
        assert_eq!(mat.metallic, 0.25);
        assert_eq!(mat.ior, 1.35);
        assert_eq!(mat.emissive, [2.0; 4]);
        assert_eq!(mat.albedo, [1.0, 0.0, 0.0, 0.0]);
    }
}
