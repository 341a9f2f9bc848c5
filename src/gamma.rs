// Gamma-correct coverage blending for anti-aliased strokes, via table lookups.
// Visual: stroke edges fade smoothly into the background without dark halos.

pub struct GammaLut {
    // sRGB(0..255) -> linear (0..1) as f32
    srgb_to_linear: [f32; 256],
    // linear(0..1) -> sRGB(0..255) via 4096-step quantization
    linear_to_srgb: [u8; 4096],
}

impl GammaLut {
    /// Build both tables once per surface.
    pub fn new() -> Self {
        let mut s2l = [0.0f32; 256];
        for (v, slot) in s2l.iter_mut().enumerate() {
            let c = v as f32 / 255.0;
            *slot = if c <= 0.04045 { c / 12.92 } else { ((c + 0.055) / 1.055).powf(2.4) };
        }

        let mut l2s = [0u8; 4096];
        for (i, slot) in l2s.iter_mut().enumerate() {
            let l = (i as f32) / 4095.0;
            let s = if l <= 0.003_130_8 { 12.92 * l } else { 1.055 * l.powf(1.0 / 2.4) - 0.055 };
            *slot = (s * 255.0).round().clamp(0.0, 255.0) as u8;
        }

        Self { srgb_to_linear: s2l, linear_to_srgb: l2s }
    }

    #[inline]
    fn to_linear(&self, v: u8) -> f32 {
        self.srgb_to_linear[v as usize]
    }

    #[inline]
    fn to_srgb(&self, l: f32) -> u8 {
        let idx = (l.clamp(0.0, 1.0) * 4095.0).round() as usize;
        self.linear_to_srgb[idx]
    }

    /// Composite `src` (0xAARRGGBB) over `dst` with an extra coverage factor.
    /// Colour channels mix in linear light; alpha uses plain source-over.
    pub fn blend_over(&self, dst: u32, src: u32, coverage: f32) -> u32 {
        let a = ((src >> 24) & 0xFF) as f32 / 255.0 * coverage.clamp(0.0, 1.0);
        if a <= 0.0 {
            return dst;
        }
        let da = ((dst >> 24) & 0xFF) as f32 / 255.0;
        let out_a = a + da * (1.0 - a);

        let mix = |shift: u32| -> u32 {
            let s = self.to_linear(((src >> shift) & 0xFF) as u8);
            let d = self.to_linear(((dst >> shift) & 0xFF) as u8);
            // Transparent destination contributes nothing, so weight it by its own alpha.
            let l = (s * a + d * da * (1.0 - a)) / out_a;
            self.to_srgb(l) as u32
        };

        let alpha = (out_a * 255.0).round().clamp(0.0, 255.0) as u32;
        (alpha << 24) | (mix(16) << 16) | (mix(8) << 8) | mix(0)
    }
}

impl Default for GammaLut {
    fn default() -> Self {
        Self::new()
    }
}
