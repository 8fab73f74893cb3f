// render.rs - Encode simulation state for drawing
//
// The simulations never touch a rendering API. They describe each entity
// as a `Sprite` and hand it to a `Surface`. Two surfaces ship here:
//
//   InstanceEncoder  flat f32 buffer read by JS through output_ptr/len
//   RasterSurface    RGBA image for native snapshots (not on wasm)
//
// Instance layout (INSTANCE_STRIDE floats per sprite):
//   0 kind   (0 = pollinator, 1 = firefly warm, 2 = firefly pale, 3 = asset)
//   1 x      2 y      (center, px)
//   3 rotation (degrees)
//   4 scale_x 5 scale_y (scale_x < 0 means mirrored)
//   6 opacity
//   7 size (px) for assets, 0 otherwise
//   8 asset id, -1 when not an asset

use crate::assets::AssetId;

pub const INSTANCE_STRIDE: usize = 9;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SpriteKind {
    Pollinator,
    Firefly { warm: bool },
    Asset { id: AssetId, size: f32 },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sprite {
    pub kind: SpriteKind,
    pub x: f32,
    pub y: f32,
    pub rotation: f32,
    pub scale_x: f32,
    pub scale_y: f32,
    pub opacity: f32,
}

/// Anything a layer can be drawn into.
pub trait Surface {
    /// Blank the whole surface
    fn clear(&mut self);

    /// Whether the bitmap behind `asset` can be drawn yet
    fn asset_ready(&self, _asset: AssetId) -> bool {
        true
    }

    fn draw(&mut self, sprite: &Sprite);
}

pub struct InstanceEncoder {
    out: Vec<f32>,
    // Assets whose bitmap is not decoded on the host side yet
    pending: Vec<AssetId>,
}

impl InstanceEncoder {
    pub fn new() -> Self {
        Self { out: Vec::new(), pending: Vec::new() }
    }

    pub fn set_asset_ready(&mut self, asset: AssetId, ready: bool) {
        self.pending.retain(|&a| a != asset);
        if !ready {
            self.pending.push(asset);
        }
    }

    pub fn ptr(&self) -> *const f32 {
        self.out.as_ptr()
    }

    pub fn len(&self) -> usize {
        self.out.len()
    }

    pub fn is_empty(&self) -> bool {
        self.out.is_empty()
    }

    pub fn count(&self) -> usize {
        self.out.len() / INSTANCE_STRIDE
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.out
    }
}

impl Default for InstanceEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Surface for InstanceEncoder {
    fn clear(&mut self) {
        self.out.clear();
    }

    fn asset_ready(&self, asset: AssetId) -> bool {
        !self.pending.contains(&asset)
    }

    fn draw(&mut self, s: &Sprite) {
        let (kind, size, asset) = match s.kind {
            SpriteKind::Pollinator => (0.0, 0.0, -1.0),
            SpriteKind::Firefly { warm: true } => (1.0, 0.0, -1.0),
            SpriteKind::Firefly { warm: false } => (2.0, 0.0, -1.0),
            SpriteKind::Asset { id, size } => (3.0, size, id.0 as f32),
        };
        self.out.extend_from_slice(&[
            kind, s.x, s.y, s.rotation, s.scale_x, s.scale_y, s.opacity, size, asset,
        ]);
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use raster::RasterSurface;

#[cfg(not(target_arch = "wasm32"))]
mod raster {
    use image::{Rgba, RgbaImage};

    use super::{Sprite, SpriteKind, Surface};

    const POLLINATOR: [u8; 3] = [0xf5, 0xc5, 0x18];
    const WARM_GLOW: [u8; 3] = [0xff, 0xaa, 0x00];
    const PALE_GLOW: [u8; 3] = [0xff, 0xff, 0x00];
    const PETAL: [u8; 3] = [0xf4, 0xa7, 0xc0];

    /// Flattens sprites into an RGBA image, each as a soft disc.
    /// Good enough for snapshot thumbnails and for eyeballing a layer.
    pub struct RasterSurface {
        image: RgbaImage,
    }

    impl RasterSurface {
        pub fn new(w: u32, h: u32) -> Self {
            Self { image: RgbaImage::new(w.max(1), h.max(1)) }
        }

        pub fn image(&self) -> &RgbaImage {
            &self.image
        }

        pub fn into_image(self) -> RgbaImage {
            self.image
        }

        pub fn save(&self, path: &std::path::Path) -> image::ImageResult<()> {
            self.image.save(path)
        }

        fn disc(&mut self, cx: f32, cy: f32, radius: f32, rgb: [u8; 3], opacity: f32) {
            let (w, h) = (self.image.width() as i32, self.image.height() as i32);
            let r = radius.max(0.5);
            let x0 = ((cx - r).floor() as i32).max(0);
            let x1 = ((cx + r).ceil() as i32).min(w - 1);
            let y0 = ((cy - r).floor() as i32).max(0);
            let y1 = ((cy + r).ceil() as i32).min(h - 1);

            for y in y0..=y1 {
                for x in x0..=x1 {
                    let dx = x as f32 + 0.5 - cx;
                    let dy = y as f32 + 0.5 - cy;
                    let d = (dx * dx + dy * dy).sqrt();
                    if d > r {
                        continue;
                    }
                    let a = opacity.clamp(0.0, 1.0) * (1.0 - d / r).sqrt();
                    blend(self.image.get_pixel_mut(x as u32, y as u32), rgb, a);
                }
            }
        }
    }

    impl Surface for RasterSurface {
        fn clear(&mut self) {
            for p in self.image.pixels_mut() {
                *p = Rgba([0, 0, 0, 0]);
            }
        }

        fn draw(&mut self, s: &Sprite) {
            let (radius, rgb) = match s.kind {
                SpriteKind::Pollinator => (12.0 * s.scale_y.abs(), POLLINATOR),
                SpriteKind::Firefly { warm } => (3.0, if warm { WARM_GLOW } else { PALE_GLOW }),
                SpriteKind::Asset { size, .. } => (size * 0.5, PETAL),
            };
            if s.x.is_finite() && s.y.is_finite() {
                self.disc(s.x, s.y, radius, rgb, s.opacity);
            }
        }
    }

    // Source-over compositing onto a straight-alpha pixel
    fn blend(dst: &mut Rgba<u8>, rgb: [u8; 3], a: f32) {
        let da = dst[3] as f32 / 255.0;
        let out_a = a + da * (1.0 - a);
        if out_a <= 0.0 {
            return;
        }
        for c in 0..3 {
            let src = rgb[c] as f32 / 255.0;
            let cur = dst[c] as f32 / 255.0;
            let v = (src * a + cur * da * (1.0 - a)) / out_a;
            dst[c] = (v * 255.0).round() as u8;
        }
        dst[3] = (out_a * 255.0).round() as u8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sprite(kind: SpriteKind) -> Sprite {
        Sprite { kind, x: 10.0, y: 20.0, rotation: 0.0, scale_x: -1.0, scale_y: 1.0, opacity: 0.5 }
    }

    #[test]
    fn encoder_packs_stride() {
        let mut enc = InstanceEncoder::new();
        enc.draw(&sprite(SpriteKind::Pollinator));
        enc.draw(&sprite(SpriteKind::Asset { id: AssetId(4), size: 32.0 }));
        assert_eq!(enc.count(), 2);
        assert_eq!(enc.len(), 2 * INSTANCE_STRIDE);
        let second = &enc.as_slice()[INSTANCE_STRIDE..];
        assert_eq!(second[0], 3.0);
        assert_eq!(second[7], 32.0);
        assert_eq!(second[8], 4.0);
        enc.clear();
        assert!(enc.is_empty());
    }

    #[test]
    fn asset_readiness_tracked() {
        let mut enc = InstanceEncoder::new();
        assert!(enc.asset_ready(AssetId(1)));
        enc.set_asset_ready(AssetId(1), false);
        assert!(!enc.asset_ready(AssetId(1)));
        enc.set_asset_ready(AssetId(1), true);
        assert!(enc.asset_ready(AssetId(1)));
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn raster_marks_pixels() {
        let mut surface = RasterSurface::new(40, 40);
        surface.draw(&sprite(SpriteKind::Firefly { warm: true }));
        assert!(surface.image().get_pixel(10, 20)[3] > 0);
        assert_eq!(surface.image().get_pixel(35, 35)[3], 0);
        surface.clear();
        assert_eq!(surface.image().get_pixel(10, 20)[3], 0);
    }
}
