//! Band textures - painter output uploaded into Bevy `Image` assets.
//!
//! Each active depth band owns one `Rgba8UnormSrgb` image plus its placement.
//! The host renderer reads `BandLayers` to position sprites or quads.

use bevy::prelude::*;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};
use std::collections::BTreeMap;

use crate::painter::{BandSurface, BandSurfaceSink, SurfaceError};

/// One uploaded band.
#[derive(Clone, Debug, PartialEq)]
pub struct BandLayer {
    pub image: Handle<Image>,
    /// Board-local pixel position of the image's top-left corner.
    pub origin: IVec2,
    pub size: UVec2,
    pub z: f32,
}

/// Active band images keyed by depth.
#[derive(Resource, Default, Debug)]
pub struct BandLayers {
    pub layers: BTreeMap<i32, BandLayer>,
}

impl BandLayers {
    pub fn get(&self, depth: i32) -> Option<&BandLayer> { self.layers.get(&depth) }
    pub fn len(&self) -> usize { self.layers.len() }
    pub fn is_empty(&self) -> bool { self.layers.is_empty() }
}

fn band_image(width: u32, height: u32, data: Vec<u8>) -> Image {
    Image::new(
        Extent3d { width, height, depth_or_array_layers: 1 },
        TextureDimension::D2,
        data,
        TextureFormat::Rgba8UnormSrgb,
        Default::default(),
    )
}

/// Sink writing into `Assets<Image>`. Same-sized bands are rewritten in place,
/// so handles stay stable across repaints.
pub struct ImageBandSink<'a> {
    pub images: &'a mut Assets<Image>,
    pub layers: &'a mut BandLayers,
}

impl BandSurfaceSink for ImageBandSink<'_> {
    fn upload(&mut self, surface: BandSurface<'_>) -> Result<(), SurfaceError> {
        surface.validate()?;
        let size = UVec2::new(surface.width, surface.height);

        if let Some(layer) = self.layers.layers.get_mut(&surface.depth) {
            if layer.size == size {
                if let Some(mut image) = self.images.get_mut(&layer.image) {
                    image.data = Some(surface.pixels.to_vec());
                    layer.origin = surface.origin;
                    layer.z = surface.z;
                    return Ok(());
                }
            }
            self.images.remove(&layer.image);
        }

        let handle = self.images.add(band_image(surface.width, surface.height, surface.pixels.to_vec()));
        self.layers.layers.insert(surface.depth, BandLayer { image: handle, origin: surface.origin, size, z: surface.z });
        Ok(())
    }

    fn destroy(&mut self, depth: i32) {
        if let Some(layer) = self.layers.layers.remove(&depth) {
            self.images.remove(&layer.image);
        }
    }
}
