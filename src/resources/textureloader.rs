//! GPU frame loader.
//!
//! Decodes frame files with the `image` crate and uploads them as raylib
//! textures during startup, so the render loop never touches the disk.
//!
//! Textures must be created on the thread owning the raylib context, which is
//! why the resulting [`MoodLibrary<Texture2D>`](crate::resources::moodlibrary::MoodLibrary)
//! and the player holding it are stored as non-send resources.

use std::path::Path;

use raylib::ffi::{self, PixelFormat, TextureFilter};
use raylib::prelude::*;

use crate::resources::moodlibrary::{FrameLoader, decode_rgba};

/// Loads frames straight into GPU textures.
pub struct TextureLoader<'a> {
    rl: &'a mut RaylibHandle,
    thread: &'a RaylibThread,
}

impl<'a> TextureLoader<'a> {
    pub fn new(rl: &'a mut RaylibHandle, thread: &'a RaylibThread) -> Self {
        Self { rl, thread }
    }
}

impl FrameLoader for TextureLoader<'_> {
    type Frame = Texture2D;

    fn load_frame(&mut self, path: &Path) -> Result<Texture2D, String> {
        let rgba = decode_rgba(path)?;
        let (width, height) = rgba.dimensions();
        let pixels = rgba.as_raw();

        // raylib frees image data with its own allocator, so the pixels are
        // copied into a MemAlloc'd buffer before wrapping.
        let image = unsafe {
            let data = ffi::MemAlloc(pixels.len() as u32);
            if data.is_null() {
                return Err(format!("out of memory for {}x{} frame", width, height));
            }
            std::ptr::copy_nonoverlapping(pixels.as_ptr(), data as *mut u8, pixels.len());
            Image::from_raw(ffi::Image {
                data,
                width: width as i32,
                height: height as i32,
                mipmaps: 1,
                format: PixelFormat::PIXELFORMAT_UNCOMPRESSED_R8G8B8A8 as i32,
            })
        };

        let texture = self
            .rl
            .load_texture_from_image(self.thread, &image)
            .map_err(|e| format!("Failed to upload texture: {}", e))?;

        // Smooth scaling to the output surface.
        unsafe {
            ffi::SetTextureFilter(*texture, TextureFilter::TEXTURE_FILTER_BILINEAR as i32);
        }
        Ok(texture)
    }
}
