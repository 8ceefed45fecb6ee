//! Output surface size resource.
//!
//! Tracks the actual window dimensions in pixels. Updated every tick so a
//! resized or re-fullscreened window is filled correctly, and used to compute
//! where a frame lands on the surface.

use bevy_ecs::prelude::Resource;
use clap::ValueEnum;
use image::RgbaImage;
use raylib::prelude::*;

/// Anything with pixel dimensions that can be drawn as a frame.
pub trait FrameSize {
    /// Width and height in pixels.
    fn frame_size(&self) -> (u32, u32);
}

impl FrameSize for RgbaImage {
    fn frame_size(&self) -> (u32, u32) {
        self.dimensions()
    }
}

impl FrameSize for Texture2D {
    fn frame_size(&self) -> (u32, u32) {
        (self.width.max(0) as u32, self.height.max(0) as u32)
    }
}

/// How a frame is scaled onto the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ScaleMode {
    /// Fill the whole surface, ignoring aspect ratio.
    #[default]
    Stretch,
    /// Keep aspect ratio, centering with black bars.
    Fit,
}

/// Current surface size in pixels.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceSize {
    /// Width in pixels.
    pub w: i32,
    /// Height in pixels.
    pub h: i32,
}

impl SurfaceSize {
    /// The whole surface.
    pub fn full_rect(&self) -> Rectangle {
        Rectangle {
            x: 0.0,
            y: 0.0,
            width: self.w as f32,
            height: self.h as f32,
        }
    }

    /// Destination rectangle for a `frame_w` x `frame_h` frame.
    pub fn dest_rect(&self, frame_w: u32, frame_h: u32, mode: ScaleMode) -> Rectangle {
        match mode {
            ScaleMode::Stretch => self.full_rect(),
            ScaleMode::Fit if frame_w == 0 || frame_h == 0 => self.full_rect(),
            ScaleMode::Fit => self.calculate_letterbox(frame_w, frame_h),
        }
    }

    /// Largest rectangle with the frame's aspect ratio that fits the surface,
    /// centered on it.
    ///
    /// Face frames are usually authored for one display; on a wider surface
    /// the spare width becomes bars left and right, on a taller one the bars
    /// go above and below. The render pass clears to black, so the bars show
    /// as black. Callers must pass non-zero frame dimensions.
    pub fn calculate_letterbox(&self, frame_w: u32, frame_h: u32) -> Rectangle {
        let frame_w = frame_w as f32;
        let frame_h = frame_h as f32;
        let surface_w = self.w as f32;
        let surface_h = self.h as f32;

        let frame_aspect = frame_w / frame_h;
        let surface_aspect = surface_w / surface_h;

        if surface_aspect > frame_aspect {
            // Wider surface: bars on the sides
            let scale = surface_h / frame_h;
            let scaled_w = frame_w * scale;
            Rectangle {
                x: (surface_w - scaled_w) / 2.0,
                y: 0.0,
                width: scaled_w,
                height: surface_h,
            }
        } else {
            // Taller surface: bars above and below
            let scale = surface_w / frame_w;
            let scaled_h = frame_h * scale;
            Rectangle {
                x: 0.0,
                y: (surface_h - scaled_h) / 2.0,
                width: surface_w,
                height: scaled_h,
            }
        }
    }
}
