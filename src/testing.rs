// MIT/Apache2 License

//! Test doubles shared between unit tests.

use crate::{Color, Error, Image, RenderContext, SharedContext};
use lyon_geom::Angle;
use parking_lot::Mutex;
use std::{num::NonZeroUsize, sync::Arc};

/// One primitive call received by a `RecordingContext`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    SetFillColor(Color),
    SetStrokeColor(Color),
    FillRect(f32, f32, f32, f32),
    StrokeRect(f32, f32, f32, f32),
    BeginPath,
    Arc(f32, f32, f32, f32, f32),
    Fill,
    Stroke,
    DrawImage(Image, f32, f32, f32, f32),
    Resize(u32, u32),
}

/// A context that remembers every call made to it.
#[derive(Debug, Default)]
pub(crate) struct RecordingContext {
    pub(crate) calls: Vec<Call>,
    pub(crate) reject_images: bool,
}

impl RecordingContext {
    pub(crate) fn images(&self) -> Vec<Call> {
        self.calls
            .iter()
            .filter(|call| matches!(call, Call::DrawImage(..)))
            .cloned()
            .collect()
    }
}

impl RenderContext for RecordingContext {
    fn set_fill_color(&mut self, color: Color) -> crate::Result {
        self.calls.push(Call::SetFillColor(color));
        Ok(())
    }
    fn set_stroke_color(&mut self, color: Color) -> crate::Result {
        self.calls.push(Call::SetStrokeColor(color));
        Ok(())
    }
    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32) -> crate::Result {
        self.calls.push(Call::FillRect(x, y, width, height));
        Ok(())
    }
    fn stroke_rect(&mut self, x: f32, y: f32, width: f32, height: f32) -> crate::Result {
        self.calls.push(Call::StrokeRect(x, y, width, height));
        Ok(())
    }
    fn begin_path(&mut self) -> crate::Result {
        self.calls.push(Call::BeginPath);
        Ok(())
    }
    fn arc(
        &mut self,
        x: f32,
        y: f32,
        radius: f32,
        start: Angle<f32>,
        end: Angle<f32>,
    ) -> crate::Result {
        self.calls
            .push(Call::Arc(x, y, radius, start.radians, end.radians));
        Ok(())
    }
    fn fill(&mut self) -> crate::Result {
        self.calls.push(Call::Fill);
        Ok(())
    }
    fn stroke(&mut self) -> crate::Result {
        self.calls.push(Call::Stroke);
        Ok(())
    }
    fn draw_image(
        &mut self,
        image: Image,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    ) -> crate::Result {
        if self.reject_images {
            return Err(Error::UnknownImage(image));
        }
        self.calls.push(Call::DrawImage(image, x, y, width, height));
        Ok(())
    }
    fn resize(&mut self, width: u32, height: u32) -> crate::Result {
        self.calls.push(Call::Resize(width, height));
        Ok(())
    }
}

/// A fresh recording context, plus the shared handle drawables use.
pub(crate) fn recording() -> (Arc<Mutex<RecordingContext>>, SharedContext) {
    let record = Arc::new(Mutex::new(RecordingContext::default()));
    let context: SharedContext = record.clone();
    (record, context)
}

/// A host image handle with the given id.
pub(crate) fn image(id: usize) -> Image {
    Image::from_raw(NonZeroUsize::new(id).expect("image ids are non-zero"))
}

pub(crate) fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
