use serde::{Deserialize, Serialize};

use crate::geometry::Point;


#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Color {
    Red,
    Green,
    Blue,
    Gray,
    Black,
}

/// Base holds the map itself, Annotation holds everything an exploration adds on top
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Layer {
    Base,
    Annotation,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Primitive {
    Point { at: Point, color: Color, size: f64 },
    Segment { from: Point, to: Point, color: Color, width: f64 },
    Text { at: Point, text: String, color: Color, size: f64 },
}

pub trait Renderer {
    fn draw(&mut self, layer: Layer, primitive: Primitive);

    /// Remove everything drawn on `layer`
    fn clear(&mut self, layer: Layer);
}

impl<R: Renderer + ?Sized> Renderer for &mut R {
    fn draw(&mut self, layer: Layer, primitive: Primitive) {
        (**self).draw(layer, primitive);
    }

    fn clear(&mut self, layer: Layer) {
        (**self).clear(layer);
    }
}


#[derive(Clone, Debug, PartialEq)]
pub enum RenderCall {
    Draw(Layer, Primitive),
    Clear(Layer),
}

/// Headless renderer that keeps every request
#[derive(Clone, Debug, Default)]
pub struct RecordingRenderer {
    pub calls: Vec<RenderCall>,
}

impl RecordingRenderer {

    pub fn new() -> Self {
        Self::default()
    }

    /// Primitives currently visible on `layer`, i.e. drawn since its last clear
    pub fn visible(&self, layer: Layer) -> Vec<&Primitive> {
        let since = self.calls.iter()
            .rposition(|call| *call == RenderCall::Clear(layer))
            .map_or(0, |cleared| cleared + 1);

        self.calls[since..].iter()
            .filter_map(|call| match call {
                RenderCall::Draw(drawn_on, primitive) if *drawn_on == layer => Some(primitive),
                _ => None,
            })
            .collect()
    }

    /// Visible segments of one color on `layer`
    pub fn segments(&self, layer: Layer, color: Color) -> Vec<(Point, Point)> {
        self.visible(layer).into_iter()
            .filter_map(|primitive| match primitive {
                Primitive::Segment { from, to, color: c, .. } if *c == color => Some((*from, *to)),
                _ => None,
            })
            .collect()
    }

    /// Visible text labels on `layer`
    pub fn texts(&self, layer: Layer) -> Vec<&str> {
        self.visible(layer).into_iter()
            .filter_map(|primitive| match primitive {
                Primitive::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Renderer for RecordingRenderer {
    fn draw(&mut self, layer: Layer, primitive: Primitive) {
        self.calls.push(RenderCall::Draw(layer, primitive));
    }

    fn clear(&mut self, layer: Layer) {
        self.calls.push(RenderCall::Clear(layer));
    }
}
