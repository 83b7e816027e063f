//! Core layer data model for studio documents.
//!
//! A document is a flat list of `Layer` values. Paint order is given by each
//! layer's `z_index` (ascending), not by list position. Groups reference their
//! members by id rather than owning them, and masks link two layers through
//! `is_mask` / `masked_by`. The model is purely declarative: a rendering
//! collaborator interprets it, nothing here rasterizes.

use crate::id::LayerId;
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

// ─── Colors ──────────────────────────────────────────────────────────────

/// RGBA color. Stored as 4 × f32 [0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl Color {
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Parse a hex color string: `#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA`.
    /// The leading `#` is optional.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let bytes = hex.as_bytes();

        let channels: SmallVec<[u8; 4]> = match bytes.len() {
            3 | 4 => bytes
                .iter()
                .map(|&c| hex_val(c).map(|v| v * 17))
                .collect::<Option<_>>()?,
            6 | 8 => bytes
                .chunks(2)
                .map(|pair| Some(hex_val(pair[0])? << 4 | hex_val(pair[1])?))
                .collect::<Option<_>>()?,
            _ => return None,
        };

        let unit = |v: u8| v as f32 / 255.0;
        Some(Self::rgba(
            unit(channels[0]),
            unit(channels[1]),
            unit(channels[2]),
            channels.get(3).copied().map_or(1.0, unit),
        ))
    }

    /// Emit as `#RRGGBB`, or `#RRGGBBAA` when not fully opaque.
    pub fn to_hex(&self) -> String {
        let byte = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        let (r, g, b, a) = (byte(self.r), byte(self.g), byte(self.b), byte(self.a));
        if a == 255 {
            format!("#{r:02X}{g:02X}{b:02X}")
        } else {
            format!("#{r:02X}{g:02X}{b:02X}{a:02X}")
        }
    }
}

// ─── Enumerations ────────────────────────────────────────────────────────

/// The closed set of layer types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerType {
    Image,
    Text,
    Group,
    Frame,
    Shape,
    Adjustment,
}

impl LayerType {
    pub fn as_str(self) -> &'static str {
        match self {
            LayerType::Image => "image",
            LayerType::Text => "text",
            LayerType::Group => "group",
            LayerType::Frame => "frame",
            LayerType::Shape => "shape",
            LayerType::Adjustment => "adjustment",
        }
    }
}

/// Compositing modes understood by the rendering collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlendMode {
    #[default]
    Normal,
    Multiply,
    Screen,
    Overlay,
    Darken,
    Lighten,
    ColorDodge,
    ColorBurn,
    HardLight,
    SoftLight,
    Difference,
    Exclusion,
    Hue,
    Saturation,
    Color,
    Luminosity,
}

/// How a mask layer clips the layer it masks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaskType {
    Raster,
    Vector,
}

impl MaskType {
    /// Display name given to a layer when it becomes a mask of this type.
    pub fn layer_name(self) -> &'static str {
        match self {
            MaskType::Raster => "Raster Mask",
            MaskType::Vector => "Vector Mask",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
    Justify,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextDecoration {
    #[default]
    None,
    Underline,
    LineThrough,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    #[default]
    Rectangle,
    Circle,
    Triangle,
    Star,
    Heart,
    Hexagon,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AdjustmentKind {
    #[default]
    BrightnessContrast,
    HueSaturation,
}

/// Numeric parameters of an adjustment layer. Unset values mean "no change".
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AdjustmentValues {
    /// -100 ..= 100
    pub brightness: Option<f64>,
    /// -100 ..= 100
    pub contrast: Option<f64>,
    /// 0 ..= 360 degrees
    pub hue: Option<f64>,
    /// -100 ..= 100
    pub saturation: Option<f64>,
}

// ─── Type-specific content ───────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextProps {
    pub content: String,
    pub font_size: f64,
    pub font_family: String,
    /// CSS-style weight, 100..=900.
    pub font_weight: u16,
    pub italic: bool,
    pub color: Color,
    pub align: TextAlign,
    pub decoration: TextDecoration,
    pub line_height: Option<f64>,
    pub letter_spacing: Option<f64>,
}

impl Default for TextProps {
    fn default() -> Self {
        Self {
            content: "New Text".into(),
            font_size: 48.0,
            font_family: "Inter".into(),
            font_weight: 400,
            italic: false,
            color: Color::WHITE,
            align: TextAlign::Center,
            decoration: TextDecoration::None,
            line_height: None,
            letter_spacing: None,
        }
    }
}

/// Type tag plus the fields that only make sense for that type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LayerContent {
    Image {
        url: String,
    },
    Text(TextProps),
    /// Flat list of member ids captured when the group was created.
    Group {
        children: SmallVec<[LayerId; 4]>,
        expanded: bool,
    },
    Frame {
        style: Option<String>,
    },
    Shape {
        shape: ShapeKind,
        fill: Color,
    },
    Adjustment {
        kind: AdjustmentKind,
        values: AdjustmentValues,
    },
}

impl LayerContent {
    /// Default content for a freshly added layer of the given type.
    pub fn default_for(ty: LayerType) -> Self {
        match ty {
            LayerType::Image => LayerContent::Image { url: String::new() },
            LayerType::Text => LayerContent::Text(TextProps::default()),
            LayerType::Group => LayerContent::Group {
                children: SmallVec::new(),
                expanded: false,
            },
            LayerType::Frame => LayerContent::Frame { style: None },
            LayerType::Shape => LayerContent::Shape {
                shape: ShapeKind::Rectangle,
                fill: Color::rgba(0.42, 0.36, 0.91, 1.0),
            },
            LayerType::Adjustment => LayerContent::Adjustment {
                kind: AdjustmentKind::BrightnessContrast,
                values: AdjustmentValues::default(),
            },
        }
    }

    pub fn layer_type(&self) -> LayerType {
        match self {
            LayerContent::Image { .. } => LayerType::Image,
            LayerContent::Text(_) => LayerType::Text,
            LayerContent::Group { .. } => LayerType::Group,
            LayerContent::Frame { .. } => LayerType::Frame,
            LayerContent::Shape { .. } => LayerType::Shape,
            LayerContent::Adjustment { .. } => LayerType::Adjustment,
        }
    }
}

// ─── Layer ───────────────────────────────────────────────────────────────

/// A single layer in the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub id: LayerId,
    pub name: String,

    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Degrees, clockwise.
    pub rotation: f64,
    /// Paint order key; higher paints later.
    pub z_index: i64,

    pub visible: bool,
    pub locked: bool,
    pub opacity: f64,
    pub blend_mode: BlendMode,

    pub content: LayerContent,

    /// This layer acts as a clip shape for another layer.
    pub is_mask: bool,
    /// The mask layer clipping this one, if any.
    pub masked_by: Option<LayerId>,
    pub mask_type: Option<MaskType>,
}

impl Layer {
    pub fn layer_type(&self) -> LayerType {
        self.content.layer_type()
    }

    /// Axis-aligned box in document units (rotation ignored).
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn center(&self) -> Point {
        self.rect().center()
    }

    /// Group members, or an empty slice for non-group layers.
    pub fn children(&self) -> &[LayerId] {
        match &self.content {
            LayerContent::Group { children, .. } => children,
            _ => &[],
        }
    }

    /// Whether this layer only exists to clip another one.
    pub fn is_clip_source(&self) -> bool {
        self.is_mask
    }
}

// ─── New layers & patches ────────────────────────────────────────────────

/// A partially specified layer handed to `Document::add_layer`.
/// Unset fields receive documented defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLayer {
    pub id: Option<LayerId>,
    pub name: Option<String>,
    pub content: LayerContent,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub rotation: Option<f64>,
    pub visible: Option<bool>,
    pub locked: Option<bool>,
    pub opacity: Option<f64>,
    pub blend_mode: Option<BlendMode>,
}

impl NewLayer {
    pub fn new(ty: LayerType) -> Self {
        Self::with_content(LayerContent::default_for(ty))
    }

    pub fn with_content(content: LayerContent) -> Self {
        Self {
            id: None,
            name: None,
            content,
            x: None,
            y: None,
            width: None,
            height: None,
            rotation: None,
            visible: None,
            locked: None,
            opacity: None,
            blend_mode: None,
        }
    }

    pub fn image(url: impl Into<String>) -> Self {
        Self::with_content(LayerContent::Image { url: url.into() })
    }

    pub fn id(mut self, id: LayerId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }

    pub fn sized(mut self, width: f64, height: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn rotated(mut self, degrees: f64) -> Self {
        self.rotation = Some(degrees);
        self
    }

    pub fn locked(mut self, locked: bool) -> Self {
        self.locked = Some(locked);
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = Some(false);
        self
    }
}

/// A set of field changes merged into an existing layer by
/// `Document::update_layer`. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerPatch {
    pub name: Option<String>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub rotation: Option<f64>,
    pub visible: Option<bool>,
    pub locked: Option<bool>,
    pub opacity: Option<f64>,
    pub blend_mode: Option<BlendMode>,
    pub content: Option<LayerContent>,
}

impl LayerPatch {
    pub fn position(p: Point) -> Self {
        Self {
            x: Some(p.x),
            y: Some(p.y),
            ..Self::default()
        }
    }

    pub fn rect(r: Rect) -> Self {
        Self {
            x: Some(r.x0),
            y: Some(r.y0),
            width: Some(r.width()),
            height: Some(r.height()),
            ..Self::default()
        }
    }

    pub fn x(x: f64) -> Self {
        Self {
            x: Some(x),
            ..Self::default()
        }
    }

    pub fn y(y: f64) -> Self {
        Self {
            y: Some(y),
            ..Self::default()
        }
    }

    pub fn rotation(degrees: f64) -> Self {
        Self {
            rotation: Some(degrees),
            ..Self::default()
        }
    }

    pub fn touches_geometry(&self) -> bool {
        self.x.is_some()
            || self.y.is_some()
            || self.width.is_some()
            || self.height.is_some()
            || self.rotation.is_some()
    }

    pub(crate) fn apply(self, layer: &mut Layer) {
        if let Some(locked) = self.locked {
            layer.locked = locked;
        }
        if !layer.locked {
            if let Some(x) = self.x {
                layer.x = x;
            }
            if let Some(y) = self.y {
                layer.y = y;
            }
            if let Some(w) = self.width {
                layer.width = w;
            }
            if let Some(h) = self.height {
                layer.height = h;
            }
            if let Some(r) = self.rotation {
                layer.rotation = r;
            }
        }
        if let Some(name) = self.name {
            layer.name = name;
        }
        if let Some(visible) = self.visible {
            layer.visible = visible;
        }
        if let Some(opacity) = self.opacity {
            layer.opacity = opacity.clamp(0.0, 1.0);
        }
        if let Some(mode) = self.blend_mode {
            layer.blend_mode = mode;
        }
        if let Some(content) = self.content {
            layer.content = content;
        }
    }
}

// ─── Canvas view ─────────────────────────────────────────────────────────

/// Grid overlay and snapping settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSettings {
    pub size: f64,
    pub opacity: f64,
    pub visible: bool,
    pub snap: bool,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            size: 20.0,
            opacity: 0.15,
            visible: true,
            snap: true,
        }
    }
}

/// Ephemeral view state: document size, pan/zoom and grid.
///
/// Screen coordinates are canvas-element pixels; document coordinates are
/// `(screen - pan) / zoom`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasView {
    pub width: f64,
    pub height: f64,
    pub zoom: f64,
    pub pan: Vec2,
    pub grid: GridSettings,
}

impl Default for CanvasView {
    fn default() -> Self {
        Self {
            width: 1024.0,
            height: 768.0,
            zoom: 1.0,
            pan: Vec2::ZERO,
            grid: GridSettings::default(),
        }
    }
}

impl CanvasView {
    /// Full document rectangle.
    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }

    pub fn screen_to_document(&self, p: Point) -> Point {
        ((p.to_vec2() - self.pan) / self.zoom).to_point()
    }

    pub fn document_to_screen(&self, p: Point) -> Point {
        (p.to_vec2() * self.zoom + self.pan).to_point()
    }

    /// The document-space rectangle visible through a viewport of the given
    /// screen size.
    pub fn visible_rect(&self, viewport_width: f64, viewport_height: f64) -> Rect {
        let origin = self.screen_to_document(Point::ORIGIN);
        let corner = self.screen_to_document(Point::new(viewport_width, viewport_height));
        Rect::from_points(origin, corner)
    }

    /// Grid size to snap to, if snapping is enabled.
    pub fn snap_grid(&self) -> Option<f64> {
        (self.grid.snap && self.grid.size > 0.0).then_some(self.grid.size)
    }
}
