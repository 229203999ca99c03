use std::fmt::{self, Write as _};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// A node of the layout tree.
///
/// `Flex` lays its children out left to right and wraps at its own right
/// edge, which is how a fixed-width container turns a flat cell list into a
/// grid. `Rect` centers its children within itself.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Flex {
        width: f32,
        height: f32,
        fill: Option<Color>,
        children: Vec<Node>,
    },
    Rect {
        width: f32,
        height: f32,
        fill: Color,
        children: Vec<Node>,
    },
    Disc {
        diameter: f32,
        fill: Color,
    },
    Text {
        content: String,
        size: f32,
        fill: Color,
    },
}

impl Node {
    /// Footprint used by the wrap layout. Text extent is an estimate; exact
    /// shaping happens later in the SVG text layer.
    fn extent(&self) -> (f32, f32) {
        match self {
            Node::Flex { width, height, .. } | Node::Rect { width, height, .. } => (*width, *height),
            Node::Disc { diameter, .. } => (*diameter, *diameter),
            Node::Text { content, size, .. } => {
                (content.chars().count() as f32 * size * 0.6, size * 1.2)
            }
        }
    }

    fn emit(&self, out: &mut String, x: f32, y: f32) {
        match self {
            Node::Flex {
                width,
                height,
                fill,
                children,
            } => {
                if let Some(fill) = fill {
                    let _ = write!(
                        out,
                        r#"<rect x="{x}" y="{y}" width="{width}" height="{height}" fill="{fill}"/>"#
                    );
                }
                let mut cursor_x = x;
                let mut cursor_y = y;
                let mut row_height = 0.0f32;
                for child in children {
                    let (child_w, child_h) = child.extent();
                    if cursor_x + child_w > x + width + f32::EPSILON {
                        cursor_x = x;
                        cursor_y += row_height;
                        row_height = 0.0;
                    }
                    child.emit(out, cursor_x, cursor_y);
                    cursor_x += child_w;
                    row_height = row_height.max(child_h);
                }
            }
            Node::Rect {
                width,
                height,
                fill,
                children,
            } => {
                let _ = write!(
                    out,
                    r#"<rect x="{x}" y="{y}" width="{width}" height="{height}" fill="{fill}"/>"#
                );
                for child in children {
                    let (child_w, child_h) = child.extent();
                    child.emit(out, x + (width - child_w) / 2.0, y + (height - child_h) / 2.0);
                }
            }
            Node::Disc { diameter, fill } => {
                let r = diameter / 2.0;
                let _ = write!(
                    out,
                    r#"<circle cx="{cx}" cy="{cy}" r="{r}" fill="{fill}"/>"#,
                    cx = x + r,
                    cy = y + r,
                );
            }
            Node::Text {
                content,
                size,
                fill,
            } => {
                let _ = write!(
                    out,
                    r#"<text x="{x}" y="{baseline}" font-family="sans-serif" font-size="{size}" fill="{fill}">{text}</text>"#,
                    baseline = y + size,
                    text = escape_xml(content),
                );
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub width: u32,
    pub height: u32,
    pub root: Node,
}

impl Scene {
    /// Serialize the tree to standalone SVG. Pure: equal scenes produce
    /// byte-identical markup.
    pub fn to_svg(&self) -> String {
        let mut out = String::with_capacity(4096);
        let _ = write!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = self.width,
            h = self.height,
        );
        self.root.emit(&mut out, 0.0, 0.0);
        out.push_str("</svg>");
        out
    }
}

fn escape_xml(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}
