//! Serialises a [`ChartLayout`] into a standalone SVG document.
//!
//! Tooltips become `<title>` children and item links become `<a>` elements, so the same
//! document serves browsers and the rasteriser (which ignores both).

use crate::layout::{Anchor, Baseline, ChartLayout, Drawable, Stroke, TextItem};
use std::fmt::Write as _;
use xmlchart_core::Color;

const FONT_FAMILY: &str = "sans-serif";

pub(crate) fn fmt(v: f64) -> String {
    if !v.is_finite() {
        return "0".to_string();
    }
    let v = (v * 1000.0).round() / 1000.0;
    let s = v.to_string();
    if s == "-0" { "0".to_string() } else { s }
}

pub(crate) fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

pub fn render_svg(layout: &ChartLayout) -> String {
    let w = fmt(layout.width);
    let h = fmt(layout.height);
    let mut out = String::with_capacity(4096 + layout.drawables.len() * 96);
    let _ = write!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#
    );
    if let Some(bg) = layout.background {
        let _ = write!(out, r#"<rect x="0" y="0" width="{w}" height="{h}"{}/>"#, fill_attrs(Some(bg)));
    }
    for d in &layout.drawables {
        write_drawable(&mut out, d);
    }
    out.push_str("</svg>\n");
    out
}

fn fill_attrs(fill: Option<Color>) -> String {
    match fill {
        None => r#" fill="none""#.to_string(),
        Some(c) if c.is_opaque() => format!(r#" fill="{}""#, c.to_hex()),
        Some(c) => format!(r#" fill="{}" fill-opacity="{}""#, c.to_hex(), fmt(c.opacity())),
    }
}

fn stroke_attrs(stroke: Option<&Stroke>) -> String {
    let Some(s) = stroke else {
        return String::new();
    };
    let mut attrs = format!(
        r#" stroke="{}" stroke-width="{}""#,
        s.paint.to_hex(),
        fmt(s.width)
    );
    if !s.paint.is_opaque() {
        let _ = write!(attrs, r#" stroke-opacity="{}""#, fmt(s.paint.opacity()));
    }
    if s.dashed {
        attrs.push_str(r#" stroke-dasharray="2,2""#);
    }
    attrs
}

fn write_drawable(out: &mut String, d: &Drawable) {
    match d {
        Drawable::Rect { rect, fill, stroke } => {
            let _ = write!(
                out,
                r#"<rect x="{}" y="{}" width="{}" height="{}"{}{}/>"#,
                fmt(rect.x),
                fmt(rect.y),
                fmt(rect.width),
                fmt(rect.height),
                fill_attrs(*fill),
                stroke_attrs(stroke.as_ref()),
            );
        }
        Drawable::Line {
            x1,
            y1,
            x2,
            y2,
            stroke,
        } => {
            let _ = write!(
                out,
                r#"<line x1="{}" y1="{}" x2="{}" y2="{}"{}/>"#,
                fmt(*x1),
                fmt(*y1),
                fmt(*x2),
                fmt(*y2),
                stroke_attrs(Some(stroke)),
            );
        }
        Drawable::Path { d, fill, stroke } => {
            if d.is_empty() {
                return;
            }
            let _ = write!(
                out,
                r#"<path d="{d}"{}{}/>"#,
                fill_attrs(*fill),
                stroke_attrs(stroke.as_ref()),
            );
        }
        Drawable::Ellipse {
            cx,
            cy,
            rx,
            ry,
            fill,
            stroke,
        } => {
            let _ = write!(
                out,
                r#"<ellipse cx="{}" cy="{}" rx="{}" ry="{}"{}{}/>"#,
                fmt(*cx),
                fmt(*cy),
                fmt(*rx),
                fmt(*ry),
                fill_attrs(*fill),
                stroke_attrs(stroke.as_ref()),
            );
        }
        Drawable::Text(t) => write_text(out, t),
        Drawable::Group { opacity, children } => {
            let _ = write!(out, r#"<g opacity="{}">"#, fmt(*opacity));
            for c in children {
                write_drawable(out, c);
            }
            out.push_str("</g>");
        }
        Drawable::Item {
            tooltip,
            href,
            children,
        } => {
            match href {
                Some(href) => {
                    let href = escape_xml(href);
                    let _ = write!(out, r#"<a href="{href}" xlink:href="{href}">"#);
                }
                None => out.push_str("<g>"),
            }
            if let Some(tip) = tooltip {
                let _ = write!(out, "<title>{}</title>", escape_xml(tip));
            }
            for c in children {
                write_drawable(out, c);
            }
            out.push_str(if href.is_some() { "</a>" } else { "</g>" });
        }
    }
}

fn write_text(out: &mut String, t: &TextItem) {
    if t.text.is_empty() {
        return;
    }
    let anchor = match t.anchor {
        Anchor::Start => "start",
        Anchor::Middle => "middle",
        Anchor::End => "end",
    };
    let baseline = match t.baseline {
        Baseline::Top => "hanging",
        Baseline::Middle => "central",
        Baseline::Bottom => "text-after-edge",
    };
    let _ = write!(
        out,
        r#"<text x="{}" y="{}" font-family="{FONT_FAMILY}" font-size="{}" text-anchor="{anchor}" dominant-baseline="{baseline}"{}"#,
        fmt(t.x),
        fmt(t.y),
        fmt(t.font_size),
        fill_attrs(Some(t.fill)),
    );
    if t.bold {
        out.push_str(r#" font-weight="bold""#);
    }
    if t.rotation != 0.0 {
        let _ = write!(
            out,
            r#" transform="rotate({} {} {})""#,
            fmt(t.rotation),
            fmt(t.x),
            fmt(t.y)
        );
    }
    let _ = write!(out, ">{}</text>", escape_xml(&t.text));
}
