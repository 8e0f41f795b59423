//! SVG rendering of the supply graph

use super::layout::Layout;
use super::store::SupplyGraph;
use crate::supplier::RiskTier;
use std::fmt::Write;

const WIDTH: f64 = 1000.0;
const HEIGHT: f64 = 700.0;
const PADDING: f64 = 70.0;
const NODE_RADIUS: f64 = 16.0;
const NODE_COLOR: &str = "skyblue";
const LOOP_SIZE: f64 = 28.0;
const TITLE: &str = "Multi-Tier Supply Chain Knowledge Graph";

const EDGE_COLORS: [&str; 4] = ["red", "orange", "green", "gray"];

/// Edge color for a risk label. Dangerous and unknown tiers fall back to gray.
pub fn edge_color(risk: Option<RiskTier>) -> &'static str {
    match risk {
        Some(RiskTier::High) => "red",
        Some(RiskTier::Moderate) => "orange",
        Some(RiskTier::Low) => "green",
        _ => "gray",
    }
}

/// Map a normalised layout coordinate onto the canvas
fn to_canvas(x: f64, y: f64) -> (f64, f64) {
    let half_w = (WIDTH - 2.0 * PADDING) / 2.0;
    let half_h = (HEIGHT - 2.0 * PADDING) / 2.0;
    (WIDTH / 2.0 + x * half_w, HEIGHT / 2.0 - y * half_h)
}

pub fn render_svg(graph: &SupplyGraph, layout: &Layout) -> String {
    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = WIDTH,
        h = HEIGHT
    );
    svg.push_str("<defs>\n");
    for color in EDGE_COLORS {
        let _ = writeln!(
            svg,
            r#"<marker id="arrow-{c}" viewBox="0 0 10 10" refX="10" refY="5" markerWidth="8" markerHeight="8" orient="auto-start-reverse"><path d="M 0 0 L 10 5 L 0 10 z" fill="{c}"/></marker>"#,
            c = color
        );
    }
    svg.push_str("</defs>\n");
    let _ = writeln!(
        svg,
        r#"<text x="{}" y="30" text-anchor="middle" font-family="sans-serif" font-size="18">{}</text>"#,
        WIDTH / 2.0,
        TITLE
    );

    let point = |index: usize| {
        let (x, y) = layout.position(index).unwrap_or((0.0, 0.0));
        to_canvas(x, y)
    };

    for edge in graph.edges() {
        let (x1, y1) = point(edge.source.as_usize());
        let color = edge_color(edge.risk);

        if edge.source == edge.target {
            // Loop over the top of the node
            let top = y1 - NODE_RADIUS;
            let _ = writeln!(
                svg,
                r#"<path class="self-loop" d="M {:.1} {:.1} C {:.1} {:.1} {:.1} {:.1} {:.1} {:.1}" fill="none" stroke="{c}" stroke-width="2" marker-end="url(#arrow-{c})" data-tier="{}"/>"#,
                x1 - 6.0,
                top,
                x1 - LOOP_SIZE,
                top - LOOP_SIZE,
                x1 + LOOP_SIZE,
                top - LOOP_SIZE,
                x1 + 6.0,
                top,
                edge.tier,
                c = color
            );
            continue;
        }

        let (x2, y2) = point(edge.target.as_usize());
        let (dx, dy) = (x2 - x1, y2 - y1);
        let length = (dx * dx + dy * dy).sqrt();
        // Stop at the node rims when they do not overlap, else centre to centre
        let (sx, sy, tx, ty) = if length > 2.0 * NODE_RADIUS {
            let (ux, uy) = (dx / length, dy / length);
            (
                x1 + ux * NODE_RADIUS,
                y1 + uy * NODE_RADIUS,
                x2 - ux * NODE_RADIUS,
                y2 - uy * NODE_RADIUS,
            )
        } else {
            (x1, y1, x2, y2)
        };
        let _ = writeln!(
            svg,
            r#"<line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="{c}" stroke-width="2" marker-end="url(#arrow-{c})" data-tier="{}"/>"#,
            sx,
            sy,
            tx,
            ty,
            edge.tier,
            c = color
        );
    }

    for node in graph.nodes() {
        let (x, y) = point(node.id.as_usize());
        let _ = writeln!(
            svg,
            r#"<circle cx="{:.1}" cy="{:.1}" r="{}" fill="{}"/>"#,
            x, y, NODE_RADIUS, NODE_COLOR
        );
        let _ = writeln!(
            svg,
            r#"<text x="{:.1}" y="{:.1}" text-anchor="middle" font-family="sans-serif" font-size="10">{}</text>"#,
            x,
            y + NODE_RADIUS + 12.0,
            escape_xml(&node.name)
        );
    }

    svg.push_str("</svg>\n");
    svg
}

pub(crate) fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}
