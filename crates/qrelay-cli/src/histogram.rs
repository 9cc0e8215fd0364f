//! SVG bar chart of measurement counts.
//!
//! One bar per outcome, ordered by bitstring, labelled with its count.
//! The y axis shows relative frequency.

use std::fmt::Write as _;

use qrelay_hal::Counts;

const MARGIN_LEFT: f64 = 70.0;
const MARGIN_RIGHT: f64 = 20.0;
const MARGIN_TOP: f64 = 30.0;
const MARGIN_BOTTOM: f64 = 90.0;
const BAR_COLOR: &str = "#648fff";
const Y_TICKS: u32 = 5;

/// Render `counts` as an SVG document of `width` x `height` pixels.
pub fn render_svg(counts: &Counts, width: u32, height: u32) -> String {
    let w = f64::from(width);
    let h = f64::from(height);
    let plot_w = (w - MARGIN_LEFT - MARGIN_RIGHT).max(1.0);
    let plot_h = (h - MARGIN_TOP - MARGIN_BOTTOM).max(1.0);
    let x0 = MARGIN_LEFT;
    let y0 = MARGIN_TOP + plot_h;

    let entries = counts.sorted();
    let total = counts.total_shots();
    let top = entries
        .iter()
        .map(|(_, n)| fraction(**n, total))
        .fold(0.0_f64, f64::max);
    // Leave headroom above the tallest bar for its label.
    let y_max = if top > 0.0 { (top * 1.15).min(1.0) } else { 1.0 };

    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}" font-family="sans-serif">"#
    );
    let _ = writeln!(svg, r#"<rect width="100%" height="100%" fill="white"/>"#);

    for i in 0..=Y_TICKS {
        let value = y_max * f64::from(i) / f64::from(Y_TICKS);
        let y = y0 - plot_h * f64::from(i) / f64::from(Y_TICKS);
        let _ = writeln!(
            svg,
            r##"<line x1="{x0:.1}" y1="{y:.1}" x2="{:.1}" y2="{y:.1}" stroke="#dddddd" stroke-dasharray="4 4"/>"##,
            x0 + plot_w
        );
        let _ = writeln!(
            svg,
            r#"<text x="{:.1}" y="{:.1}" font-size="12" text-anchor="end">{value:.3}</text>"#,
            x0 - 8.0,
            y + 4.0
        );
    }

    if !entries.is_empty() {
        let slot = plot_w / entries.len() as f64;
        let bar_w = slot * 0.6;
        let label_size = (slot * 0.35).clamp(8.0, 14.0);

        for (i, (bits, n)) in entries.iter().enumerate() {
            let bar_h = plot_h * fraction(**n, total) / y_max;
            let x = x0 + slot * i as f64 + (slot - bar_w) / 2.0;
            let cx = x + bar_w / 2.0;
            let _ = writeln!(
                svg,
                r#"<rect x="{x:.1}" y="{:.1}" width="{bar_w:.1}" height="{bar_h:.1}" fill="{BAR_COLOR}"/>"#,
                y0 - bar_h
            );
            let _ = writeln!(
                svg,
                r#"<text x="{cx:.1}" y="{:.1}" font-size="{label_size:.0}" text-anchor="middle">{n}</text>"#,
                y0 - bar_h - 4.0
            );
            let _ = writeln!(
                svg,
                r#"<text x="{cx:.1}" y="{:.1}" font-size="{label_size:.0}" text-anchor="end" transform="rotate(-70 {cx:.1} {:.1})">{}</text>"#,
                y0 + 14.0,
                y0 + 14.0,
                escape(bits)
            );
        }
    }

    let _ = writeln!(
        svg,
        r#"<line x1="{x0:.1}" y1="{y0:.1}" x2="{:.1}" y2="{y0:.1}" stroke="black"/>"#,
        x0 + plot_w
    );
    let _ = writeln!(
        svg,
        r#"<line x1="{x0:.1}" y1="{MARGIN_TOP:.1}" x2="{x0:.1}" y2="{y0:.1}" stroke="black"/>"#
    );
    let _ = writeln!(
        svg,
        r#"<text x="18" y="{:.1}" font-size="14" text-anchor="middle" transform="rotate(-90 18 {:.1})">Probability</text>"#,
        MARGIN_TOP + plot_h / 2.0,
        MARGIN_TOP + plot_h / 2.0
    );
    svg.push_str("</svg>\n");
    svg
}

fn fraction(n: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        n as f64 / total as f64
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
