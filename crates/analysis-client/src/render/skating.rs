use super::{escape, png_src};
use crate::error::{ClientError, ErrorKind};
use crate::models::{ContrastiveStat, JumpAnalysis, JumpComparison, MetricComparison, SkatingReport};
use std::collections::BTreeMap;
use std::fmt::Write;

/// Metrics shown in a jump comparison table, in display order, as
/// `(comparison key, label)`. Anything else in the response is dropped.
pub const METRIC_ALLOW_LIST: [(&str, &str); 6] = [
    ("brightness", "Brightness"),
    ("edges", "Edge contrast (Sobel)"),
    ("color_entropy", "Color entropy"),
    ("height_max", "Max height"),
    ("aspect_ratio_mean", "Width/height ratio"),
    ("landing_stability", "Stability"),
];

const NO_JUMPS: &str = "<p class=\"no-jumps\">No jumps detected</p>";

fn optional<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| v.to_string())
}

/// Video statistics, the detected-jump timeline and shot boundaries.
pub fn render_skating_overview(report: &SkatingReport) -> String {
    let info = &report.video_info;
    let total_jumps = report.jump_count();
    let shots = report.shot_count();

    let mut html = String::from(
        "<div class=\"video-stats\"><h4>Video statistics</h4><div class=\"stats-grid\">",
    );
    let _ = write!(
        html,
        "<div class=\"stat-item\">Duration: {} s</div>\
         <div class=\"stat-item\">FPS: {}</div>\
         <div class=\"stat-item\">Scenes: {}</div>\
         <div class=\"stat-item\">Jumps: {}</div>",
        optional(info.duration),
        optional(info.fps),
        shots,
        total_jumps
    );
    html.push_str("</div></div>");

    html.push_str("<div class=\"timeline-section\"><h4>Jump timeline</h4>");
    if report.all_jumps.is_empty() {
        html.push_str(NO_JUMPS);
    } else {
        html.push_str("<div class=\"jump-list\">");
        for jump in &report.all_jumps {
            let _ = write!(
                html,
                "<div class=\"jump-item\"><span class=\"jump-time\">{}s</span>\
                 <span class=\"jump-intensity\">{}</span>\
                 <span class=\"jump-method\">{}</span>",
                jump.absolute_time,
                jump.intensity.map_or_else(|| "N/A".to_string(), |i| format!("{i:.2}")),
                escape(jump.detection_method.as_deref().unwrap_or("combined"))
            );
            if let Some(ratio) = jump.height_ratio.filter(|r| *r != 0.0) {
                let _ = write!(html, "<span class=\"jump-height\">{ratio:.2}x</span>");
            }
            html.push_str("</div>");
        }
        html.push_str("</div>");
    }
    html.push_str("</div>");

    html.push_str("<div class=\"shots-section\"><h4>Scenes</h4>");
    if report.shots.is_empty() {
        html.push_str("<p>No scene changes detected</p>");
    } else {
        html.push_str("<ul class=\"shot-list\">");
        for shot in &report.shots {
            let _ = write!(html, "<li>{shot}s</li>");
        }
        html.push_str("</ul>");
    }
    html.push_str("</div>");
    html
}

/// Allow-listed metrics present in a comparison, in allow-list order.
fn allowed_metrics(comparison: &BTreeMap<String, MetricComparison>) -> Vec<&MetricComparison> {
    METRIC_ALLOW_LIST
        .iter()
        .filter_map(|(key, label)| {
            comparison
                .get(*key)
                .or_else(|| comparison.values().find(|m| m.name == *label))
        })
        .collect()
}

fn raw_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => escape(s),
        other => other.to_string(),
    }
}

fn render_comparison(cmp: &JumpComparison, html: &mut String) {
    let [start, end] = cmp.time_interval;
    let _ = write!(
        html,
        "<div class=\"jump-analysis\"><h5>Jump {}: {}–{} s \
         <span class=\"duration\">(duration: {} s)</span></h5>",
        cmp.jump_index, start, end, cmp.jump_duration
    );
    html.push_str(
        "<table><thead><tr><th>Metric</th><th>Preparation</th>\
         <th>Jump</th><th>Landing</th></tr></thead><tbody>",
    );
    for metric in allowed_metrics(&cmp.comparison) {
        let _ = write!(
            html,
            "<tr><td>{}</td><td>{}</td><td><strong>{}</strong></td><td>{}</td></tr>",
            escape(&metric.name),
            raw_value(&metric.pre),
            raw_value(&metric.jump),
            raw_value(&metric.post)
        );
    }
    html.push_str("</tbody></table></div>");
}

fn overlay_id(jump_index: u32) -> String {
    format!("frames-overlay-{jump_index}")
}

/// Full-screen view of every sample frame of one jump.
///
/// Rendered `hidden` unless `open`; clicking the overlay or its close
/// control hides it again.
pub fn render_overlay(analysis: &JumpAnalysis, open: bool) -> String {
    let index = analysis.jump_index();
    let mut html = format!(
        "<div class=\"frames-overlay\" id=\"{}\"{}>\
         <div class=\"overlay-close\" title=\"Close\">✖</div>\
         <h3>Jump {} frames</h3>",
        overlay_id(index),
        if open { "" } else { " hidden" },
        index
    );
    for frame in analysis.sample_frames() {
        let _ = write!(
            html,
            "<img src=\"{}\" style=\"width:400px;height:auto\">",
            png_src(frame)
        );
    }
    html.push_str("</div>");
    html
}

/// Per-jump tables and errors, followed by the sample frame galleries.
pub fn render_jump_analyses(analyses: &[JumpAnalysis]) -> String {
    if analyses.is_empty() {
        return NO_JUMPS.to_string();
    }

    let mut html = String::from("<div class=\"jump-analysis-list\">");
    for analysis in analyses {
        match analysis {
            JumpAnalysis::Failed(failure) => {
                let _ = write!(
                    html,
                    "<div class=\"jump-error\"><strong>Jump {} failed:</strong> \
                     <span>{}</span></div>",
                    failure.jump_index,
                    escape(&failure.error)
                );
            }
            JumpAnalysis::Compared(cmp) => render_comparison(cmp, &mut html),
        }
    }
    html.push_str("</div>");

    let with_frames: Vec<&JumpAnalysis> = analyses
        .iter()
        .filter(|a| !a.sample_frames().is_empty())
        .collect();
    if with_frames.is_empty() {
        return html;
    }

    html.push_str("<div class=\"jump-frames-section\"><h4>Sample jump frames</h4>");
    for analysis in &with_frames {
        let index = analysis.jump_index();
        let _ = write!(
            html,
            "<div class=\"jump-gallery\" data-overlay=\"{}\" title=\"Click to enlarge\">\
             <h6>Jump {}</h6>",
            overlay_id(index),
            index
        );
        for frame in analysis.sample_frames() {
            let _ = write!(
                html,
                "<img src=\"{}\" style=\"width:220px;height:auto\">",
                png_src(frame)
            );
        }
        html.push_str("</div>");
    }
    for analysis in &with_frames {
        html.push_str(&render_overlay(analysis, false));
    }
    html.push_str("</div>");
    html
}

fn contrastive_label(feature: &str) -> &str {
    match feature {
        "brightness" => "Brightness",
        "edges" => "Edges/Sharpness",
        "vertical_motion" => "Vertical motion",
        other => other,
    }
}

/// Jump versus non-jump feature means. Empty input renders nothing.
pub fn render_contrastive(stats: &BTreeMap<String, ContrastiveStat>) -> String {
    if stats.is_empty() {
        return String::new();
    }
    let mut html = String::from("<div class=\"contrastive-grid\">");
    for (feature, stat) in stats {
        let higher = stat.difference > 0.0;
        let _ = write!(
            html,
            "<div class=\"contrastive-item\"><h6>{}</h6><div class=\"contrastive-values\">\
             <div class=\"value-item\"><span class=\"label\">During jump:</span> \
             <span class=\"value\">{:.4}</span></div>\
             <div class=\"value-item\"><span class=\"label\">Without jump:</span> \
             <span class=\"value\">{:.4}</span></div>\
             <div class=\"value-item highlight\"><span class=\"label\">Difference:</span> \
             <span class=\"value\">{}{:.4}</span></div>\
             </div><div class=\"difference-indicator {}\">{}</div></div>",
            escape(contrastive_label(feature)),
            stat.jump_mean,
            stat.non_jump_mean,
            if higher { "+" } else { "" },
            stat.difference,
            if higher { "positive" } else { "negative" },
            if higher { "Higher during the jump" } else { "Lower during the jump" }
        );
    }
    html.push_str("</div>");
    html
}

/// Everything shown for a successful analysis.
pub fn render_skating_report(report: &SkatingReport) -> String {
    let mut html = render_skating_overview(report);
    html.push_str("<div class=\"jumps-section\"><h4>Jump details</h4>");
    html.push_str(&render_jump_analyses(&report.jump_analysis));
    html.push_str("</div>");
    let contrastive = render_contrastive(&report.contrastive_analysis);
    if !contrastive.is_empty() {
        html.push_str("<div class=\"contrastive-analysis\"><h4>Contrastive analysis</h4>");
        html.push_str(&contrastive);
        html.push_str("</div>");
    }
    html
}

/// Inline failure message, worded per error kind.
///
/// Discarded results (cancelled or superseded requests) render nothing.
pub fn render_video_failure(error: &ClientError) -> Option<String> {
    let html = match error {
        ClientError::Status { status, .. } => format!(
            "<div class=\"error-message\"><h4>Analysis error</h4>\
             <p>HTTP error! status: {status}</p></div>"
        ),
        ClientError::Server(message) => format!(
            "<div class=\"error\">Analysis failed: {}</div>",
            escape(message)
        ),
        _ => match error.kind() {
            ErrorKind::Discarded => return None,
            ErrorKind::Timeout => "<div class=\"error-message\"><h4>Request timed out</h4>\
                 <p>The analysis took too long. Try to:</p><ul>\
                 <li>Reduce the number of intervals</li>\
                 <li>Use a shorter video</li>\
                 <li>Check your internet connection</li></ul></div>"
                .to_string(),
            ErrorKind::Transport | ErrorKind::Domain => format!(
                "<div class=\"error-message\"><h4>Analysis error</h4><p>{}</p></div>",
                escape(&error.to_string())
            ),
            ErrorKind::Validation => format!(
                "<div class=\"error-message validation\"><p>{}</p></div>",
                escape(&error.to_string())
            ),
        },
    };
    Some(html)
}

/// Which jump's frames are shown full-screen, if any.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameOverlay {
    open: Option<u32>,
}

impl FrameOverlay {
    /// Open the overlay for a jump. Jumps without frames have no gallery to click.
    pub fn open(&mut self, analyses: &[JumpAnalysis], jump_index: u32) -> bool {
        let has_frames = analyses
            .iter()
            .any(|a| a.jump_index() == jump_index && !a.sample_frames().is_empty());
        if has_frames {
            self.open = Some(jump_index);
        }
        has_frames
    }

    /// Close via the backdrop or the close control.
    pub fn dismiss(&mut self) {
        self.open = None;
    }

    pub fn open_jump(&self) -> Option<u32> {
        self.open
    }

    /// The visible overlay, if one is open.
    pub fn render(&self, analyses: &[JumpAnalysis]) -> Option<String> {
        let index = self.open?;
        analyses
            .iter()
            .find(|a| a.jump_index() == index)
            .map(|a| render_overlay(a, true))
    }
}
