use super::{escape, png_src};
use crate::models::{CoverAnalysis, GenreStats, SimilarityItem};
use std::fmt::Write;

/// Cover analysis: the placeholder message, or the feature list with the annotated image.
pub fn render_analysis(analysis: &CoverAnalysis) -> String {
    let features = match analysis {
        CoverAnalysis::Placeholder { message } => {
            return format!(
                "<div class=\"analysis-result placeholder\"><p>{}</p></div>",
                escape(message)
            );
        }
        CoverAnalysis::Full(features) => features,
    };

    let mut html = String::from("<div class=\"analysis-result\">");
    let _ = write!(
        html,
        "<img class=\"preview\" src=\"{}\" alt=\"analyzed cover\">",
        png_src(&features.image_base64)
    );
    html.push_str("<ul class=\"features\">");
    let rows = [
        ("Design", escape(&features.design)),
        (
            "Face",
            format!(
                "{} ({})",
                if features.face { "yes" } else { "no" },
                escape(&features.face_position)
            ),
        ),
        ("Complexity", features.complexity.to_string()),
        ("Contrast", features.color_contrast.to_string()),
        ("Warmth", features.warm_cold_balance.to_string()),
        ("Text density", features.text_density.to_string()),
        ("Negative space", features.negative_space.to_string()),
    ];
    for (label, value) in rows {
        let _ = write!(html, "<li>{label}: {value}</li>");
    }
    html.push_str("</ul>");

    if !features.colors.is_empty() {
        html.push_str("<div class=\"dominant-colors\">");
        for [r, g, b] in &features.colors {
            let _ = write!(
                html,
                "<span class=\"swatch\" style=\"background:rgb({r},{g},{b})\" \
                 title=\"rgb({r}, {g}, {b})\"></span>"
            );
        }
        html.push_str("</div>");
    }
    html.push_str("</div>");
    html
}

/// Ranked similar covers.
pub fn render_similarity(results: &[SimilarityItem]) -> String {
    if results.is_empty() {
        return "<p class=\"no-results\">No similar covers found</p>".to_string();
    }
    let mut html = String::from("<div class=\"similarity-results\">");
    for item in results {
        let _ = write!(
            html,
            "<div class=\"similarity-item\"><img src=\"{}\" style=\"width:150px;height:auto\">\
             <h4>{}</h4><p>Similarity: {}</p></div>",
            png_src(&item.image_base64),
            escape(&item.title),
            item.score
        );
    }
    html.push_str("</div>");
    html
}

/// Dataset statistics with the optional plot.
pub fn render_genre_stats(stats: &GenreStats) -> String {
    let mut html = String::from("<div class=\"stats-container\">");
    if !stats.cache_info.is_empty() {
        let _ = write!(html, "<p><strong>{}</strong></p>", escape(&stats.cache_info));
    }
    let rows = [
        ("Total books", stats.total_books.to_string()),
        ("\"Cover coming soon\"", stats.placeholders.to_string()),
        ("Minimalistic", stats.minimalistic.to_string()),
        ("Balanced", stats.balanced().to_string()),
        ("Overloaded", stats.overloaded.to_string()),
        ("With faces", stats.faces.to_string()),
        (
            "Average contrast",
            format!("{:.2}", stats.avg_color_contrast.unwrap_or(0.0)),
        ),
        (
            "Average warm/cold balance",
            format!("{:.2}", stats.avg_warm_cold_balance.unwrap_or(0.0)),
        ),
    ];
    html.push_str("<div class=\"stats-summary\"><ul>");
    for (label, value) in rows {
        let _ = write!(html, "<li>{}: {}</li>", escape(label), value);
    }
    if let Some(mono) = stats.monochrome_percentage {
        let _ = write!(html, "<li>Monochrome: {mono:.1}%</li>");
    }
    html.push_str("</ul></div>");

    if let Some(plot) = stats.plot_base64.as_deref().filter(|p| !p.is_empty()) {
        let _ = write!(
            html,
            "<div class=\"stats-plot\"><img src=\"{}\" style=\"max-width:100%\"></div>",
            png_src(plot)
        );
    }
    html.push_str("</div>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CoverFeatures;

    fn features() -> CoverFeatures {
        CoverFeatures {
            design: "balanced".to_string(),
            face: false,
            face_position: "no_face".to_string(),
            complexity: 0.31,
            color_contrast: 54.2,
            warm_cold_balance: 1.4,
            text_density: 0.12,
            negative_space: 0.8,
            edge_density: Some(0.2),
            colors: vec![[255, 0, 0]],
            image_base64: "QUJD".to_string(),
        }
    }

    #[test]
    fn test_placeholder_renders_message_only() {
        let html = render_analysis(&CoverAnalysis::Placeholder {
            message: "Cover <soon>".to_string(),
        });
        assert!(html.contains("Cover &lt;soon&gt;"));
        assert!(!html.contains("<img"));
    }

    #[test]
    fn test_full_analysis_renders_features() {
        let html = render_analysis(&CoverAnalysis::Full(features()));
        assert!(html.contains("data:image/png;base64,QUJD"));
        assert!(html.contains("<li>Design: balanced</li>"));
        assert!(html.contains("<li>Face: no (no_face)</li>"));
        assert!(html.contains("<li>Contrast: 54.2</li>"));
        assert!(html.contains("rgb(255,0,0)"));
    }

    #[test]
    fn test_empty_similarity() {
        assert!(render_similarity(&[]).contains("No similar covers found"));
    }

    #[test]
    fn test_similarity_items_in_order() {
        let items = vec![
            SimilarityItem {
                title: "Dune".to_string(),
                score: 0.92,
                image_base64: "AA".to_string(),
            },
            SimilarityItem {
                title: "Solaris".to_string(),
                score: 0.5,
                image_base64: "BB".to_string(),
            },
        ];
        let html = render_similarity(&items);
        let dune = html.find("Dune").unwrap();
        let solaris = html.find("Solaris").unwrap();
        assert!(dune < solaris);
        assert!(html.contains("Similarity: 0.92"));
    }

    #[test]
    fn test_genre_stats() {
        let stats = GenreStats {
            total_books: 40,
            placeholders: 3,
            minimalistic: 12,
            overloaded: 8,
            faces: 9,
            avg_color_contrast: Some(41.256),
            avg_warm_cold_balance: None,
            monochrome_percentage: None,
            cache_info: "Recomputed statistics".to_string(),
            source: Some("fresh".to_string()),
            plot_base64: None,
        };
        let html = render_genre_stats(&stats);
        assert!(html.contains("<li>Balanced: 20</li>"));
        assert!(html.contains("<li>Average contrast: 41.26</li>"));
        assert!(html.contains("<li>Average warm/cold balance: 0.00</li>"));
        assert!(html.contains("Recomputed statistics"));
        assert!(!html.contains("stats-plot"));
    }
}
