//! 端末表示とJSONレポート出力

use crate::error::Result;
use farmaid_common::{t, DiagnosisResult, Expert, Product, RecommendationItem};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::Path;

const BAR_WIDTH: usize = 20;

/// 1画像分の診断記録
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosisReport {
    pub source: String,
    pub language: String,
    pub analyzed_at: String,
    pub result: DiagnosisResult,
}

impl DiagnosisReport {
    pub fn new(source: impl Into<String>, language: impl Into<String>, result: DiagnosisResult) -> Self {
        Self {
            source: source.into(),
            language: language.into(),
            analyzed_at: chrono::Local::now().to_rfc3339(),
            result,
        }
    }
}

pub fn write_reports(path: &Path, reports: &[DiagnosisReport]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(reports)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// 信頼度バー（例: ███████░░░）
pub fn confidence_bar(confidence: f64, width: usize) -> String {
    let ratio = (confidence / 100.0).clamp(0.0, 1.0);
    let filled = (ratio * width as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

pub fn stars(count: u8) -> String {
    let count = count.min(5) as usize;
    format!("{}{}", "★".repeat(count), "☆".repeat(5 - count))
}

pub fn render_diagnosis(result: &DiagnosisResult, language: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "🩺 {}", t(language, "result.title"));
    let _ = writeln!(out, "  {}: {}", t(language, "result.disease"), result.disease);

    let level_key = if result.is_high_confidence() {
        "result.highConfidence"
    } else {
        "result.lowConfidence"
    };
    let _ = writeln!(
        out,
        "  {}: {} {:.1}%",
        t(language, "result.confidence"),
        confidence_bar(result.confidence, BAR_WIDTH),
        result.confidence
    );
    let marker = if result.is_high_confidence() { "✔" } else { "⚠" };
    let _ = writeln!(out, "  {} {}", marker, t(language, level_key));

    if !result.recommendations.is_empty() {
        let _ = writeln!(out, "\n💊 {}", t(language, "result.recommendations"));
        for rec in &result.recommendations {
            let type_label = t(language, &format!("recommendationType.{}", rec.kind.as_str()));
            let _ = writeln!(out, "  [{}] {}", type_label, rec.title);
            let _ = writeln!(out, "      {}", rec.description);

            let products = rec.unique_products();
            if !products.is_empty() {
                let _ = writeln!(out, "      {}: {}", t(language, "result.products"), products.join(", "));
            }
        }
    }

    out
}

pub fn render_recommendation_items(items: &[RecommendationItem], language: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "💊 {}", t(language, "result.recommendations"));
    for item in items {
        let _ = writeln!(out, "  - {}: {}", item.title, item.description);
    }
    out
}

pub fn render_experts(experts: &[&Expert], language: &str) -> String {
    if experts.is_empty() {
        return format!("{}\n", t(language, "experts.noResults"));
    }

    let mut out = String::new();
    for expert in experts {
        let _ = writeln!(out, "👤 {} ({}) - {}", expert.name, expert.specialty, expert.location);
        if expert.rating.is_some() {
            let _ = writeln!(out, "   {}: {}", t(language, "experts.rating"), stars(expert.star_count()));
        }
        if let Some(years) = expert.experience {
            let _ = writeln!(out, "   {}: {}", t(language, "experts.experience"), years);
        }

        let actions = expert.contact_actions();
        if actions.is_empty() {
            let _ = writeln!(out, "   {}", t(language, "experts.noContact"));
        }
        for action in actions {
            let _ = writeln!(out, "   {}: {}", t(language, action.label_key()), action.href());
        }
    }
    out
}

pub fn render_products(products: &[&Product], language: &str) -> String {
    if products.is_empty() {
        return format!("{}\n", t(language, "marketplace.noResults"));
    }

    let mut out = String::new();
    for product in products {
        let _ = writeln!(out, "🛒 {} [{}] {}", product.name, product.kind, product.formatted_price());
        let _ = writeln!(out, "   {}", product.description);
        if let Some(vendor) = &product.vendor {
            let _ = writeln!(out, "   {}: {}", t(language, "marketplace.vendor"), vendor);
        }
        if product.rating.is_some() {
            let _ = writeln!(out, "   {}", stars(product.star_count()));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use farmaid_common::{Recommendation, RecommendationType};
    use tempfile::tempdir;

    fn sample_result(confidence: f64) -> DiagnosisResult {
        DiagnosisResult {
            id: Some("d1".to_string()),
            disease: "Cassava Mosaic".to_string(),
            confidence,
            recommendations: vec![Recommendation {
                id: "r1".to_string(),
                title: "Remove infected plants".to_string(),
                description: "Uproot and burn".to_string(),
                kind: RecommendationType::Treatment,
                products: vec!["Neem oil".to_string(), "Neem oil".to_string(), "Gloves".to_string()],
            }],
            image_url: None,
        }
    }

    #[test]
    fn test_confidence_bar() {
        assert_eq!(confidence_bar(0.0, 10), "░░░░░░░░░░");
        assert_eq!(confidence_bar(50.0, 10), "█████░░░░░");
        assert_eq!(confidence_bar(100.0, 10), "██████████");
        assert_eq!(confidence_bar(250.0, 4), "████");
    }

    #[test]
    fn test_stars() {
        assert_eq!(stars(3), "★★★☆☆");
        assert_eq!(stars(9), "★★★★★");
    }

    #[test]
    fn test_render_diagnosis_high_confidence() {
        let text = render_diagnosis(&sample_result(70.0), "en");
        assert!(text.contains("Cassava Mosaic"));
        assert!(text.contains("High confidence"));
        assert!(text.contains("[Treatment] Remove infected plants"));
        assert!(text.contains("Products: Neem oil, Gloves"));
    }

    #[test]
    fn test_render_diagnosis_low_confidence() {
        let text = render_diagnosis(&sample_result(69.9), "en");
        assert!(text.contains("Low confidence"));
    }

    #[test]
    fn test_render_empty_lists() {
        assert_eq!(render_experts(&[], "en"), "No experts match your search\n");
        assert_eq!(render_products(&[], "en"), "No products match your search\n");
    }

    #[test]
    fn test_render_expert_contacts() {
        let expert = Expert {
            id: "1".to_string(),
            name: "Dr. Ada".to_string(),
            specialty: "Veterinary".to_string(),
            location: "Lagos".to_string(),
            whatsapp: Some("+234 801 234 5678".to_string()),
            rating: Some(4.6),
            ..Default::default()
        };
        let text = render_experts(&[&expert], "en");
        assert!(text.contains("WhatsApp: https://wa.me/2348012345678"));
        assert!(text.contains("★★★★☆"));
    }

    #[test]
    fn test_write_reports() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("out").join("report.json");
        let report = DiagnosisReport::new("leaf.jpg", "en", sample_result(88.0));

        write_reports(&path, &[report]).expect("保存失敗");

        let content = std::fs::read_to_string(&path).expect("読込失敗");
        assert!(content.contains("\"analyzedAt\""));
        let loaded: Vec<DiagnosisReport> = serde_json::from_str(&content).expect("解析失敗");
        assert_eq!(loaded[0].result.disease, "Cassava Mosaic");
    }
}
