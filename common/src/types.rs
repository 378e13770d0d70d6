//! 診断・専門家・商品の型定義
//!
//! CLIとWeb(WASM)で共有される型:
//! - DiagnosisResult / Recommendation: 予測APIの出力
//! - Expert: 専門家ディレクトリ
//! - Product: マーケットプレイス商品

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// 高信頼度とみなす閾値（%、境界を含む）
pub const HIGH_CONFIDENCE_THRESHOLD: f64 = 70.0;

/// 信頼度の区分
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceLevel {
    High,
    Low,
}

impl ConfidenceLevel {
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence >= HIGH_CONFIDENCE_THRESHOLD {
            ConfidenceLevel::High
        } else {
            ConfidenceLevel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceLevel::High => "high",
            ConfidenceLevel::Low => "low",
        }
    }
}

/// 予測1回分の結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosisResult {
    /// サーバー側の診断ID（返らない場合あり）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub disease: String,

    /// 0〜100（%）
    pub confidence: f64,

    /// サーバーが返した順序（関連度順）を保持
    #[serde(default)]
    pub recommendations: Vec<Recommendation>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl DiagnosisResult {
    /// 信頼度が [0,100] に収まっているか検証
    pub fn validate(&self) -> std::result::Result<(), String> {
        if !self.confidence.is_finite() || !(0.0..=100.0).contains(&self.confidence) {
            return Err(format!(
                "confidence out of range: {} (expected 0-100)",
                self.confidence
            ));
        }
        Ok(())
    }

    pub fn confidence_level(&self) -> ConfidenceLevel {
        ConfidenceLevel::from_confidence(self.confidence)
    }

    pub fn is_high_confidence(&self) -> bool {
        self.confidence_level() == ConfidenceLevel::High
    }

    /// フィードバック送信用ID
    ///
    /// サーバーIDが無い場合は結果JSONのSHA-256先頭16桁
    pub fn feedback_id(&self) -> String {
        if let Some(id) = self.id.as_deref().filter(|id| !id.trim().is_empty()) {
            return id.to_string();
        }
        let canonical = serde_json::to_string(self).unwrap_or_default();
        let digest = Sha256::digest(canonical.as_bytes());
        hex::encode(digest)[..16].to_string()
    }
}

/// 推奨対策の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationType {
    Treatment,
    Vaccine,
    Fertilizer,
    Pesticide,
}

impl RecommendationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationType::Treatment => "treatment",
            RecommendationType::Vaccine => "vaccine",
            RecommendationType::Fertilizer => "fertilizer",
            RecommendationType::Pesticide => "pesticide",
        }
    }
}

impl std::fmt::Display for RecommendationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 診断に紐づく推奨対策
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: RecommendationType,
    #[serde(default)]
    pub products: Vec<String>,
}

impl Recommendation {
    /// 表示用の商品一覧（初出順で重複除去）
    pub fn unique_products(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for product in &self.products {
            if !seen.contains(&product.as_str()) {
                seen.push(product.as_str());
            }
        }
        seen
    }
}

/// /recommendations/{diseaseId} の要素
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationItem {
    pub id: String,
    pub title: String,
    pub description: String,
}

/// 専門家（獣医・農学者など）
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Expert {
    pub id: String,
    pub name: String,
    pub specialty: String,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub whatsapp: Option<String>,
    /// 0〜5
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    /// 経験年数
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience: Option<u32>,
}

/// 連絡手段
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactAction {
    WhatsApp(String),
    Email(String),
    Phone(String),
}

impl ContactAction {
    /// リンクURL
    pub fn href(&self) -> &str {
        match self {
            ContactAction::WhatsApp(url) | ContactAction::Email(url) | ContactAction::Phone(url) => url,
        }
    }

    /// 翻訳キー
    pub fn label_key(&self) -> &'static str {
        match self {
            ContactAction::WhatsApp(_) => "experts.whatsapp",
            ContactAction::Email(_) => "experts.email",
            ContactAction::Phone(_) => "experts.call",
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl Expert {
    /// 利用可能な連絡手段（値の無いチャネルは省略）
    pub fn contact_actions(&self) -> Vec<ContactAction> {
        let mut actions = Vec::new();

        if let Some(number) = non_empty(&self.whatsapp) {
            let digits: String = number.chars().filter(|c| c.is_ascii_digit()).collect();
            if !digits.is_empty() {
                actions.push(ContactAction::WhatsApp(format!("https://wa.me/{}", digits)));
            }
        }
        if let Some(email) = non_empty(&self.email) {
            actions.push(ContactAction::Email(format!("mailto:{}", email)));
        }
        if let Some(phone) = non_empty(&self.phone) {
            actions.push(ContactAction::Phone(format!("tel:{}", phone)));
        }

        actions
    }

    pub fn has_contact(&self) -> bool {
        !self.contact_actions().is_empty()
    }

    pub fn star_count(&self) -> u8 {
        star_count(self.rating)
    }
}

/// 評価値を星の数（0〜5）に変換
pub fn star_count(rating: Option<f64>) -> u8 {
    match rating {
        Some(r) if r.is_finite() => r.floor().clamp(0.0, 5.0) as u8,
        _ => 0,
    }
}

/// マーケットプレイス商品
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    /// 絞り込み用カテゴリ（自由形式）
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
}

impl Product {
    pub fn formatted_price(&self) -> String {
        format_naira(self.price)
    }

    pub fn star_count(&self) -> u8 {
        star_count(self.rating)
    }
}

/// ナイラ表記（桁区切り付き）: 12000 → "₦12,000"
pub fn format_naira(amount: f64) -> String {
    let text = format!("{}", amount.abs());
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (text.as_str(), None),
    };

    let mut grouped = String::new();
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0.0 { "-" } else { "" };
    match frac_part {
        Some(f) => format!("{}₦{}.{}", sign, grouped, f),
        None => format!("{}₦{}", sign, grouped),
    }
}

/// 表示テーマ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl std::str::FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            _ => Err(format!("Unknown theme: {}. Use light or dark", s)),
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 既定の言語コード
pub const DEFAULT_LANGUAGE: &str = "en";

/// 対応言語（コード, 表示名）
pub const SUPPORTED_LANGUAGES: &[(&str, &str)] = &[
    ("en", "English"),
    ("yo", "Yorùbá"),
    ("ig", "Igbo"),
    ("ha", "Hausa"),
];

pub fn is_supported_language(code: &str) -> bool {
    SUPPORTED_LANGUAGES.iter().any(|(c, _)| *c == code)
}
