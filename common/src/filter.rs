//! 一覧のクライアント側絞り込み
//!
//! 毎回フル一覧から再計算する（前回の絞り込み結果をさらに絞らない）。

use crate::types::{Expert, Product};

/// 「すべて」を表すセレクタ値
pub const ALL: &str = "all";

fn selector(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case(ALL))
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

/// 専門家の絞り込み条件（場所 AND 検索語）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpertFilter {
    pub location: Option<String>,
    pub query: String,
}

impl ExpertFilter {
    pub fn matches(&self, expert: &Expert) -> bool {
        if let Some(location) = selector(&self.location) {
            if expert.location != location {
                return false;
            }
        }
        let query = self.query.trim().to_lowercase();
        query.is_empty() || contains_ci(&expert.name, &query) || contains_ci(&expert.specialty, &query)
    }

    pub fn apply<'a>(&self, experts: &'a [Expert]) -> Vec<&'a Expert> {
        experts.iter().filter(|e| self.matches(e)).collect()
    }
}

/// 商品の絞り込み条件（種類 AND 検索語）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFilter {
    pub kind: Option<String>,
    pub query: String,
}

impl ProductFilter {
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(kind) = selector(&self.kind) {
            if product.kind != kind {
                return false;
            }
        }
        let query = self.query.trim().to_lowercase();
        query.is_empty()
            || contains_ci(&product.name, &query)
            || contains_ci(&product.description, &query)
    }

    pub fn apply<'a>(&self, products: &'a [Product]) -> Vec<&'a Product> {
        products.iter().filter(|p| self.matches(p)).collect()
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for value in values {
        if !value.is_empty() && !out.iter().any(|v| v == value) {
            out.push(value.to_string());
        }
    }
    out
}

/// 場所の選択肢（初出順）
pub fn expert_locations(experts: &[Expert]) -> Vec<String> {
    distinct(experts.iter().map(|e| e.location.as_str()))
}

/// 商品種類の選択肢（初出順）
pub fn product_types(products: &[Product]) -> Vec<String> {
    distinct(products.iter().map(|p| p.kind.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expert(id: &str, name: &str, specialty: &str, location: &str) -> Expert {
        Expert {
            id: id.to_string(),
            name: name.to_string(),
            specialty: specialty.to_string(),
            location: location.to_string(),
            ..Default::default()
        }
    }

    fn experts() -> Vec<Expert> {
        vec![
            expert("1", "Dr. Eze Chisom", "Veterinarian", "Lagos"),
            expert("2", "Prof. Adeyemi Okafor", "Crop Agronomist", "Ibadan"),
            expert("3", "Mama Zainab Ali", "Livestock Vet", "Kano"),
            expert("4", "Chief Kwame Asante", "Cooperative Manager", "Lagos"),
        ]
    }

    fn product(id: &str, name: &str, description: &str, kind: &str) -> Product {
        Product {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            price: 1000.0,
            kind: kind.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_location_and_search_intersect() {
        let all = experts();
        let filter = ExpertFilter {
            location: Some("Lagos".to_string()),
            query: "vet".to_string(),
        };
        let ids: Vec<&str> = filter.apply(&all).iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["1"]);
    }

    #[test]
    fn test_recomputed_from_full_list() {
        let all = experts();
        let mut filter = ExpertFilter {
            location: Some("Lagos".to_string()),
            query: String::new(),
        };
        assert_eq!(filter.apply(&all).len(), 2);

        // 場所を変えると前回の結果ではなく全件から再計算
        filter.location = Some("Kano".to_string());
        filter.query = "vet".to_string();
        let ids: Vec<&str> = filter.apply(&all).iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["3"]);

        filter.location = Some(ALL.to_string());
        assert_eq!(filter.apply(&all).len(), 2);
    }

    #[test]
    fn test_search_is_case_insensitive_over_name_and_specialty() {
        let all = experts();
        let filter = ExpertFilter {
            location: None,
            query: "  AGRONOMIST ".to_string(),
        };
        assert_eq!(filter.apply(&all).len(), 1);

        let filter = ExpertFilter {
            location: None,
            query: "zainab".to_string(),
        };
        assert_eq!(filter.apply(&all)[0].id, "3");
    }

    #[test]
    fn test_empty_filter_keeps_everything() {
        let all = experts();
        assert_eq!(ExpertFilter::default().apply(&all).len(), all.len());
    }

    #[test]
    fn test_product_filter() {
        let products = vec![
            product("1", "Fungicide Spray", "Treats crop diseases", "fungicide"),
            product("2", "Disease Prevention Kit", "Complete kit", "prevention"),
            product("3", "Soil Nutrient Mix", "Strengthens plant immunity", "fertilizer"),
        ];

        let filter = ProductFilter {
            kind: None,
            query: "disease".to_string(),
        };
        assert_eq!(filter.apply(&products).len(), 2);

        let filter = ProductFilter {
            kind: Some("fungicide".to_string()),
            query: "disease".to_string(),
        };
        let ids: Vec<&str> = filter.apply(&products).iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["1"]);
    }

    #[test]
    fn test_distinct_options_first_seen_order() {
        assert_eq!(expert_locations(&experts()), vec!["Lagos", "Ibadan", "Kano"]);

        let products = vec![
            product("1", "a", "", "pesticide"),
            product("2", "b", "", "fertilizer"),
            product("3", "c", "", "pesticide"),
        ];
        assert_eq!(product_types(&products), vec!["pesticide", "fertilizer"]);
    }
}
