//! 翻訳テーブル
//!
//! "home.title" のようなドット区切りキーを言語ごとのテーブルから解決する。
//! 見つからない場合はキーそのものを返す（未翻訳が画面上で分かるように）。

use crate::error::Result;
use crate::types::DEFAULT_LANGUAGE;
use serde_json::Value;
use std::sync::OnceLock;

const BUNDLED_TRANSLATIONS: &str = include_str!("../locales/translations.json");

/// 言語コード → ネストしたテーブル
#[derive(Debug, Clone)]
pub struct Translator {
    catalog: Value,
}

impl Translator {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(Self {
            catalog: serde_json::from_str(json)?,
        })
    }

    /// 同梱テーブル（初回のみパース）
    pub fn bundled() -> &'static Translator {
        static BUNDLED: OnceLock<Translator> = OnceLock::new();
        BUNDLED.get_or_init(|| {
            Translator::from_json(BUNDLED_TRANSLATIONS).unwrap_or(Translator {
                catalog: Value::Object(Default::default()),
            })
        })
    }

    pub fn has_language(&self, language: &str) -> bool {
        self.catalog.get(language).is_some_and(Value::is_object)
    }

    /// キーを解決する
    ///
    /// 言語テーブルが無ければ既定言語のテーブルを使う。
    /// 途中のセグメントが無い・最終値が文字列でない場合はキーを返す。
    pub fn translate(&self, language: &str, key: &str) -> String {
        let table = match self.catalog.get(language) {
            Some(table) => table,
            None => match self.catalog.get(DEFAULT_LANGUAGE) {
                Some(table) => table,
                None => return key.to_string(),
            },
        };

        let mut value = table;
        for segment in key.split('.') {
            match value.get(segment) {
                Some(next) => value = next,
                None => return key.to_string(),
            }
        }

        match value.as_str() {
            Some(s) => s.to_string(),
            None => key.to_string(),
        }
    }

    /// 既定言語にあって指定言語に無い末端キー
    pub fn missing_keys(&self, language: &str) -> Vec<String> {
        let Some(default_table) = self.catalog.get(DEFAULT_LANGUAGE) else {
            return Vec::new();
        };

        let mut keys = Vec::new();
        collect_leaf_keys(default_table, "", &mut keys);

        let Some(table) = self.catalog.get(language) else {
            return keys;
        };

        keys.into_iter()
            .filter(|key| lookup(table, key).and_then(Value::as_str).is_none())
            .collect()
    }
}

fn lookup<'a>(table: &'a Value, key: &str) -> Option<&'a Value> {
    key.split('.').try_fold(table, |value, segment| value.get(segment))
}

fn collect_leaf_keys(value: &Value, prefix: &str, out: &mut Vec<String>) {
    if let Some(map) = value.as_object() {
        for (k, v) in map {
            let path = if prefix.is_empty() {
                k.clone()
            } else {
                format!("{}.{}", prefix, k)
            };
            if v.is_object() {
                collect_leaf_keys(v, &path, out);
            } else {
                out.push(path);
            }
        }
    }
}

/// 同梱テーブルで翻訳
pub fn t(language: &str, key: &str) -> String {
    Translator::bundled().translate(language, key)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Translator {
        Translator::from_json(
            r#"{
                "en": {"home": {"title": "Welcome", "nested": {"deep": "Deep"}}, "a": {"x": "X"}},
                "yo": {"home": {"title": "Ẹ káàbọ̀"}, "a": {"b": 5}}
            }"#,
        )
        .expect("テーブル不正")
    }

    #[test]
    fn test_translate_active_language() {
        let tr = sample();
        assert_eq!(tr.translate("yo", "home.title"), "Ẹ káàbọ̀");
        assert_eq!(tr.translate("en", "home.nested.deep"), "Deep");
    }

    #[test]
    fn test_missing_segment_returns_key() {
        let tr = sample();
        assert_eq!(tr.translate("en", "a.b.c"), "a.b.c");
        assert_eq!(tr.translate("en", "nope"), "nope");
    }

    #[test]
    fn test_active_language_missing_key_does_not_fall_back_per_key() {
        // 言語テーブルが存在する場合、キー単位では既定言語に落とさない
        let tr = sample();
        assert_eq!(tr.translate("yo", "home.nested.deep"), "home.nested.deep");
    }

    #[test]
    fn test_non_string_value_returns_key() {
        let tr = sample();
        assert_eq!(tr.translate("yo", "a.b"), "a.b");
        assert_eq!(tr.translate("en", "home"), "home");
        // 文字列の下はたどらない
        assert_eq!(tr.translate("en", "home.title.more"), "home.title.more");
    }

    #[test]
    fn test_unknown_language_uses_default_table() {
        let tr = sample();
        assert_eq!(tr.translate("fr", "home.title"), "Welcome");
    }

    #[test]
    fn test_missing_keys() {
        let tr = sample();
        let mut missing = tr.missing_keys("yo");
        missing.sort();
        assert_eq!(missing, vec!["a.x".to_string(), "home.nested.deep".to_string()]);
        assert!(tr.missing_keys("en").is_empty());
        assert_eq!(tr.missing_keys("fr").len(), 3);
    }

    #[test]
    fn test_bundled_languages_complete() {
        let tr = Translator::bundled();
        for (code, _) in crate::SUPPORTED_LANGUAGES {
            assert!(tr.has_language(code), "言語テーブルなし: {}", code);
            assert!(tr.missing_keys(code).is_empty(), "未翻訳キー({}): {:?}", code, tr.missing_keys(code));
        }
    }

    #[test]
    fn test_bundled_lookup() {
        assert_eq!(t("en", "nav.home"), "Home");
        assert_eq!(t("ha", "result.yes"), "Ee");
        assert_eq!(t("en", "result.unknownKey"), "result.unknownKey");
    }
}
