//! FarmAid AI Common Library
//!
//! CLIとWeb(WASM)で共有される型・API契約・状態ストア・翻訳

pub mod api;
pub mod error;
pub mod filter;
pub mod guard;
pub mod i18n;
pub mod image;
pub mod store;
pub mod types;

pub use api::{
    ClientConfig, Endpoint, Envelope, ExpertFilters, FeedbackRequest, FormPart, FormValue, Method,
    PredictRequest, ProductFilters,
};
pub use error::{ApiError, Error, Result};
pub use filter::{ExpertFilter, ProductFilter};
pub use guard::{InFlight, InFlightGuard};
pub use i18n::{t, Translator};
pub use image::ImageSource;
pub use store::{AppState, AppStore, KeyValueStorage, MemoryStorage};
pub use types::{
    ConfidenceLevel, ContactAction, DiagnosisResult, Expert, Product, Recommendation,
    RecommendationItem, RecommendationType, Theme, DEFAULT_LANGUAGE, HIGH_CONFIDENCE_THRESHOLD,
    SUPPORTED_LANGUAGES,
};
