//! メインアプリケーションコンポーネント

use crate::api::ApiClient;
use crate::components::header::Header;
use crate::pages::{
    experts::ExpertsPage, home::HomePage, marketplace::MarketplacePage, result::ResultPage,
    upload::UploadPage,
};
use crate::storage::BrowserStorage;
use farmaid_common::api::DEFAULT_BASE_URL;
use farmaid_common::{t, AppStore, ClientConfig};
use leptos::prelude::*;

/// ビルド時に埋め込むAPIのベースURL
const API_URL: Option<&str> = option_env!("FARMAID_API_URL");

/// 表示中のページ
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Page {
    #[default]
    Home,
    Upload,
    Result,
    Experts,
    Marketplace,
}

impl Page {
    pub const NAV: [Page; 4] = [Page::Home, Page::Upload, Page::Marketplace, Page::Experts];

    pub fn nav_key(&self) -> &'static str {
        match self {
            Page::Home => "nav.home",
            Page::Upload | Page::Result => "nav.upload",
            Page::Experts => "nav.experts",
            Page::Marketplace => "nav.marketplace",
        }
    }
}

/// コンポーネント間で共有する状態
#[derive(Clone, Copy)]
pub struct AppContext {
    pub store: RwSignal<AppStore<BrowserStorage>>,
    pub page: RwSignal<Page>,
    /// マーケットプレイスの検索語（推奨商品から遷移するときに設定）
    pub market_query: RwSignal<String>,
    pub client: StoredValue<ApiClient>,
}

impl AppContext {
    fn new() -> Self {
        let config = ClientConfig {
            base_url: API_URL.unwrap_or(DEFAULT_BASE_URL).to_string(),
            ..ClientConfig::default()
        };

        Self {
            store: RwSignal::new(AppStore::load(BrowserStorage)),
            page: RwSignal::new(Page::Home),
            market_query: RwSignal::new(String::new()),
            client: StoredValue::new(ApiClient::new(config)),
        }
    }

    pub fn language(&self) -> String {
        self.store.with(|s| s.state().language().to_string())
    }

    /// 現在の言語で翻訳（言語変更に追従する）
    pub fn t(&self, key: &str) -> String {
        self.store.with(|s| t(s.state().language(), key))
    }

    pub fn navigate(&self, page: Page) {
        self.page.set(page);
    }

    pub fn client(&self) -> ApiClient {
        self.client.get_value()
    }

    /// 言語の変更（保存失敗はログのみ）
    pub fn set_language(&self, language: String) {
        self.store.update(|s| {
            if let Err(e) = s.set_language(language) {
                gloo::console::warn!("failed to persist language:", e.to_string());
            }
        });
    }

    pub fn toggle_theme(&self) {
        self.store.update(|s| {
            let theme = s.state().theme().toggled();
            if let Err(e) = s.set_theme(theme) {
                gloo::console::warn!("failed to persist theme:", e.to_string());
            }
        });
    }
}

pub fn use_app() -> AppContext {
    expect_context::<AppContext>()
}

/// メインアプリケーションコンポーネント
#[component]
pub fn App() -> impl IntoView {
    let app = AppContext::new();
    provide_context(app);

    let theme_class = move || {
        let theme = app.store.with(|s| s.state().theme());
        format!("app theme-{}", theme.as_str())
    };

    view! {
        <div class=theme_class>
            <Header />

            <main class="container">
                {move || match app.page.get() {
                    Page::Home => view! { <HomePage /> }.into_any(),
                    Page::Upload => view! { <UploadPage /> }.into_any(),
                    Page::Result => view! { <ResultPage /> }.into_any(),
                    Page::Experts => view! { <ExpertsPage /> }.into_any(),
                    Page::Marketplace => view! { <MarketplacePage /> }.into_any(),
                }}
            </main>
        </div>
    }
}
