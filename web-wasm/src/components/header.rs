//! ヘッダー（ナビゲーション・言語・テーマ）

use crate::app::{use_app, Page};
use farmaid_common::{Theme, SUPPORTED_LANGUAGES};
use leptos::prelude::*;

#[component]
pub fn Header() -> impl IntoView {
    let app = use_app();

    let nav_items = Page::NAV
        .into_iter()
        .map(|page| {
            let is_active = move || {
                let current = app.page.get();
                current == page || (page == Page::Upload && current == Page::Result)
            };
            view! {
                <button
                    class="nav-link"
                    class:active=is_active
                    on:click=move |_| app.navigate(page)
                >
                    {move || app.t(page.nav_key())}
                </button>
            }
        })
        .collect_view();

    let language_options = SUPPORTED_LANGUAGES
        .iter()
        .map(|(code, name)| {
            let code = *code;
            view! {
                <option value=code selected=move || app.language() == code>
                    {*name}
                </option>
            }
        })
        .collect_view();

    let theme_icon = move || match app.store.with(|s| s.state().theme()) {
        Theme::Light => "🌙",
        Theme::Dark => "☀️",
    };

    view! {
        <header class="header">
            <button class="brand" on:click=move |_| app.navigate(Page::Home)>
                <span class="brand-icon">"🌱"</span>
                <h1>"FarmAid AI"</h1>
            </button>

            <nav class="nav">{nav_items}</nav>

            <div class="header-actions">
                <label class="sr-only" for="language">{move || app.t("nav.language")}</label>
                <select
                    id="language"
                    on:change=move |ev| app.set_language(event_target_value(&ev))
                >
                    {language_options}
                </select>
                <button
                    class="btn btn-icon"
                    title=move || app.t("nav.theme")
                    on:click=move |_| app.toggle_theme()
                >
                    {theme_icon}
                </button>
            </div>
        </header>
    }
}
