//! 読み込み中表示

use crate::app::use_app;
use leptos::prelude::*;

#[component]
pub fn Loader(#[prop(default = "common.loading")] key: &'static str) -> impl IntoView {
    let app = use_app();
    view! {
        <div class="loader" role="status">
            <div class="spinner" />
            <p>{move || app.t(key)}</p>
        </div>
    }
}

/// エラー表示（再試行ボタン付き）
#[component]
pub fn ErrorMessage(
    #[prop(into)] message: String,
    #[prop(optional_no_strip)] on_retry: Option<Callback<()>>,
) -> impl IntoView {
    let app = use_app();
    view! {
        <div class="alert alert-error">
            <p>{message}</p>
            {on_retry.map(|retry| view! {
                <button class="btn btn-secondary btn-small" on:click=move |_| retry.run(())>
                    {move || app.t("common.retry")}
                </button>
            })}
        </div>
    }
}
