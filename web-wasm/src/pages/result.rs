//! 診断結果ページ

use crate::app::{use_app, Page};
use crate::components::feedback_panel::FeedbackPanel;
use crate::components::loader::{ErrorMessage, Loader};
use crate::components::recommendation_list::{RecommendationItems, RecommendationList};
use crate::components::result_card::ResultCard;
use farmaid_common::RecommendationItem;
use leptos::prelude::*;
use leptos::task::spawn_local;

#[component]
pub fn ResultPage() -> impl IntoView {
    let app = use_app();
    let result = app.store.with_untracked(|s| s.state().diagnosis_result().cloned());
    let image = app.store.with_untracked(|s| s.state().uploaded_image().map(str::to_string));

    let Some(result) = result else {
        return view! {
            <section class="card empty-state">
                <p>{move || app.t("result.noResult")}</p>
                <button class="btn btn-primary" on:click=move |_| app.navigate(Page::Upload)>
                    {move || app.t("nav.upload")}
                </button>
            </section>
        }
        .into_any();
    };

    // 結果に推奨が含まれない場合は病害IDで取得する
    let fetched = RwSignal::new(Vec::<RecommendationItem>::new());
    let loading = RwSignal::new(false);
    let error = RwSignal::new(None::<String>);
    let disease_id = StoredValue::new(
        result
            .id
            .clone()
            .filter(|_| result.recommendations.is_empty()),
    );

    let load = move || {
        let Some(id) = disease_id.get_value() else {
            return;
        };
        loading.set(true);
        error.set(None);
        let client = app.client();
        spawn_local(async move {
            match client.get_recommendations(&id).await {
                Ok(items) => {
                    let _ = fetched.try_set(items);
                }
                Err(e) => {
                    let _ = error.try_set(Some(e.to_string()));
                }
            }
            let _ = loading.try_set(false);
        });
    };
    load();

    let image = image.or_else(|| result.image_url.clone());
    let feedback_id = result.feedback_id();
    let recommendations = result.recommendations.clone();
    let has_embedded = !recommendations.is_empty();

    view! {
        <section class="result-page">
            <h2>{move || app.t("result.title")}</h2>

            <ResultCard result=result image=image />

            {has_embedded.then(|| view! { <RecommendationList recommendations=recommendations /> })}
            {move || {
                if loading.get() {
                    return view! { <Loader /> }.into_any();
                }
                if let Some(message) = error.get() {
                    return view! {
                        <ErrorMessage message=message on_retry=Some(Callback::new(move |_| load())) />
                    }
                    .into_any();
                }
                let items = fetched.get();
                (!items.is_empty()).then(|| view! { <RecommendationItems items=items /> }).into_any()
            }}

            <div class="result-actions">
                <button class="btn btn-secondary" on:click=move |_| app.navigate(Page::Experts)>
                    {move || app.t("result.contactExpert")}
                </button>
                <button class="btn btn-tertiary" on:click=move |_| app.navigate(Page::Upload)>
                    {move || app.t("common.back")}
                </button>
            </div>

            <FeedbackPanel diagnosis_id=feedback_id />
        </section>
    }
    .into_any()
}
