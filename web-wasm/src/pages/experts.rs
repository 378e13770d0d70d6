//! 専門家一覧ページ

use crate::app::use_app;
use crate::components::expert_card::ExpertCard;
use crate::components::loader::{ErrorMessage, Loader};
use farmaid_common::filter::{expert_locations, ALL};
use farmaid_common::{Expert, ExpertFilter, ExpertFilters};
use leptos::prelude::*;
use leptos::task::spawn_local;

#[component]
pub fn ExpertsPage() -> impl IntoView {
    let app = use_app();
    let experts = RwSignal::new(Vec::<Expert>::new());
    let loading = RwSignal::new(true);
    let error = RwSignal::new(None::<String>);
    let location = RwSignal::new(ALL.to_string());
    let query = RwSignal::new(String::new());

    let load = move || {
        loading.set(true);
        error.set(None);
        let client = app.client();
        spawn_local(async move {
            match client.get_experts(&ExpertFilters::default()).await {
                Ok(list) => {
                    let _ = experts.try_set(list);
                }
                Err(e) => {
                    let _ = error.try_set(Some(e.to_string()));
                }
            }
            let _ = loading.try_set(false);
        });
    };
    load();

    // 全件から毎回絞り込み
    let filtered = move || {
        let filter = ExpertFilter {
            location: Some(location.get()),
            query: query.get(),
        };
        experts.with(|list| filter.apply(list).into_iter().cloned().collect::<Vec<_>>())
    };

    let location_options = move || {
        experts.with(|list| expert_locations(list))
            .into_iter()
            .map(|loc| {
                let value = loc.clone();
                view! { <option value=value>{loc}</option> }
            })
            .collect_view()
    };

    view! {
        <section class="experts-page">
            <h2>{move || app.t("experts.title")}</h2>
            <p class="text-muted">{move || app.t("experts.subtitle")}</p>

            <div class="filters">
                <input
                    type="search"
                    placeholder=move || app.t("experts.search")
                    prop:value=move || query.get()
                    on:input=move |ev| query.set(event_target_value(&ev))
                />
                <select
                    prop:value=move || location.get()
                    on:change=move |ev| location.set(event_target_value(&ev))
                >
                    <option value=ALL>{move || app.t("experts.allLocations")}</option>
                    {location_options}
                </select>
            </div>

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
                let list = filtered();
                if list.is_empty() {
                    return view! { <p class="empty-state">{app.t("experts.noResults")}</p> }.into_any();
                }
                view! {
                    <div class="card-grid">
                        {list.into_iter().map(|expert| view! { <ExpertCard expert=expert /> }).collect_view()}
                    </div>
                }
                .into_any()
            }}
        </section>
    }
}
