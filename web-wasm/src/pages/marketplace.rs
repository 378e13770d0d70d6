//! マーケットプレイスページ

use crate::app::use_app;
use crate::components::loader::{ErrorMessage, Loader};
use crate::components::product_card::ProductCard;
use farmaid_common::filter::{product_types, ALL};
use farmaid_common::{Product, ProductFilter, ProductFilters};
use leptos::prelude::*;
use leptos::task::spawn_local;

#[component]
pub fn MarketplacePage() -> impl IntoView {
    let app = use_app();
    let products = RwSignal::new(Vec::<Product>::new());
    let loading = RwSignal::new(true);
    let error = RwSignal::new(None::<String>);
    let kind = RwSignal::new(ALL.to_string());
    // 推奨商品から遷移した場合は検索語が入っている
    let query = app.market_query;

    let load = move || {
        loading.set(true);
        error.set(None);
        let client = app.client();
        spawn_local(async move {
            match client.get_products(&ProductFilters::default()).await {
                Ok(list) => {
                    let _ = products.try_set(list);
                }
                Err(e) => {
                    let _ = error.try_set(Some(e.to_string()));
                }
            }
            let _ = loading.try_set(false);
        });
    };
    load();

    let filtered = move || {
        let filter = ProductFilter {
            kind: Some(kind.get()),
            query: query.get(),
        };
        products.with(|list| filter.apply(list).into_iter().cloned().collect::<Vec<_>>())
    };

    let type_options = move || {
        products
            .with(|list| product_types(list))
            .into_iter()
            .map(|t| {
                let value = t.clone();
                view! { <option value=value>{t}</option> }
            })
            .collect_view()
    };

    view! {
        <section class="marketplace-page">
            <h2>{move || app.t("marketplace.title")}</h2>
            <p class="text-muted">{move || app.t("marketplace.subtitle")}</p>

            <div class="filters">
                <input
                    type="search"
                    placeholder=move || app.t("marketplace.search")
                    prop:value=move || query.get()
                    on:input=move |ev| query.set(event_target_value(&ev))
                />
                <select
                    prop:value=move || kind.get()
                    on:change=move |ev| kind.set(event_target_value(&ev))
                >
                    <option value=ALL>{move || app.t("marketplace.allTypes")}</option>
                    {type_options}
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
                    return view! { <p class="empty-state">{app.t("marketplace.noResults")}</p> }.into_any();
                }
                view! {
                    <div class="card-grid">
                        {list.into_iter().map(|product| view! { <ProductCard product=product /> }).collect_view()}
                    </div>
                }
                .into_any()
            }}
        </section>
    }
}
