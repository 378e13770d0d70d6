//! 推奨対策リスト

use crate::app::{use_app, Page};
use farmaid_common::{Recommendation, RecommendationItem};
use leptos::prelude::*;

#[component]
pub fn RecommendationList(recommendations: Vec<Recommendation>) -> impl IntoView {
    let app = use_app();

    // 商品ボタン: マーケットプレイスで商品名検索
    let open_product = move |name: String| {
        app.market_query.set(name);
        app.navigate(Page::Marketplace);
    };

    let items = recommendations
        .into_iter()
        .map(|rec| {
            let type_key = format!("recommendationType.{}", rec.kind.as_str());
            let products = rec
                .unique_products()
                .into_iter()
                .map(|name| {
                    let name = name.to_string();
                    let label = name.clone();
                    view! {
                        <li class="product-chip">
                            <span>{label}</span>
                            <button
                                class="btn btn-primary btn-small"
                                on:click=move |_| open_product(name.clone())
                            >
                                {move || app.t("result.buyNow")}
                            </button>
                        </li>
                    }
                })
                .collect_view();

            view! {
                <li class=format!("recommendation recommendation-{}", rec.kind.as_str())>
                    <span class="badge">{move || app.t(&type_key)}</span>
                    <h4>{rec.title}</h4>
                    <p>{rec.description}</p>
                    <ul class="product-chips">{products}</ul>
                </li>
            }
        })
        .collect_view();

    view! {
        <section class="card">
            <h3>{move || app.t("result.recommendations")}</h3>
            <ul class="recommendations">{items}</ul>
        </section>
    }
}

/// 病害IDから取得した推奨（種類・商品なし）
#[component]
pub fn RecommendationItems(items: Vec<RecommendationItem>) -> impl IntoView {
    let app = use_app();
    let rows = items
        .into_iter()
        .map(|item| {
            view! {
                <li class="recommendation">
                    <h4>{item.title}</h4>
                    <p>{item.description}</p>
                </li>
            }
        })
        .collect_view();

    view! {
        <section class="card">
            <h3>{move || app.t("result.recommendations")}</h3>
            <ul class="recommendations">{rows}</ul>
        </section>
    }
}
