//! 商品カード

use crate::app::use_app;
use crate::components::expert_card::stars;
use farmaid_common::Product;
use leptos::prelude::*;

#[component]
pub fn ProductCard(product: Product) -> impl IntoView {
    let app = use_app();
    let price = product.formatted_price();
    let rating = product.rating.map(|_| stars(product.star_count()));

    view! {
        <article class="card product-card">
            {product.image.map(|src| view! { <img class="product-image" src=src alt="" /> })}
            <span class="badge">{product.kind}</span>
            <h3>{product.name}</h3>
            <p>{product.description}</p>
            {product.vendor.map(|vendor| view! {
                <p class="text-muted">{move || app.t("marketplace.vendor")} ": " {vendor}</p>
            })}
            {rating.map(|text| view! { <p class="rating">{text}</p> })}
            <div class="product-footer">
                <span class="price">{price}</span>
                <button class="btn btn-primary">{move || app.t("marketplace.buy")}</button>
            </div>
        </article>
    }
}
