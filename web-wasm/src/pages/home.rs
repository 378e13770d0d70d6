//! トップページ

use crate::app::{use_app, Page};
use leptos::prelude::*;
use leptos::task::spawn_local;

#[component]
pub fn HomePage() -> impl IntoView {
    let app = use_app();
    let healthy = RwSignal::new(None::<bool>);

    let client = app.client();
    spawn_local(async move {
        let _ = healthy.try_set(Some(client.health_check().await));
    });

    let steps = [
        ("📷", "home.step1", "home.step1Desc"),
        ("🔬", "home.step2", "home.step2Desc"),
        ("🌾", "home.step3", "home.step3Desc"),
    ]
    .into_iter()
    .map(|(icon, title, desc)| {
        view! {
            <li class="card step">
                <div class="step-icon">{icon}</div>
                <h3>{move || app.t(title)}</h3>
                <p>{move || app.t(desc)}</p>
            </li>
        }
    })
    .collect_view();

    view! {
        <section class="hero">
            <h2>{move || app.t("home.title")}</h2>
            <p class="text-muted">{move || app.t("home.subtitle")}</p>
            <button class="btn btn-primary btn-large" on:click=move |_| app.navigate(Page::Upload)>
                {move || app.t("home.cta")}
            </button>
            {move || healthy.get().map(|ok| {
                let (class, key) = if ok {
                    ("status status-ok", "common.healthy")
                } else {
                    ("status status-down", "common.unhealthy")
                };
                view! { <p class=class>{app.t(key)}</p> }
            })}
        </section>

        <section>
            <h3>{move || app.t("home.howItWorks")}</h3>
            <ol class="steps">{steps}</ol>
        </section>
    }
}
