//! 専門家カード

use crate::app::use_app;
use farmaid_common::{ContactAction, Expert};
use leptos::prelude::*;

pub fn stars(count: u8) -> String {
    let count = usize::from(count.min(5));
    format!("{}{}", "★".repeat(count), "☆".repeat(5 - count))
}

#[component]
pub fn ExpertCard(expert: Expert) -> impl IntoView {
    let app = use_app();
    let actions = expert.contact_actions();
    let has_contact = !actions.is_empty();
    let rating = expert.rating.map(|_| stars(expert.star_count()));

    let buttons = actions
        .into_iter()
        .map(|action| {
            let class = match action {
                ContactAction::WhatsApp(_) => "btn btn-whatsapp",
                ContactAction::Email(_) => "btn btn-secondary",
                ContactAction::Phone(_) => "btn btn-tertiary",
            };
            let key = action.label_key();
            view! {
                <a class=class href=action.href().to_string() target="_blank" rel="noopener noreferrer">
                    {move || app.t(key)}
                </a>
            }
        })
        .collect_view();

    view! {
        <article class="card expert-card">
            <h3>{expert.name}</h3>
            <p class="specialty">{expert.specialty}</p>
            <p class="text-muted">"📍 " {expert.location}</p>

            {rating.map(|text| view! {
                <p class="rating" title=move || app.t("experts.rating")>{text}</p>
            })}
            {expert.experience.map(|years| view! {
                <p class="text-muted">{move || app.t("experts.experience")} ": " {years}</p>
            })}

            <div class="contact-actions">
                {buttons}
                {(!has_contact).then(|| view! {
                    <p class="text-muted">{move || app.t("experts.noContact")}</p>
                })}
            </div>
        </article>
    }
}
