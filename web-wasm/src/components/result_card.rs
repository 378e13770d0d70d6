//! 診断結果カード

use crate::app::use_app;
use crate::components::confidence_bar::ConfidenceBar;
use farmaid_common::DiagnosisResult;
use leptos::prelude::*;

#[component]
pub fn ResultCard(result: DiagnosisResult, #[prop(optional_no_strip)] image: Option<String>) -> impl IntoView {
    let app = use_app();
    let high = result.is_high_confidence();
    let level_key = if high { "result.highConfidence" } else { "result.lowConfidence" };

    view! {
        <section class="card result-card">
            {image.map(|src| view! { <img class="result-image" src=src alt="" /> })}

            <div class="result-body">
                <p class="text-muted">{move || app.t("result.disease")}</p>
                <h2 class="disease-name">{result.disease.clone()}</h2>

                <p class="text-muted">{move || app.t("result.confidence")}</p>
                <ConfidenceBar confidence=result.confidence />

                <p class=if high { "badge badge-success" } else { "badge badge-warning" }>
                    {move || app.t(level_key)}
                </p>
            </div>
        </section>
    }
}
