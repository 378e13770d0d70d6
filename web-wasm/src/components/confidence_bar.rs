//! 信頼度バーコンポーネント

use farmaid_common::ConfidenceLevel;
use leptos::prelude::*;

#[component]
pub fn ConfidenceBar(confidence: f64) -> impl IntoView {
    let level = ConfidenceLevel::from_confidence(confidence);
    let width = confidence.clamp(0.0, 100.0);

    view! {
        <div class="progress-container">
            <div class="progress-bar">
                <div
                    class=format!("progress-fill confidence-{}", level.as_str())
                    style=format!("width: {}%", width)
                />
            </div>
            <p class="progress-text">{format!("{:.1}%", confidence)}</p>
        </div>
    }
}
