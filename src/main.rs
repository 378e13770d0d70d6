use clap::Parser;
use dialoguer::{Confirm, Select};
use farmaid_ai::{cli, client, config, error, report, scanner, storage};
use cli::{Cli, Commands, ExpertArgs, ProductArgs};
use client::ApiClient;
use config::Config;
use error::{FarmaidError, Result};
use farmaid_common::filter::{expert_locations, product_types};
use farmaid_common::i18n::Translator;
use farmaid_common::store::AUTH_TOKEN_KEY;
use farmaid_common::types::is_supported_language;
use farmaid_common::{
    t, AppStore, ExpertFilter, ExpertFilters, KeyValueStorage, PredictRequest, ProductFilter,
    ProductFilters, SUPPORTED_LANGUAGES,
};
use indicatif::{ProgressBar, ProgressStyle};
use report::DiagnosisReport;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use storage::FileStorage;

/// ログレベルを上書きする環境変数
const LOG_ENV: &str = "FARMAID_LOG";

type CliStore = AppStore<Arc<FileStorage>>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;
    run(cli).await?;
    Ok(())
}

fn init_tracing(verbose: bool) -> anyhow::Result<()> {
    let level = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load()?;
    if let Some(url) = cli.api_url.clone() {
        config.set_base_url(url)?;
    }

    let storage = Arc::new(FileStorage::in_dir(&Config::config_dir()?));
    let mut store = AppStore::load(storage.clone());
    let language = store.state().language().to_string();

    match cli.command {
        Commands::Diagnose { path, language: lang, output, ask_feedback } => {
            let lang = lang.unwrap_or(language);
            if !is_supported_language(&lang) {
                println!("⚠ 未対応の言語コードです: {}（英語で表示します）", lang);
            }
            let client = ApiClient::new(config.client.clone(), storage)?;
            diagnose(&client, &mut store, &config, &path, &lang, output.as_deref(), ask_feedback).await?;
        }

        Commands::Recommendations { disease_id } => {
            let client = ApiClient::new(config.client.clone(), storage)?;
            let items = with_spinner(&t(&language, "common.loading"), client.get_recommendations(&disease_id)).await?;
            print!("{}", report::render_recommendation_items(&items, &language));
        }

        Commands::Experts(args) => {
            let client = ApiClient::new(config.client.clone(), storage)?;
            list_experts(&client, &args, &language).await?;
        }

        Commands::Products(args) => {
            let client = ApiClient::new(config.client.clone(), storage)?;
            list_products(&client, &args, &language).await?;
        }

        Commands::Feedback { diagnosis_id, helpful, not_helpful: _, notes } => {
            let client = ApiClient::new(config.client.clone(), storage)?;
            let accepted = client.submit_feedback(&diagnosis_id, helpful, notes).await?;
            if accepted {
                println!("✔ {}", t(&language, "result.thankYou"));
            } else {
                println!("⚠ フィードバックは受理されませんでした");
            }
        }

        Commands::Health => {
            let client = ApiClient::new(config.client.clone(), storage)?;
            if client.health_check().await {
                println!("✅ {} ({})", t(&language, "common.healthy"), config.client.base_url);
            } else {
                println!("❌ {} ({})", t(&language, "common.unhealthy"), config.client.base_url);
                std::process::exit(1);
            }
        }

        Commands::Language { code } => {
            let code = match code {
                Some(code) => code,
                None => select_language(&language)?,
            };
            if !is_supported_language(&code) {
                return Err(FarmaidError::Config(format!(
                    "未対応の言語コード: {}（{}）",
                    code,
                    SUPPORTED_LANGUAGES.iter().map(|(c, _)| *c).collect::<Vec<_>>().join("/")
                )));
            }
            store.set_language(code.as_str())?;
            println!("✔ {}: {}", t(&code, "nav.language"), code);
        }

        Commands::Theme { theme } => {
            store.set_theme(theme)?;
            println!("✔ {}: {}", t(&language, "nav.theme"), theme);
        }

        Commands::Config { show, set_base_url, set_timeout_ms, set_token, clear_token } => {
            let mut saved = Config::load_from(&Config::config_path()?)?;
            let mut changed = false;

            if let Some(url) = set_base_url {
                saved.set_base_url(url)?;
                changed = true;
                println!("✔ ベースURLを設定しました");
            }
            if let Some(ms) = set_timeout_ms {
                saved.set_timeout_ms(ms)?;
                changed = true;
                println!("✔ タイムアウトを設定しました");
            }
            if changed {
                saved.save()?;
            }

            if let Some(token) = set_token {
                storage.set_item(AUTH_TOKEN_KEY, token.trim())?;
                println!("✔ 認証トークンを保存しました");
            }
            if clear_token {
                storage.remove_item(AUTH_TOKEN_KEY)?;
                println!("✔ 認証トークンを削除しました");
            }

            if show {
                let state = store.state();
                let token = farmaid_common::store::read_auth_token(&*storage);
                println!("設定:");
                println!("  ベースURL: {}", config.client.base_url);
                println!("  タイムアウト: {}ms", config.client.timeout_ms);
                println!("  最大画像サイズ: {}px", config.max_image_size);
                println!("  言語: {}", state.language());
                println!("  テーマ: {}", state.theme());
                println!("  認証トークン: {}", if token.is_some() { "設定済み" } else { "未設定" });
            }
        }

        Commands::Locales { check } => {
            let translator = Translator::bundled();
            let mut incomplete = Vec::new();
            for (code, name) in SUPPORTED_LANGUAGES {
                let missing = translator.missing_keys(code);
                if missing.is_empty() {
                    println!("✔ {} ({})", code, name);
                } else {
                    println!("⚠ {} ({}): {}件の欠落", code, name, missing.len());
                    for key in &missing {
                        println!("    - {}", key);
                    }
                    incomplete.push(*code);
                }
            }
            if check && !incomplete.is_empty() {
                return Err(FarmaidError::Config(format!(
                    "翻訳が不完全な言語があります: {}",
                    incomplete.join(", ")
                )));
            }
        }
    }

    Ok(())
}

async fn diagnose(
    client: &ApiClient,
    store: &mut CliStore,
    config: &Config,
    path: &Path,
    language: &str,
    output: Option<&Path>,
    ask_feedback: bool,
) -> Result<()> {
    println!("🌱 farmaid - 病害診断\n");

    let inputs = scanner::collect_inputs(path)?;
    let total = inputs.len();
    println!("✔ {}枚の画像を検出\n", total);

    let mut reports = Vec::new();
    let mut last_error = None;

    for (index, input) in inputs.iter().enumerate() {
        println!("[{}/{}] {}", index + 1, total, input.display());

        let source = match scanner::prepare_upload(input, config.max_image_size) {
            Ok(source) => source,
            Err(e) => {
                println!("❌ {}\n", e);
                last_error = Some(e);
                continue;
            }
        };

        store.set_uploaded_image(input.display().to_string());
        store.begin_diagnosis();

        let request = PredictRequest::new(source).with_language(language);
        let outcome = with_spinner(&t(language, "upload.analyzing"), client.predict(request)).await;
        store.finish_diagnosis(outcome.clone());

        match outcome {
            Ok(result) => {
                println!("{}", report::render_diagnosis(&result, language));
                if ask_feedback {
                    send_feedback(client, &result.feedback_id(), language).await;
                }
                reports.push(DiagnosisReport::new(input.display().to_string(), language, result));
            }
            Err(e) => {
                println!("❌ {}\n", e);
                last_error = Some(e.into());
            }
        }
    }

    if let Some(output) = output {
        report::write_reports(output, &reports)?;
        println!("✔ 結果を保存: {}", output.display());
    }

    match last_error {
        // 1枚でも成功していれば続行扱い
        Some(e) if reports.is_empty() => Err(e),
        _ => {
            println!("\n✅ 診断完了 ({}/{})", reports.len(), total);
            Ok(())
        }
    }
}

async fn send_feedback(client: &ApiClient, diagnosis_id: &str, language: &str) {
    let answer = Confirm::new()
        .with_prompt(t(language, "result.feedback"))
        .default(true)
        .interact_opt();

    let helpful = match answer {
        Ok(Some(helpful)) => helpful,
        Ok(None) => return,
        Err(e) => {
            tracing::warn!(error = %e, "feedback prompt failed");
            return;
        }
    };

    match client.submit_feedback(diagnosis_id, helpful, None).await {
        Ok(true) => println!("✔ {}\n", t(language, "result.thankYou")),
        Ok(false) => println!("⚠ フィードバックは受理されませんでした\n"),
        Err(e) => println!("❌ {}\n", e),
    }
}

async fn list_experts(client: &ApiClient, args: &ExpertArgs, language: &str) -> Result<()> {
    let filters = ExpertFilters {
        location: None,
        kind: args.kind.clone(),
    };
    let experts = with_spinner(&t(language, "common.loading"), client.get_experts(&filters)).await?;

    let locations = expert_locations(&experts);
    if !locations.is_empty() {
        println!("📍 {}", locations.join(" / "));
    }

    let filter = ExpertFilter {
        location: args.location.clone(),
        query: args.search.clone(),
    };
    print!("{}", report::render_experts(&filter.apply(&experts), language));
    Ok(())
}

async fn list_products(client: &ApiClient, args: &ProductArgs, language: &str) -> Result<()> {
    let filters = ProductFilters {
        kind: None,
        disease: args.disease.clone(),
        min_price: args.min_price,
        max_price: args.max_price,
    };
    let products = with_spinner(&t(language, "common.loading"), client.get_products(&filters)).await?;

    let types = product_types(&products);
    if !types.is_empty() {
        println!("🏷 {}", types.join(" / "));
    }

    let filter = ProductFilter {
        kind: args.kind.clone(),
        query: args.search.clone(),
    };
    print!("{}", report::render_products(&filter.apply(&products), language));
    Ok(())
}

fn select_language(current: &str) -> Result<String> {
    let items: Vec<String> = SUPPORTED_LANGUAGES
        .iter()
        .map(|(code, name)| format!("{} ({})", name, code))
        .collect();
    let default = SUPPORTED_LANGUAGES
        .iter()
        .position(|(code, _)| *code == current)
        .unwrap_or(0);

    let index = Select::new()
        .with_prompt(t(current, "nav.language"))
        .items(&items)
        .default(default)
        .interact()
        .map_err(|e| FarmaidError::Prompt(e.to_string()))?;

    Ok(SUPPORTED_LANGUAGES[index].0.to_string())
}

async fn with_spinner<T>(message: &str, task: impl std::future::Future<Output = T>) -> T {
    let spinner = ProgressBar::new_spinner();
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_string());

    let output = task.await;
    spinner.finish_and_clear();
    output
}
