use clap::{Args, Parser, Subcommand};
use farmaid_common::Theme;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "farmaid")]
#[command(about = "作物・家畜の病害をAIで診断するクライアント", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// APIのベースURL（設定ファイルより優先）
    #[arg(long, global = true)]
    pub api_url: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 画像（またはフォルダ内の画像）を診断
    Diagnose {
        /// 画像ファイルまたはフォルダ
        #[arg(required = true)]
        path: PathBuf,

        /// 結果の言語（省略時は保存済みの設定）
        #[arg(short, long)]
        language: Option<String>,

        /// 診断結果をJSONで保存
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 診断ごとにフィードバックを尋ねる
        #[arg(long)]
        ask_feedback: bool,
    },

    /// 病害IDから推奨対策を取得
    Recommendations {
        #[arg(required = true)]
        disease_id: String,
    },

    /// 専門家を一覧表示
    Experts(ExpertArgs),

    /// マーケットプレイスの商品を一覧表示
    Products(ProductArgs),

    /// 診断結果へのフィードバックを送信
    Feedback {
        #[arg(required = true)]
        diagnosis_id: String,

        /// 役に立った
        #[arg(long, conflicts_with = "not_helpful", required_unless_present = "not_helpful")]
        helpful: bool,

        /// 役に立たなかった
        #[arg(long)]
        not_helpful: bool,

        /// 補足コメント
        #[arg(short, long)]
        notes: Option<String>,
    },

    /// APIの疎通確認
    Health,

    /// 表示言語を設定（省略時は選択メニュー）
    Language {
        /// en / yo / ig / ha
        code: Option<String>,
    },

    /// テーマを設定 (light/dark)
    Theme {
        #[arg(required = true)]
        theme: Theme,
    },

    /// 設定を表示/編集
    Config {
        /// 設定を表示
        #[arg(long)]
        show: bool,

        /// APIのベースURLを設定
        #[arg(long)]
        set_base_url: Option<String>,

        /// タイムアウト（ミリ秒）を設定
        #[arg(long)]
        set_timeout_ms: Option<u64>,

        /// 認証トークンを保存
        #[arg(long)]
        set_token: Option<String>,

        /// 認証トークンを削除
        #[arg(long)]
        clear_token: bool,
    },

    /// 翻訳テーブルの言語一覧と欠落キー
    Locales {
        /// 欠落キーがあれば失敗にする
        #[arg(long)]
        check: bool,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct ExpertArgs {
    /// 地域で絞り込み（all で全件）
    #[arg(short, long)]
    pub location: Option<String>,

    /// 専門分野の種別（サーバー側で絞り込み）
    #[arg(short = 't', long = "type")]
    pub kind: Option<String>,

    /// 名前・専門分野で検索
    #[arg(short, long, default_value = "")]
    pub search: String,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ProductArgs {
    /// 商品の種類（all で全件）
    #[arg(short = 't', long = "type")]
    pub kind: Option<String>,

    /// 対象の病害
    #[arg(short, long)]
    pub disease: Option<String>,

    #[arg(long)]
    pub min_price: Option<f64>,

    #[arg(long)]
    pub max_price: Option<f64>,

    /// 商品名・説明で検索
    #[arg(short, long, default_value = "")]
    pub search: String,
}
