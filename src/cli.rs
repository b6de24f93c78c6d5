use crate::badge::BadgeLevel;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ecopulse")]
#[command(about = "商品写真・URL・バーコードからAIでエコスコアを判定", long_about = None)]
pub struct Cli {
    /// 省略時は対話モード
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// 解析結果をJSONで出力
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 対話モード（メニューから操作）
    Interactive,

    /// 商品写真を解析
    Image {
        /// 画像ファイルのパス
        #[arg(required = true)]
        path: PathBuf,

        /// 既知のバーコード（写真と照合させる）
        #[arg(short, long)]
        barcode: Option<String>,
    },

    /// 商品ページURLを解析
    Url {
        #[arg(required = true)]
        url: String,
    },

    /// バーコード（手入力）を解析
    Barcode {
        #[arg(required = true)]
        code: String,
    },

    /// バーコードスキャナ（キーボード入力型）で読み取って解析
    Scan,

    /// エコバッジPNGを生成
    Badge {
        /// 表示名（省略時 "Eco Hero"）
        #[arg(short, long, default_value = "")]
        name: String,

        /// エコレベル
        #[arg(short, long, value_enum)]
        level: Option<BadgeLevel>,

        /// 保存先ディレクトリ（省略時はダウンロードフォルダ）
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 設定を表示/編集
    Config {
        /// APIキーを設定
        #[arg(long)]
        set_api_key: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}
