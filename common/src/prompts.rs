//! プロンプト生成モジュール
//!
//! 画像・URL・バーコードの3種類の入力に対するプロンプトを生成する。
//! 採点基準と出力指示は共通。

/// 採点基準と出力形式の指示（全プロンプト共通）
const EXPERT_INSTRUCTIONS: &str = r#"Act as an environmental expert. Your analysis should be critical and informative. Provide scores from 0-100 for carbon footprint (production and transport), recyclability (packaging and product), and ethical sourcing (materials and labor).
Also, provide a brief analysis paragraph, quantifiable positive environmental impact statistics (like CO2, trees saved, plastic bottles avoided per year by switching to a better alternative), and suggest 2-3 specific, readily available, more sustainable alternative products, including an estimated price range (e.g., "$15-25").
Return the result in JSON format that adheres to the provided schema. Do not include any markdown formatting like ```json."#;

/// 画像解析用プロンプト
///
/// バーコードが既知なら照合を指示し、未知なら画像からの検出を依頼する。
pub fn build_image_prompt(known_barcode: Option<&str>) -> String {
    let barcode_hint = match known_barcode.map(str::trim).filter(|b| !b.is_empty()) {
        Some(code) => format!("The user-provided barcode is {}. Cross-reference with it.", code),
        None => "If you can detect a barcode in the image, please use it to identify the product.".to_string(),
    };

    format!(
        "Analyze the product in the image and provide an eco-score. {}\n{}",
        barcode_hint, EXPERT_INSTRUCTIONS
    )
}

/// 商品URL解析用プロンプト
pub fn build_url_prompt(product_url: &str) -> String {
    format!(
        "Analyze the product from the following URL: {}.\n{}",
        product_url.trim(),
        EXPERT_INSTRUCTIONS
    )
}

/// バーコード解析用プロンプト
pub fn build_barcode_prompt(barcode: &str) -> String {
    format!(
        "Analyze the product identified by this barcode: {}.\n{}",
        barcode.trim(),
        EXPERT_INSTRUCTIONS
    )
}
