//! EcoPulse Common Library
//!
//! CLIとテストで共有される型とユーティリティ（I/Oなし）

pub mod types;
pub mod error;
pub mod parser;
pub mod prompts;
pub mod schema;
pub mod formatter;
pub mod barcode;

pub use types::{EcoScore, EcoScoreResponse, Impact};
pub use error::{Error, Result};
pub use parser::{parse_eco_score_response, strip_code_fences};
pub use prompts::{build_barcode_prompt, build_image_prompt, build_url_prompt};
pub use schema::eco_score_response_schema;
pub use formatter::{overall_score, score_card, ScoreBand, ScoreCard, SubScoreKind};
pub use barcode::{classify, Symbology};
