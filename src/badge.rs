//! エコバッジ（PNG）の描画
//!
//! 400×150 のグラデーション背景に葉のアイコン、名前、エコレベルを描く。
//! 図形は tiny-skia、文字は rusttype、PNGエンコードは image クレート。

use crate::config::Config;
use crate::error::{EcoPulseError, Result};
use image::{ImageFormat, RgbaImage};
use lazy_static::lazy_static;
use regex::Regex;
use rusttype::{point, Font, Scale};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tiny_skia::{
    Color, FillRule, GradientStop, LinearGradient, Paint, PathBuilder, Pixmap, Point, Rect,
    SpreadMode, Transform,
};
use tracing::{debug, info, warn};

pub const BADGE_WIDTH: u32 = 400;
pub const BADGE_HEIGHT: u32 = 150;

/// 名前未入力時の表示名
pub const DEFAULT_BADGE_NAME: &str = "Eco Hero";

const GRADIENT_START: [u8; 3] = [0xEC, 0xFD, 0xF5];
const GRADIENT_END: [u8; 3] = [0xD1, 0xFA, 0xE5];
const LEAF_COLOR: [u8; 3] = [0x10, 0xB9, 0x81];
const NAME_COLOR: [u8; 3] = [0x06, 0x5F, 0x46];
const LEVEL_COLOR: [u8; 3] = [0x04, 0x78, 0x57];

/// (通常, 太字) の候補
const SYSTEM_FONTS: &[(&str, &str)] = &[
    (
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    ),
    (
        "/usr/share/fonts/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
    ),
    (
        "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
        "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    ),
    (
        "/System/Library/Fonts/Supplemental/Arial.ttf",
        "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
    ),
    ("C:\\Windows\\Fonts\\arial.ttf", "C:\\Windows\\Fonts\\arialbd.ttf"),
];

lazy_static! {
    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").expect("valid regex");
}

/// エコレベル
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum BadgeLevel {
    #[default]
    APlus,
    A,
    B,
    C,
}

impl BadgeLevel {
    pub const ALL: [BadgeLevel; 4] = [BadgeLevel::APlus, BadgeLevel::A, BadgeLevel::B, BadgeLevel::C];

    pub fn label(&self) -> &'static str {
        match self {
            BadgeLevel::APlus => "A+ (Eco-Champion)",
            BadgeLevel::A => "A (Eco-Advocate)",
            BadgeLevel::B => "B (Eco-Conscious)",
            BadgeLevel::C => "C (Eco-Aware)",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadgeSpec {
    pub name: String,
    pub level: BadgeLevel,
}

impl BadgeSpec {
    /// 空の名前は "Eco Hero"、レベル未選択は最上位
    pub fn new(name: &str, level: Option<BadgeLevel>) -> Self {
        let name = name.trim();
        Self {
            name: if name.is_empty() { DEFAULT_BADGE_NAME.to_string() } else { name.to_string() },
            level: level.unwrap_or_default(),
        }
    }

    pub fn level_line(&self) -> String {
        format!("Eco Level: {}", self.level.label())
    }

    pub fn file_name(&self) -> String {
        badge_file_name(&self.name)
    }
}

/// `ecopulse-badge-<name>.png`（空白の連続とファイル名に使えない文字は `-` に置換）
pub fn badge_file_name(name: &str) -> String {
    let dashed = WHITESPACE_RUN.replace_all(name, "-");
    let safe: String = dashed
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '-',
            c if c.is_control() => '-',
            c => c,
        })
        .collect();
    format!("ecopulse-badge-{}.png", safe)
}

/// バッジ用フォント
pub struct BadgeFonts {
    regular: Font<'static>,
    bold: Option<Font<'static>>,
}

impl BadgeFonts {
    pub fn from_file(path: &Path) -> Result<Self> {
        let regular = read_font(path)?;
        Ok(Self { regular, bold: None })
    }

    /// 設定のフォント → システムフォントの順に探す
    pub fn load(config: &Config) -> Option<Self> {
        if let Some(path) = &config.badge_font {
            match Self::from_file(path) {
                Ok(fonts) => return Some(fonts),
                Err(e) => warn!("Configured badge font unusable ({}): {e}", path.display()),
            }
        }

        let fonts = Self::system();
        if fonts.is_none() {
            warn!("No TrueType font found; the badge will be drawn without text. Set `badge_font` in the config file.");
        }
        fonts
    }

    pub fn system() -> Option<Self> {
        SYSTEM_FONTS.iter().find_map(|(regular, bold)| {
            let regular = read_font(Path::new(regular)).ok()?;
            let bold = read_font(Path::new(bold)).ok();
            debug!("Using system font for badge text");
            Some(Self { regular, bold })
        })
    }

    fn bold(&self) -> &Font<'static> {
        self.bold.as_ref().unwrap_or(&self.regular)
    }
}

fn read_font(path: &Path) -> Result<Font<'static>> {
    let data = std::fs::read(path)?;
    Font::try_from_vec(data)
        .ok_or_else(|| EcoPulseError::Config(format!("Not a TrueType font: {}", path.display())))
}

/// バッジを描画してPNGバイト列を返す
///
/// 描画面を確保できない場合は何もせず `None`。
pub fn render_badge(spec: &BadgeSpec, fonts: Option<&BadgeFonts>) -> Option<Vec<u8>> {
    render_sized(spec, fonts, BADGE_WIDTH, BADGE_HEIGHT)
}

fn render_sized(spec: &BadgeSpec, fonts: Option<&BadgeFonts>, width: u32, height: u32) -> Option<Vec<u8>> {
    let Some(mut pixmap) = Pixmap::new(width, height) else {
        warn!("Badge surface could not be allocated ({}x{})", width, height);
        return None;
    };

    fill_background(&mut pixmap);
    fill_leaf(&mut pixmap);

    if let Some(fonts) = fonts {
        draw_text(&mut pixmap, fonts.bold(), 24.0, &spec.name, (140.0, 60.0), NAME_COLOR);
        draw_text(&mut pixmap, &fonts.regular, 18.0, &spec.level_line(), (140.0, 95.0), LEVEL_COLOR);
    }

    // 背景が不透明なので premultiplied のままでよい
    let image = RgbaImage::from_raw(width, height, pixmap.data().to_vec())?;
    let mut png = Vec::new();
    if let Err(e) = image.write_to(&mut Cursor::new(&mut png), ImageFormat::Png) {
        warn!("Badge PNG encoding failed: {e}");
        return None;
    }
    Some(png)
}

fn fill_background(pixmap: &mut Pixmap) {
    let (w, h) = (pixmap.width() as f32, pixmap.height() as f32);
    let shader = LinearGradient::new(
        Point::from_xy(0.0, 0.0),
        Point::from_xy(w, h),
        vec![
            GradientStop::new(0.0, rgb(GRADIENT_START)),
            GradientStop::new(1.0, rgb(GRADIENT_END)),
        ],
        SpreadMode::Pad,
        Transform::identity(),
    );

    let mut paint = Paint::default();
    match shader {
        Some(shader) => paint.shader = shader,
        None => paint.set_color(rgb(GRADIENT_START)),
    }
    if let Some(rect) = Rect::from_xywh(0.0, 0.0, w, h) {
        pixmap.fill_rect(rect, &paint, Transform::identity(), None);
    }
}

fn fill_leaf(pixmap: &mut Pixmap) {
    let mut pb = PathBuilder::new();
    pb.move_to(75.0, 110.0);
    pb.cubic_to(20.0, 80.0, 60.0, 20.0, 75.0, 40.0);
    pb.cubic_to(90.0, 20.0, 130.0, 80.0, 75.0, 110.0);
    pb.close();
    let Some(path) = pb.finish() else {
        return;
    };

    let mut paint = Paint::default();
    paint.set_color(rgb(LEAF_COLOR));
    paint.anti_alias = true;
    pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
}

/// ベースライン `origin` から文字列を描く
fn draw_text(pixmap: &mut Pixmap, font: &Font, size: f32, text: &str, origin: (f32, f32), color: [u8; 3]) {
    let width = pixmap.width() as i32;
    let height = pixmap.height() as i32;
    let data = pixmap.data_mut();

    for glyph in font.layout(text, Scale::uniform(size), point(origin.0, origin.1)) {
        let Some(bb) = glyph.pixel_bounding_box() else {
            continue;
        };
        glyph.draw(|gx, gy, coverage| {
            let x = bb.min.x + gx as i32;
            let y = bb.min.y + gy as i32;
            if x < 0 || y < 0 || x >= width || y >= height {
                return;
            }
            let i = ((y * width + x) * 4) as usize;
            for (c, &target) in color.iter().enumerate() {
                let base = data[i + c] as f32;
                data[i + c] = (base + (target as f32 - base) * coverage).round() as u8;
            }
        });
    }
}

fn rgb([r, g, b]: [u8; 3]) -> Color {
    Color::from_rgba8(r, g, b, 255)
}

/// バッジを保存（描画できなかった場合は `Ok(None)`）
pub fn save_badge(spec: &BadgeSpec, fonts: Option<&BadgeFonts>, dir: &Path) -> Result<Option<PathBuf>> {
    let Some(png) = render_badge(spec, fonts) else {
        return Ok(None);
    };

    std::fs::create_dir_all(dir)?;
    let path = dir.join(spec.file_name());
    std::fs::write(&path, png)?;
    info!("Badge saved: {}", path.display());
    Ok(Some(path))
}
