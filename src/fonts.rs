// fonts.rs — find a system font with CJK coverage for the egui UI
//
// egui's built-in fonts only cover Latin. The first candidate that ab_glyph
// can parse is installed in front of both font families; .ttc collections
// that fail to parse are skipped.

use std::path::{Path, PathBuf};

fn candidates() -> Vec<PathBuf> {
    let mut list: Vec<PathBuf> = Vec::new();

    if cfg!(windows) {
        let dir = PathBuf::from(r"C:\Windows\Fonts");
        for f in ["msyh.ttf", "simhei.ttf", "meiryo.ttc", "msgothic.ttc", "arialuni.ttf"] {
            list.push(dir.join(f));
        }
    } else if cfg!(target_os = "macos") {
        for f in [
            "/System/Library/Fonts/PingFang.ttc",
            "/System/Library/Fonts/Hiragino Sans GB.ttc",
            "/System/Library/Fonts/Supplemental/Arial Unicode.ttf",
            "/Library/Fonts/NotoSansSC-Regular.otf",
        ] {
            list.push(PathBuf::from(f));
        }
    } else if cfg!(unix) {
        for f in [
            "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
            "/usr/share/fonts/truetype/noto/NotoSansCJK-Regular.ttc",
            "/usr/share/fonts/opentype/noto/NotoSansSC-Regular.otf",
            "/usr/share/fonts/truetype/wqy/wqy-microhei.ttc",
            "/usr/share/fonts/truetype/wqy/wqy-zenhei.ttc",
        ] {
            list.push(PathBuf::from(f));
        }
        if let Ok(home) = std::env::var("HOME") {
            list.push(Path::new(&home).join(".local/share/fonts/NotoSansSC-Regular.otf"));
        }
    }

    // user-supplied fonts shipped alongside the binary
    let bundled = ["NotoSansSC-Regular.otf", "NotoSansCJK-Regular.ttc"];
    if let Some(dir) = std::env::current_exe().ok().and_then(|e| e.parent().map(Path::to_path_buf)) {
        list.extend(bundled.iter().map(|f| dir.join("assets").join(f)));
    }
    list.extend(bundled.iter().map(|f| Path::new("assets").join(f)));
    list
}

fn parse(path: &Path) -> Option<Vec<u8>> {
    let bytes = std::fs::read(path).ok()?;
    ab_glyph::FontRef::try_from_slice(&bytes).ok()?;
    Some(bytes)
}

pub fn install(ctx: &egui::Context) {
    let Some((path, bytes)) = candidates()
        .into_iter()
        .find_map(|p| parse(&p).map(|b| (p, b)))
    else {
        log::warn!("no CJK-capable UI font found; non-Latin labels may not render");
        return;
    };

    log::info!("ui font: {}", path.display());

    let mut fonts = egui::FontDefinitions::default();
    fonts
        .font_data
        .insert("ui".to_owned(), egui::FontData::from_owned(bytes));
    for family in [egui::FontFamily::Proportional, egui::FontFamily::Monospace] {
        if let Some(list) = fonts.families.get_mut(&family) {
            list.insert(0, "ui".to_owned());
        }
    }
    ctx.set_fonts(fonts);
}
