use std::path::PathBuf;

use clap::Parser;

use crate::config::{DEFAULT_MODEL_PATH, ViewerConfig};
use crate::gradient::MAX_TEXTURE_SIZE;
use crate::geometry::LoadOptions;

#[derive(Parser, Debug, Clone)]
#[command(name = "cubeview", version)]
#[command(about = "3D model viewer with a camera-facing gradient background", long_about = None)]
pub struct Cli {
    /// Model to open (.glb, .gltf or .stl)
    #[arg(default_value = DEFAULT_MODEL_PATH)]
    pub model: PathBuf,

    #[arg(long, default_value_t = 1280)]
    pub width: u32,

    #[arg(long, default_value_t = 800)]
    pub height: u32,

    #[arg(long, default_value = "cubeview")]
    pub title: String,

    /// Start with auto-rotate on
    #[arg(long)]
    pub auto_rotate: bool,

    /// Start with the gradient background on (wins over --auto-rotate)
    #[arg(long)]
    pub gradient: bool,

    /// Start with mouse orbit controls disabled
    #[arg(long)]
    pub no_orbit: bool,

    /// Start with the light helpers hidden
    #[arg(long)]
    pub hide_helpers: bool,

    /// Side length of the gradient texture in pixels
    #[arg(long, default_value_t = 512, value_parser = clap::value_parser!(u32).range(1..=MAX_TEXTURE_SIZE as i64))]
    pub background_size: u32,

    /// TTF/OTF font for the toolbar labels
    #[arg(long)]
    pub font: Option<PathBuf>,

    /// Move the model's bounding box center to the origin
    #[arg(long)]
    pub center: bool,

    /// Scale the model to fit a unit cube
    #[arg(long)]
    pub normalize: bool,

    /// Convert a Z-up model to Y-up
    #[arg(long)]
    pub upright: bool,
}

impl Cli {
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            center: self.center,
            normalize: self.normalize,
            upright: self.upright,
            scale: None,
        }
    }

    pub fn into_config(self) -> ViewerConfig {
        let mut config = ViewerConfig::new()
            .title(self.title.clone())
            .size(self.width, self.height)
            .load_options(self.load_options())
            .background_size(self.background_size)
            .auto_rotate(self.auto_rotate)
            .orbit_controls(!self.no_orbit)
            .light_helpers(!self.hide_helpers)
            .gradient_background(self.gradient)
            .model(self.model);
        if let Some(font) = self.font {
            config = config.font(font);
        }
        config.toggles = config.toggles.normalized();
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["cubeview"]).unwrap();
        assert_eq!(cli.model, PathBuf::from("cubo/cubopv.glb"));
        assert_eq!((cli.width, cli.height), (1280, 800));
        assert_eq!(cli.background_size, 512);
        assert!(!cli.auto_rotate && !cli.gradient && !cli.no_orbit && !cli.hide_helpers);

        let config = cli.into_config();
        assert!(config.toggles.orbit_enabled);
        assert!(config.toggles.light_helpers_visible);
        assert_eq!(config.load_options, LoadOptions::default());
    }

    #[test]
    fn flags_map_onto_config() {
        let cli = Cli::try_parse_from([
            "cubeview",
            "parts/bracket.stl",
            "--no-orbit",
            "--hide-helpers",
            "--background-size",
            "256",
            "--font",
            "/tmp/font.ttf",
            "--center",
            "--upright",
        ])
        .unwrap();

        let config = cli.into_config();
        assert_eq!(config.model_path, PathBuf::from("parts/bracket.stl"));
        assert!(!config.toggles.orbit_enabled);
        assert!(!config.toggles.light_helpers_visible);
        assert_eq!(config.background_size, 256);
        assert_eq!(config.font_path, Some(PathBuf::from("/tmp/font.ttf")));
        assert!(config.load_options.center && config.load_options.upright);
        assert!(!config.load_options.normalize);
    }

    #[test]
    fn gradient_wins_over_auto_rotate() {
        let config = Cli::try_parse_from(["cubeview", "--auto-rotate", "--gradient"])
            .unwrap()
            .into_config();
        assert!(config.toggles.gradient_background);
        assert!(!config.toggles.auto_rotate);
    }

    #[test]
    fn background_size_is_bounded() {
        assert!(Cli::try_parse_from(["cubeview", "--background-size", "0"]).is_err());
        assert!(Cli::try_parse_from(["cubeview", "--background-size", "5000"]).is_err());
    }
}
