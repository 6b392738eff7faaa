//! JSON render configuration: display parameters plus label layers.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use cellview_core::{Colormap, DisplayParameters, LabelLayer, LabelMode, Rgb8};
use serde::{Deserialize, Serialize};

use crate::reader::read_labels;
use crate::Result;

/// One label layer as written in a config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSpec {
    pub name: String,
    /// Label mask images; relative paths resolve against the config file.
    pub masks: Vec<PathBuf>,
    #[serde(default)]
    pub mode: LabelMode,
    /// Outline color name or `#rrggbb`. Defaults to the palette color for
    /// the layer's position.
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub width: Option<f32>,
    #[serde(default)]
    pub colormap: Option<Colormap>,
    #[serde(default)]
    pub alpha: Option<f32>,
}

impl LayerSpec {
    #[must_use]
    pub fn new(name: impl Into<String>, masks: Vec<PathBuf>) -> Self {
        Self {
            name: name.into(),
            masks,
            mode: LabelMode::default(),
            color: None,
            width: None,
            colormap: None,
            alpha: None,
        }
    }

    /// Read the masks and build the layer. `index` picks the default color.
    pub fn load(&self, base_dir: &Path, index: usize) -> Result<LabelLayer> {
        let masks = self
            .masks
            .iter()
            .map(|p| read_labels(base_dir.join(p)))
            .collect::<Result<Vec<_>>>()?;
        let mut layer = LabelLayer::for_index(self.name.clone(), masks, index).with_mode(self.mode);
        if let Some(color) = &self.color {
            layer = layer.with_outline_color(color.parse::<Rgb8>()?);
        }
        if let Some(width) = self.width {
            layer = layer.with_line_width(width);
        }
        if let Some(colormap) = self.colormap {
            layer = layer.with_colormap(colormap);
        }
        if let Some(alpha) = self.alpha {
            layer = layer.with_alpha(alpha);
        }
        Ok(layer)
    }
}

/// Everything needed to render a batch of images the same way.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    #[serde(default)]
    pub params: DisplayParameters,
    #[serde(default)]
    pub layers: Vec<LayerSpec>,
    /// Directory that relative mask paths resolve against.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl RenderConfig {
    /// Load from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let reader = BufReader::new(File::open(path)?);
        let mut config: Self = serde_json::from_reader(reader)?;
        config.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        log::debug!(
            "loaded config {} with {} layer(s)",
            path.display(),
            config.layers.len()
        );
        Ok(config)
    }

    /// Parse from a JSON string; relative mask paths resolve against the
    /// working directory.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read every layer's masks.
    pub fn load_layers(&self) -> Result<Vec<LabelLayer>> {
        self.layers
            .iter()
            .enumerate()
            .map(|(index, spec)| spec.load(&self.base_dir, index))
            .collect()
    }
}
