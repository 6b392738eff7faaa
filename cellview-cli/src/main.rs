//! cellview command-line interface.
//!
//! Renders segmented microscopy images for display: contrast, channel
//! compositing, colormaps and label overlays, plus measurement displays,
//! histograms and plate maps.
#![allow(clippy::uninlined_format_args, clippy::too_many_lines)]

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use rayon::prelude::*;
use thiserror::Error;

use cellview_core::{Colormap, ContrastMode, DisplayParameters, ImageKind, LabelLayer, LabelMode};
use cellview_io::{
    read_columns_csv, read_ijv_csv, read_image, read_labels, read_measurements_csv,
    read_plate_csv, write_annotations_json, write_rgb, RenderConfig,
};
use cellview_render::{
    apply_colormap, axis_label, colorbar_ticks, display_data, infer_bounds, pixel_fields,
    plate_data_as_array, render_ijv, render_labels, render_plate, select_plate, ColorRange,
    Compositor, Density, DisplayMode, Histogram, MeasurementDisplay, PlateType, XScale,
    DEFAULT_BINS, DEFAULT_GRIDSIZE,
};

/// Result type for CLI operations.
type Result<T> = std::result::Result<T, CliError>;

/// CLI error types.
#[derive(Error, Debug)]
enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("I/O error: {0}")]
    CellviewIo(#[from] cellview_io::Error),

    #[error("Core error: {0}")]
    Core(#[from] cellview_core::Error),
}

/// How measurements are drawn.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum DisplayStyle {
    /// Values as text at each object
    Text,
    /// Objects filled with a color for their value
    Color,
}

impl From<DisplayStyle> for DisplayMode {
    fn from(style: DisplayStyle) -> Self {
        match style {
            DisplayStyle::Text => DisplayMode::Text,
            DisplayStyle::Color => DisplayMode::Color,
        }
    }
}

/// Display compositing for segmented microscopy images.
#[derive(Parser)]
#[command(name = "cellview")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbose logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render images with label overlays to PNG
    Render {
        /// Input image(s)
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output directory; each input becomes <stem>_display.png
        #[arg(short, long)]
        out_dir: PathBuf,

        /// JSON render configuration (parameters and label layers)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Contrast stretch: raw, normalized or log
        #[arg(long)]
        contrast: Option<ContrastMode>,

        /// Colormap for grayscale images
        #[arg(long)]
        colormap: Option<Colormap>,

        /// Label mask(s), one layer each, drawn after configured layers
        #[arg(short, long)]
        labels: Vec<PathBuf>,

        /// Drawing mode for --labels layers: outline, alpha or none
        #[arg(long, default_value = "outline")]
        mode: LabelMode,

        /// Outline width in pixels for --labels layers
        #[arg(long, default_value = "1.0")]
        line_width: f32,
    },

    /// Draw measurement values over an image
    DisplayData {
        /// Background image
        #[arg(long)]
        image: PathBuf,

        /// CSV with value and optional center_x, center_y columns
        #[arg(long)]
        measurements: PathBuf,

        /// Label mask for color mode
        #[arg(long)]
        labels: Option<PathBuf>,

        /// Output image
        #[arg(short, long)]
        output: PathBuf,

        /// Display style
        #[arg(long, value_enum, default_value = "text")]
        mode: DisplayStyle,

        /// Decimal places in text labels
        #[arg(long, default_value = "2")]
        decimals: usize,

        /// Distance in pixels to move labels off object centers
        #[arg(long, default_value = "0.0")]
        offset: f64,

        /// Colormap for color mode
        #[arg(long, default_value = "jet")]
        colormap: Colormap,

        /// Draw on black instead of the image
        #[arg(long)]
        no_image: bool,
    },

    /// Show shape, kind and value range of an image
    Info {
        /// Input image
        input: PathBuf,

        /// Also print the values under this pixel
        #[arg(long, num_args = 2, value_names = ["X", "Y"])]
        at: Option<Vec<f64>>,
    },

    /// Print a histogram of image pixels or a measurement column
    Histogram {
        /// Image, or CSV with a value column
        input: PathBuf,

        /// Number of bins
        #[arg(short, long, default_value_t = DEFAULT_BINS)]
        bins: usize,

        /// Bin the natural log of the values
        #[arg(long)]
        log: bool,
    },

    /// Render the 2-D density of two measurement columns
    Density {
        /// CSV with the two columns
        input: PathBuf,

        /// Column for the x axis
        #[arg(short, long)]
        x: String,

        /// Column for the y axis
        #[arg(short, long)]
        y: String,

        /// Output image
        #[arg(short, long)]
        output: PathBuf,

        /// Bins along each axis
        #[arg(long, default_value_t = DEFAULT_GRIDSIZE)]
        gridsize: usize,

        /// Bin log10 of the x values
        #[arg(long)]
        log_x: bool,

        /// Bin log10 of the y values
        #[arg(long)]
        log_y: bool,

        /// Color by log10 of the counts
        #[arg(long)]
        log_counts: bool,

        /// Colormap for counts
        #[arg(long, default_value = "jet")]
        colormap: Colormap,
    },

    /// Render per-well values as a plate map
    Plate {
        /// CSV with well, value and optional plate columns
        input: PathBuf,

        /// Plate to draw; defaults to the first plate by name
        #[arg(long)]
        plate: Option<String>,

        /// Output image
        #[arg(short, long)]
        output: PathBuf,

        /// Plate format: 96 or 384
        #[arg(long, default_value = "96")]
        plate_type: PlateType,

        /// Colormap for well values
        #[arg(long, default_value = "jet")]
        colormap: Colormap,
    },

    /// Render a label mask, or an i,j,label CSV, in false color
    Labels {
        /// Label mask image or sparse label CSV
        input: PathBuf,

        /// Output image
        #[arg(short, long)]
        output: PathBuf,

        /// Colormap for object ids
        #[arg(long, default_value = "jet")]
        colormap: Colormap,

        /// Output size for sparse labels; inferred from the entries if omitted
        #[arg(long, num_args = 2, value_names = ["HEIGHT", "WIDTH"])]
        shape: Option<Vec<usize>>,

        /// Shuffle sparse label colors so neighbouring ids differ
        #[arg(long)]
        renumber: bool,
    },
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

/// Output path for a rendered input: `<out_dir>/<stem>_display.png`.
fn display_path(out_dir: &Path, input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map_or_else(|| "image".into(), |s| s.to_string_lossy());
    out_dir.join(format!("{stem}_display.png"))
}

/// Parameters and layers from the optional config file, then the
/// command-line overrides.
fn build_compositor(
    config: Option<&Path>,
    contrast: Option<ContrastMode>,
    colormap: Option<Colormap>,
    labels: &[PathBuf],
    mode: LabelMode,
    line_width: f32,
) -> Result<Compositor> {
    let config = match config {
        Some(path) => RenderConfig::from_json_file(path)?,
        None => RenderConfig::default(),
    };
    let mut params: DisplayParameters = config.params.clone();
    if let Some(contrast) = contrast {
        params = params.with_contrast(contrast);
    }
    if let Some(colormap) = colormap {
        params = params.with_colormap(colormap);
    }

    let mut layers = config.load_layers()?;
    for path in labels {
        let name = path
            .file_stem()
            .map_or_else(|| "labels".to_string(), |s| s.to_string_lossy().into_owned());
        let layer = LabelLayer::for_index(name, vec![read_labels(path)?], layers.len())
            .with_mode(mode)
            .with_line_width(line_width);
        layers.push(layer);
    }

    Ok(layers
        .into_iter()
        .fold(Compositor::with_params(params), Compositor::with_layer))
}

fn render_one(compositor: &Compositor, input: &Path, out_dir: &Path) -> Result<PathBuf> {
    let image = read_image(input)?;
    let rgb = compositor.render(&image)?;
    let output = display_path(out_dir, input);
    write_rgb(&output, &rgb)?;
    log::info!("{} -> {}", input.display(), output.display());
    Ok(output)
}

fn run_render(
    inputs: &[PathBuf],
    out_dir: &Path,
    compositor: &Compositor,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(out_dir)?;
    log::debug!(
        "rendering {} image(s) with {} label layer(s)",
        inputs.len(),
        compositor.layers().len()
    );
    inputs
        .par_iter()
        .map(|input| render_one(compositor, input, out_dir))
        .collect()
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

fn histogram_values(input: &Path) -> Result<Vec<f64>> {
    if is_csv(input) {
        return Ok(read_measurements_csv(input)?.values);
    }
    let image = read_image(input)?;
    Ok(image.to_gray().iter().map(|&v| f64::from(v)).collect())
}

/// Write a dense mask, or sparse labels from a CSV, in false color.
fn write_labels_rgb(
    input: &Path,
    output: &Path,
    colormap: Colormap,
    shape: Option<&[usize]>,
    renumber: bool,
) -> Result<()> {
    let rgb = if is_csv(input) {
        let ijv = read_ijv_csv(input)?;
        let shape = match shape {
            Some(&[height, width]) => Some((height, width)),
            _ => None,
        };
        render_ijv(&ijv, shape, colormap, renumber)?
    } else {
        render_labels(&read_labels(input)?, colormap)
    };
    write_rgb(output, &rgb)?;
    Ok(())
}

/// Bin two columns and write the colored grid. `None` when no point
/// survives the axis scales.
fn write_density(
    input: &Path,
    columns: [&str; 2],
    output: &Path,
    gridsize: usize,
    scales: [XScale; 2],
    log_counts: bool,
    colormap: Colormap,
) -> Result<Option<Density>> {
    let table = read_columns_csv(input, &columns)?;
    let points: Vec<(f64, f64)> = table[0].iter().copied().zip(table[1].iter().copied()).collect();
    let Some(density) = Density::compute(&points, gridsize, scales[0], scales[1]) else {
        return Ok(None);
    };
    let image = density.image(log_counts);
    let range = infer_bounds(&image.view(), ContrastMode::Raw).unwrap_or(ColorRange::UNIT);
    write_rgb(output, &apply_colormap(&image.view(), colormap, range))?;
    Ok(Some(density))
}

fn print_info(input: &Path, image: &ImageKind, at: Option<&[f64]>) {
    let (height, width) = image.dim();
    println!("File: {}", input.display());
    println!("Kind: {}", image.kind_name());
    println!("Shape: {} x {} x {}", height, width, image.channels());
    match image.finite_range() {
        Some((lo, hi)) => println!("Range: {} - {}", lo, hi),
        None => println!("Range: no finite values"),
    }

    let ticks = colorbar_ticks(image, &DisplayParameters::new());
    if image.is_color() {
        println!("Colorbar: none for color images");
    } else if !ticks.is_empty() {
        let labels: Vec<&str> = ticks.iter().map(|t| t.label.as_str()).collect();
        println!("Colorbar: {}", labels.join(" "));
    }

    if let Some(&[x, y]) = at {
        let fields = pixel_fields(image, x, y);
        if fields.is_empty() {
            println!("({}, {}) is outside the image", x, y);
        }
        for field in fields {
            println!("{}", field);
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Render {
            inputs,
            out_dir,
            config,
            contrast,
            colormap,
            labels,
            mode,
            line_width,
        } => {
            let compositor = build_compositor(
                config.as_deref(),
                contrast,
                colormap,
                &labels,
                mode,
                line_width,
            )?;
            let written = run_render(&inputs, &out_dir, &compositor)?;
            println!("Rendered {} image(s) to {}", written.len(), out_dir.display());
        }

        Commands::DisplayData {
            image,
            measurements,
            labels,
            output,
            mode,
            decimals,
            offset,
            colormap,
            no_image,
        } => {
            let background = read_image(&image)?;
            let source = read_measurements_csv(&measurements)?.into_source()?;
            let labels = labels.as_deref().map(read_labels).transpose()?;
            let settings = MeasurementDisplay::new()
                .with_mode(mode.into())
                .with_decimals(decimals)
                .with_offset(offset)
                .with_colormap(colormap)
                .with_wants_image(!no_image);

            let render = display_data(&background, labels.as_ref(), &source, &settings)?;
            write_rgb(&output, &render.image)?;
            if !render.annotations.is_empty() {
                let notes = output.with_extension("json");
                write_annotations_json(&notes, &render.annotations)?;
                println!("Annotations: {}", notes.display());
            }
            if let Some((lo, hi)) = render.value_range {
                println!("Value range: {} - {}", lo, hi);
            }
            println!("Wrote {}", output.display());
        }

        Commands::Info { input, at } => {
            let image = read_image(&input)?;
            print_info(&input, &image, at.as_deref());
        }

        Commands::Histogram { input, bins, log } => {
            let scale = if log { XScale::Log } else { XScale::Linear };
            let values = histogram_values(&input)?;
            let name = input
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            let Some(hist) = Histogram::compute(&values, bins, scale) else {
                println!("No valid values to plot");
                return Ok(());
            };
            println!("{}", axis_label(&name, scale));
            for (edges, count) in hist.edges.windows(2).zip(&hist.counts) {
                println!("{:.4}\t{:.4}\t{}", edges[0], edges[1], count);
            }
        }

        Commands::Density {
            input,
            x,
            y,
            output,
            gridsize,
            log_x,
            log_y,
            log_counts,
            colormap,
        } => {
            let scale = |log: bool| if log { XScale::Log } else { XScale::Linear };
            let scales = [scale(log_x), scale(log_y)];
            let columns = [x.as_str(), y.as_str()];
            let Some(density) =
                write_density(&input, columns, &output, gridsize, scales, log_counts, colormap)?
            else {
                println!("No valid values to plot");
                return Ok(());
            };
            let ([x_lo, x_hi], [y_lo, y_hi]) = density.view_limits();
            println!("{}: {} - {}", axis_label(&x, scales[0]), x_lo, x_hi);
            println!("{}: {} - {}", axis_label(&y, scales[1]), y_lo, y_hi);
            if log_counts {
                println!("Colorbar: log10(N)");
            }
            println!("Wrote {} point(s) to {}", density.total(), output.display());
        }

        Commands::Plate {
            input,
            plate,
            output,
            plate_type,
            colormap,
        } => {
            let plates = read_plate_csv(&input)?;
            let (name, wells) = select_plate(&plates, plate.as_deref())?;
            let data = plate_data_as_array(wells, plate_type)?;
            write_rgb(&output, &render_plate(&data, colormap))?;
            println!(
                "Wrote {}-well plate map of {} to {}",
                plate_type,
                name,
                output.display()
            );
        }

        Commands::Labels {
            input,
            output,
            colormap,
            shape,
            renumber,
        } => {
            write_labels_rgb(&input, &output, colormap, shape.as_deref(), renumber)?;
            println!("Wrote {}", output.display());
        }
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    if let Err(e) = run(cli) {
        log::error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cellview_io::write_labels;
    use ndarray::{array, Array3};
    use tempfile::tempdir;

    #[test]
    fn test_cli_parses() {
        use clap::CommandFactory;
        Cli::command().debug_assert();

        let cli = Cli::try_parse_from([
            "cellview", "render", "a.png", "b.png", "-o", "out", "--contrast", "log", "--colormap",
            "viridis", "-l", "nuclei.png", "--mode", "alpha",
        ])
        .unwrap();
        let Commands::Render {
            inputs,
            contrast,
            colormap,
            mode,
            ..
        } = cli.command
        else {
            panic!("expected render");
        };
        assert_eq!(inputs.len(), 2);
        assert_eq!(contrast, Some(ContrastMode::Log));
        assert_eq!(colormap, Some(Colormap::Viridis));
        assert_eq!(mode, LabelMode::Alpha);
    }

    #[test]
    fn test_unknown_colormap_is_rejected() {
        let result = Cli::try_parse_from(["cellview", "render", "a.png", "-o", "out", "--colormap", "rainbow"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_display_path() {
        assert_eq!(
            display_path(Path::new("out"), Path::new("/data/well_A01.tif")),
            PathBuf::from("out/well_A01_display.png")
        );
    }

    #[test]
    fn test_render_batch() {
        let dir = tempdir().unwrap();
        let mut inputs = Vec::new();
        for name in ["one", "two", "three"] {
            let path = dir.path().join(format!("{name}.png"));
            write_rgb(&path, &Array3::from_elem((4, 4, 3), 0.25)).unwrap();
            inputs.push(path);
        }
        let mask = dir.path().join("mask.png");
        write_labels(&mask, &array![[0, 0, 0, 0], [0, 1, 1, 0], [0, 1, 1, 0], [0, 0, 0, 0]]).unwrap();

        let compositor =
            build_compositor(None, None, None, &[mask], LabelMode::Outline, 1.0).unwrap();
        assert_eq!(compositor.layers().len(), 1);

        let out_dir = dir.path().join("rendered");
        let written = run_render(&inputs, &out_dir, &compositor).unwrap();
        assert_eq!(written.len(), 3);
        for path in &written {
            let image = read_image(path).unwrap();
            assert_eq!(image.dim(), (4, 4));
        }
        assert!(out_dir.join("two_display.png").exists());
    }

    #[test]
    fn test_render_missing_input_fails() {
        let dir = tempdir().unwrap();
        let result = run_render(
            &[dir.path().join("missing.png")],
            dir.path(),
            &Compositor::new(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_plate_choice_parses() {
        let cli = Cli::try_parse_from([
            "cellview", "plate", "wells.csv", "-o", "map.png", "--plate", "P2", "--plate-type", "384",
        ])
        .unwrap();
        let Commands::Plate {
            plate, plate_type, ..
        } = cli.command
        else {
            panic!("expected plate");
        };
        assert_eq!(plate.as_deref(), Some("P2"));
        assert_eq!(plate_type, PlateType::Wells384);
    }

    #[test]
    fn test_sparse_labels_render() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("objects.csv");
        std::fs::write(&input, "i,j,label\n0,0,1\n1,2,2\n").unwrap();
        let output = dir.path().join("objects.png");

        write_labels_rgb(&input, &output, Colormap::Gray, Some(&[4, 5][..]), false).unwrap();
        let image = read_image(&output).unwrap();
        assert_eq!(image.dim(), (4, 5));
        assert!(image.is_color());

        write_labels_rgb(&input, &output, Colormap::Gray, None, true).unwrap();
        assert_eq!(read_image(&output).unwrap().dim(), (2, 3));
    }

    #[test]
    fn test_density_output() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("cells.csv");
        std::fs::write(&input, "area,intensity\n1,0.5\n2,0.25\n-3,1\n").unwrap();
        let output = dir.path().join("density.png");
        let linear = [XScale::Linear, XScale::Linear];

        let density =
            write_density(&input, ["area", "intensity"], &output, 8, linear, true, Colormap::Jet)
                .unwrap()
                .unwrap();
        assert_eq!(density.total(), 3);
        assert_eq!(read_image(&output).unwrap().dim(), (8, 8));

        let log_x = [XScale::Log, XScale::Linear];
        let density =
            write_density(&input, ["area", "intensity"], &output, 8, log_x, false, Colormap::Jet)
                .unwrap()
                .unwrap();
        assert_eq!(density.total(), 2);

        assert!(write_density(&input, ["area", "perimeter"], &output, 8, linear, false, Colormap::Jet).is_err());
    }

    #[test]
    fn test_histogram_from_csv() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("area.csv");
        std::fs::write(&path, "value\n1\n2\n\n3\n").unwrap();
        assert_eq!(histogram_values(&path).unwrap(), vec![1.0, 2.0, 3.0]);
    }
}
