//! unwarpvr CLI: warp HMD stereo frames stored as image files.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use unwarpvr::{
    Channel, Device, DeviceProfile, Eye, InverseSearch, Inverter, OutputSize, SdkVersion,
    UnwarpFilter, WarpConfig, WarpDirection, DEFAULT_EYE_RELIEF,
};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "unwarpvr")]
#[command(about = "Remove or apply HMD lens distortion and chromatic aberration")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Warp an image file.
    Warp(CliWarpArgs),

    /// List the supported devices and their derived optics.
    Devices,

    /// Print per-channel curve values at one squared radius.
    Curve {
        /// Device name (RiftDK1, RiftDK2).
        #[arg(long)]
        device: Device,
        /// SDK version whose lens model is used.
        #[arg(long, default_value = "0.4")]
        sdk: SdkVersion,
        /// Eye-relief dial (0..=10).
        #[arg(long, default_value_t = DEFAULT_EYE_RELIEF)]
        eye_relief: u8,
        /// Squared tan-angle radius.
        #[arg(long)]
        rsq: f32,
    },

    /// Print the effective configuration as JSON.
    PrintConfig(CliConfigArgs),
}

#[derive(Debug, Clone, Args)]
struct CliWarpArgs {
    /// Path to the input image.
    #[arg(long)]
    input: PathBuf,

    /// Path to write the warped image.
    #[arg(long)]
    output: PathBuf,

    #[command(flatten)]
    config: CliConfigArgs,
}

#[derive(Debug, Clone, Args, Default)]
struct CliConfigArgs {
    /// Load a WarpConfig JSON file; flags below override its fields.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Device name (RiftDK1, RiftDK2).
    #[arg(long)]
    device: Option<Device>,

    /// SDK version whose lens model is used (0.2, 0.4).
    #[arg(long)]
    sdk: Option<SdkVersion>,

    /// Eye-relief dial override (0..=10).
    #[arg(long)]
    eye_relief: Option<u8>,

    /// Pre-distort flat content instead of removing distortion.
    /// `--forward=false` restores reverse over a config file.
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    forward: Option<bool>,

    /// Read the right eye from the first source half.
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    swap_eyes: Option<bool>,

    /// The source is a single eye image shared by both outputs.
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    mono: Option<bool>,

    /// Render only the left eye across the full output width.
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    left_eye_only: Option<bool>,

    /// Output size as WxH.
    #[arg(long, value_parser = parse_size, conflicts_with_all = ["width", "height"])]
    size: Option<[u32; 2]>,

    /// Output width in pixels (default: source width).
    #[arg(long)]
    width: Option<u32>,

    /// Output height in pixels (default: source height).
    #[arg(long)]
    height: Option<u32>,

    /// Horizontal output scale.
    #[arg(long)]
    out_scale_w: Option<f32>,

    /// Vertical output scale.
    #[arg(long)]
    out_scale_h: Option<f32>,

    /// Horizontal input scale.
    #[arg(long)]
    in_scale_w: Option<f32>,

    /// Vertical input scale.
    #[arg(long)]
    in_scale_h: Option<f32>,

    /// Source pixel density in pixels per degree (forward only).
    #[arg(long)]
    target_ppd: Option<f32>,
}

fn parse_size(s: &str) -> Result<[u32; 2], String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WxH, got '{}'", s))?;
    let w = w
        .trim()
        .parse::<u32>()
        .map_err(|e| format!("invalid width '{}': {}", w, e))?;
    let h = h
        .trim()
        .parse::<u32>()
        .map_err(|e| format!("invalid height '{}': {}", h, e))?;
    Ok([w, h])
}

impl CliConfigArgs {
    fn to_config(&self) -> CliResult<WarpConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|e| -> CliError {
                    format!("Failed to read config {}: {}", path.display(), e).into()
                })?;
                serde_json::from_str::<WarpConfig>(&text)?
            }
            None => WarpConfig::default(),
        };
        self.apply_overrides(&mut config);
        config.validate()?;
        Ok(config)
    }

    fn apply_overrides(&self, config: &mut WarpConfig) {
        if let Some(device) = self.device {
            config.device = device;
        }
        if let Some(sdk) = self.sdk {
            config.sdk = sdk;
        }
        if self.eye_relief.is_some() {
            config.eye_relief = self.eye_relief;
        }

        let eye = &mut config.eye;
        if let Some(forward) = self.forward {
            eye.direction = if forward {
                WarpDirection::Forward
            } else {
                WarpDirection::Reverse
            };
        }
        if let Some(v) = self.swap_eyes {
            eye.swap_eyes = v;
        }
        if let Some(v) = self.mono {
            eye.mono = v;
        }
        if let Some(v) = self.left_eye_only {
            eye.left_eye_only = v;
        }
        if let Some(v) = self.out_scale_w {
            eye.scale.out_w = v;
        }
        if let Some(v) = self.out_scale_h {
            eye.scale.out_h = v;
        }
        if let Some(v) = self.in_scale_w {
            eye.scale.in_w = v;
        }
        if let Some(v) = self.in_scale_h {
            eye.scale.in_h = v;
        }
        if self.target_ppd.is_some() {
            eye.target_ppd = self.target_ppd;
        }

        if let Some(size) = self.size {
            config.output = OutputSize {
                size: Some(size),
                width: None,
                height: None,
            };
        } else if self.width.is_some() || self.height.is_some() {
            config.output = OutputSize {
                size: None,
                width: self.width.or(config.output.width),
                height: self.height.or(config.output.height),
            };
        }
    }
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Warp(args) => run_warp(&args),
        Commands::Devices => run_devices(),
        Commands::Curve {
            device,
            sdk,
            eye_relief,
            rsq,
        } => run_curve(device, sdk, eye_relief, rsq),
        Commands::PrintConfig(args) => run_print_config(&args),
    }
}

// ── devices ────────────────────────────────────────────────────────────

fn run_devices() -> CliResult<()> {
    println!("supported devices (eye relief {})", DEFAULT_EYE_RELIEF);
    for (device, sdk) in DeviceProfile::known_profiles() {
        let p = DeviceProfile::lookup(device, sdk, DEFAULT_EYE_RELIEF)?;
        let tan = p.tan_angle_scale();
        println!("{} SDK {}", device, sdk);
        println!("  curve:          {}", p.curve.family_name());
        println!(
            "  panel:          {}x{} px, {:.5}x{:.5} m",
            p.resolution[0], p.resolution[1], p.screen_size_m[0], p.screen_size_m[1]
        );
        println!("  tan scale:      {:.4} x {:.4}", tan.x, tan.y);
        println!(
            "  lens offset:    {:+.5} (left eye NDC)",
            p.lens_center_offset(Eye::Left)
        );
        println!("  center ppd:     {:.3}", p.pixels_per_degree());
        println!(
            "  chromatic:      red {:+.5} {:+.5}, blue {:+.5} {:+.5}{}",
            p.chromatic[0],
            p.chromatic[1],
            p.chromatic[2],
            p.chromatic[3],
            if p.uses_eye_relief() {
                " (from eye relief)"
            } else {
                ""
            }
        );
    }
    Ok(())
}

// ── curve ──────────────────────────────────────────────────────────────

fn run_curve(device: Device, sdk: SdkVersion, eye_relief: u8, rsq: f32) -> CliResult<()> {
    let profile = DeviceProfile::lookup(device, sdk, eye_relief)?;
    println!(
        "{} SDK {} ({}), eye relief {}, rsq = {}",
        device,
        sdk,
        profile.curve.family_name(),
        eye_relief,
        rsq
    );
    for channel in Channel::ALL {
        let model = profile.channel_model(channel);
        let inverter = Inverter::new(model, InverseSearch::default());
        let inverse = inverter
            .try_invert(rsq)
            .map(|v| format!("{:.6}", v))
            .unwrap_or_else(|| format!("out of range (limit {:.4})", inverter.usable_limit()));
        println!("{:?}", channel);
        println!("  scale:          {:.6}", model.scale_at(rsq));
        println!("  image rsq:      {:.6}", model.radius_sq_image(rsq));
        println!("  inverse rsq:    {}", inverse);
    }
    Ok(())
}

// ── print-config ───────────────────────────────────────────────────────

fn run_print_config(args: &CliConfigArgs) -> CliResult<()> {
    let config = args.to_config()?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

// ── warp ───────────────────────────────────────────────────────────────

fn run_warp(args: &CliWarpArgs) -> CliResult<()> {
    let config = args.config.to_config()?;

    tracing::info!("Loading image: {}", args.input.display());
    let img = image::open(&args.input).map_err(|e| -> CliError {
        format!("Failed to open image {}: {}", args.input.display(), e).into()
    })?;
    let rgb = img.to_rgb8();
    let (w, h) = rgb.dimensions();
    tracing::info!("Image size: {}x{}", w, h);

    let mut filter = UnwarpFilter::new(config)?;
    let out = filter.process_image(&rgb)?;
    if let Some(cache) = filter.cache() {
        tracing::info!(
            "Warped to {}x{} ({} of {} samples without source)",
            out.width(),
            out.height(),
            cache.sentinel_count(),
            cache.len(),
        );
    }

    out.save(&args.output).map_err(|e| -> CliError {
        format!("Failed to write image {}: {}", args.output.display(), e).into()
    })?;
    tracing::info!("Image written to {}", args.output.display());
    Ok(())
}
