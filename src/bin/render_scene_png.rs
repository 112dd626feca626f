use chart3d_rs::api::{
    BarChartConfig, BarChartScene, ChartScene, DonutChartConfig, DonutChartScene, HostConfig,
    SceneHost,
};
use chart3d_rs::core::{CategorySeries, DonutChartData, ElementId, ManualClock};
use chart3d_rs::render::CairoRenderer;
use serde::Deserialize;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::PathBuf;

const FRAME_STEP_SECONDS: f64 = 1.0 / 60.0;

#[derive(Debug, Deserialize)]
struct ScenePayload {
    schema_version: u32,
    host: HostConfig,
    chart: ChartPayload,
    #[serde(default)]
    hover: Option<ElementId>,
    /// Simulated time before the snapshot is taken.
    #[serde(default = "default_settle_seconds")]
    settle_seconds: f64,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum ChartPayload {
    Bar {
        series: CategorySeries,
        #[serde(default)]
        config: BarChartConfig,
    },
    Donut {
        data: DonutChartData,
        #[serde(default)]
        config: DonutChartConfig,
    },
}

fn default_settle_seconds() -> f64 {
    3.0
}

#[derive(Debug)]
struct CliArgs {
    input_path: PathBuf,
    output_path: PathBuf,
}

fn main() {
    let _ = chart3d_rs::telemetry::init_default_tracing();
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args = parse_args()?;
    let raw = fs::read_to_string(&args.input_path).map_err(|err| {
        format!(
            "failed to read payload `{}`: {err}",
            args.input_path.display()
        )
    })?;
    let payload: ScenePayload =
        serde_json::from_str(&raw).map_err(|err| format!("failed to parse payload json: {err}"))?;
    if payload.schema_version != 1 {
        return Err(format!(
            "unsupported payload schema version: {}",
            payload.schema_version
        ));
    }

    let scene: Box<dyn ChartScene> = match payload.chart {
        ChartPayload::Bar { series, config } => {
            Box::new(BarChartScene::new(series, config).map_err(|err| err.to_string())?)
        }
        ChartPayload::Donut { data, config } => {
            Box::new(DonutChartScene::new(data, config).map_err(|err| err.to_string())?)
        }
    };

    let renderer =
        CairoRenderer::for_viewport(payload.host.viewport, payload.host.render.pixel_ratio)
            .map_err(|err| err.to_string())?;
    let clock = ManualClock::new(0.0);
    let mut host = SceneHost::new(renderer, payload.host)
        .map_err(|err| err.to_string())?
        .with_clock(clock.clone());
    host.initialize().map_err(|err| err.to_string())?;
    host.mount(scene);
    host.tick();
    host.hover_element(payload.hover);

    let steps = (payload.settle_seconds.max(0.0) / FRAME_STEP_SECONDS).ceil() as usize;
    for _ in 0..steps {
        clock.advance(FRAME_STEP_SECONDS);
        host.tick();
    }
    host.render().map_err(|err| err.to_string())?;

    let file = File::create(&args.output_path).map_err(|err| {
        format!(
            "failed to create output `{}`: {err}",
            args.output_path.display()
        )
    })?;
    let mut writer = BufWriter::new(file);
    host.renderer()
        .write_png(&mut writer)
        .map_err(|err| err.to_string())?;

    println!("done: wrote {}", args.output_path.display());
    Ok(())
}

fn parse_args() -> Result<CliArgs, String> {
    let mut input_path: Option<PathBuf> = None;
    let mut output_path = PathBuf::from("scene.png");

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--input" => {
                let value = args
                    .next()
                    .ok_or_else(|| "missing value for --input".to_owned())?;
                input_path = Some(PathBuf::from(value));
            }
            "--output" => {
                let value = args
                    .next()
                    .ok_or_else(|| "missing value for --output".to_owned())?;
                output_path = PathBuf::from(value);
            }
            "--help" | "-h" => {
                println!("{}", usage_message());
                std::process::exit(0);
            }
            _ => {
                return Err(format!("unknown argument `{arg}`\n\n{}", usage_message()));
            }
        }
    }

    let input_path = input_path.ok_or_else(|| format!("missing --input\n\n{}", usage_message()))?;
    Ok(CliArgs {
        input_path,
        output_path,
    })
}

fn usage_message() -> &'static str {
    "usage: render_scene_png --input <payload.json> [--output <scene.png>]"
}
