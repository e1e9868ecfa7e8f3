use base64::Engine as _;
use serde::Serialize;
use std::io::{Read, Write};
use std::path::PathBuf;
use xmlchart::ChartType;
use xmlchart::color::parse_color;
use xmlchart::render::{
    Chart, ChartRenderer, Diagnostics, HttpStreamSink, ImageFormat, RenderError,
};

const EMPTY_CONFIGURATION: &str = "<configuration/>";

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Render(RenderError),
    Json(serde_json::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Render(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<RenderError> for CliError {
    fn from(value: RenderError) -> Self {
        Self::Render(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Command {
    #[default]
    Render,
    Stream,
    Inspect,
    Types,
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    chart_type: Option<String>,
    config: Option<String>,
    input: Option<String>,
    out: Option<String>,
    scale: f32,
    background: Option<String>,
    base64: bool,
    pretty: bool,
    verbose: bool,
}

#[derive(Serialize)]
struct InspectOut<'a> {
    chart_type: &'a str,
    image_type: &'a str,
    content_type: &'a str,
    diagnostics: &'a Diagnostics,
    chart: &'a Chart,
}

fn usage() -> &'static str {
    "xmlchart-cli\n\
\n\
USAGE:\n\
  xmlchart-cli [render] --type <chart-type> [--config <path>] [--out <path>] [--scale <n>] [--background <color>] [--base64] [-v] [<data>|-]\n\
  xmlchart-cli stream --type <chart-type> [--config <path>] [--out <path>] [-v] [<data>|-]\n\
  xmlchart-cli inspect --type <chart-type> [--config <path>] [--pretty] [-v] [<data>|-]\n\
  xmlchart-cli types\n\
\n\
NOTES:\n\
  - If <data> is omitted or '-', the dataset XML is read from stdin.\n\
  - Without --config an empty <configuration/> is used (PNG, 400x300).\n\
  - The image format comes from the <imageType> setting (png, jpeg, svg, svgz).\n\
  - render writes next to the data file with the format's extension (or ./out.<ext> for stdin);\n\
    --base64 prints the encoded image as base64 text instead.\n\
  - stream prints an HTTP-style header block followed by the body.\n\
  - inspect prints the assembled chart model and diagnostics as JSON.\n\
  - -v enables debug logging on stderr (RUST_LOG overrides).\n\
"
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args {
        scale: 1.0,
        ..Default::default()
    };

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "render" => args.command = Command::Render,
            "stream" => args.command = Command::Stream,
            "inspect" => args.command = Command::Inspect,
            "types" => args.command = Command::Types,
            "--pretty" => args.pretty = true,
            "--base64" => args.base64 = true,
            "-v" | "--verbose" => args.verbose = true,
            "--type" => {
                let Some(t) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.chart_type = Some(t.clone());
            }
            "--config" => {
                let Some(path) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.config = Some(path.clone());
            }
            "--out" => {
                let Some(out) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.out = Some(out.clone());
            }
            "--scale" => {
                let Some(scale) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.scale = scale.parse::<f32>().map_err(|_| CliError::Usage(usage()))?;
                if !(args.scale.is_finite() && args.scale > 0.0) {
                    return Err(CliError::Usage(usage()));
                }
            }
            "--background" => {
                let Some(bg) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                if !bg.trim().is_empty() {
                    args.background = Some(bg.trim().to_string());
                }
            }
            "--" => {
                if let Some(rest) = it.next() {
                    if args.input.is_some() {
                        return Err(CliError::Usage(usage()));
                    }
                    args.input = Some(rest.clone());
                }
                if it.next().is_some() {
                    return Err(CliError::Usage(usage()));
                }
            }
            "-" => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some("-".to_string());
            }
            other if other.starts_with('-') => return Err(CliError::Usage(usage())),
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }

    if args.command != Command::Types && args.chart_type.is_none() {
        return Err(CliError::Usage(usage()));
    }
    if args.config.as_deref() == Some("-") && matches!(args.input.as_deref(), None | Some("-")) {
        return Err(CliError::Usage("configuration and dataset cannot both come from stdin"));
    }

    Ok(args)
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init();
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

fn read_config(config: Option<&str>) -> Result<String, CliError> {
    match config {
        None => Ok(EMPTY_CONFIGURATION.to_string()),
        Some(path) => read_input(Some(path)),
    }
}

fn default_out_path(input: Option<&str>, ext: &str) -> PathBuf {
    match input {
        Some(path) if path != "-" => PathBuf::from(path).with_extension(ext),
        _ => PathBuf::from(format!("out.{ext}")),
    }
}

fn build_renderer(args: &Args) -> Result<ChartRenderer, CliError> {
    let mut renderer = ChartRenderer::new();
    renderer.raster.scale = args.scale;
    if let Some(bg) = args.background.as_deref() {
        let color = parse_color(bg).ok_or(CliError::Usage("invalid --background color"))?;
        renderer.raster.background = Some(color);
    }
    Ok(renderer)
}

fn report(diagnostics: &Diagnostics) {
    for d in diagnostics {
        eprintln!("warning: {}: {:?}: {}", d.field, d.value, d.message);
    }
}

fn run(args: Args) -> Result<(), CliError> {
    init_logging(args.verbose);

    if args.command == Command::Types {
        for t in ChartType::ALL {
            println!("{}\t{}", t.as_str(), t.dataset_kind());
        }
        return Ok(());
    }

    let chart_type = args.chart_type.as_deref().unwrap_or_default();
    let configuration = read_config(args.config.as_deref())?;
    let data = read_input(args.input.as_deref())?;
    let renderer = build_renderer(&args)?;

    match args.command {
        Command::Render => {
            let Some(image) =
                renderer.render_image(chart_type, Some(&configuration), Some(&data))?
            else {
                return Ok(());
            };
            report(&image.diagnostics);
            if args.base64 {
                let text = base64::engine::general_purpose::STANDARD.encode(&image.bytes);
                match args.out.as_deref() {
                    None => println!("{text}"),
                    Some(path) => std::fs::write(path, text)?,
                }
                return Ok(());
            }
            let out = args.out.map(PathBuf::from).unwrap_or_else(|| {
                default_out_path(args.input.as_deref(), image.format.extension())
            });
            std::fs::write(&out, &image.bytes)?;
            Ok(())
        }
        Command::Stream => {
            let diagnostics = match args.out.as_deref() {
                None => {
                    let stdout = std::io::stdout().lock();
                    let mut sink = HttpStreamSink::new(stdout);
                    renderer.stream_render(chart_type, Some(&configuration), Some(&data), &mut sink)?
                }
                Some(path) => {
                    let file = std::io::BufWriter::new(std::fs::File::create(path)?);
                    let mut sink = HttpStreamSink::new(file);
                    let diagnostics = renderer.stream_render(
                        chart_type,
                        Some(&configuration),
                        Some(&data),
                        &mut sink,
                    )?;
                    sink.into_inner().flush()?;
                    diagnostics
                }
            };
            report(&diagnostics);
            Ok(())
        }
        Command::Inspect => {
            let (settings, assembled) = renderer.build(chart_type, &configuration, &data)?;
            let format = ImageFormat::from_name(&settings.image_type);
            let out = InspectOut {
                chart_type,
                image_type: format.extension(),
                content_type: format.content_type(),
                diagnostics: &assembled.diagnostics,
                chart: &assembled.chart,
            };
            let stdout = std::io::stdout().lock();
            if args.pretty {
                serde_json::to_writer_pretty(stdout, &out)?;
            } else {
                serde_json::to_writer(stdout, &out)?;
            }
            println!();
            Ok(())
        }
        Command::Types => Ok(()),
    }
}

fn main() {
    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = run(args) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        std::iter::once("xmlchart-cli")
            .chain(args.iter().copied())
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn render_is_the_default_command() {
        let args = parse_args(&argv(&["--type", "BarChart", "data.xml"])).unwrap();
        assert_eq!(args.command, Command::Render);
        assert_eq!(args.chart_type.as_deref(), Some("BarChart"));
        assert_eq!(args.input.as_deref(), Some("data.xml"));
    }

    #[test]
    fn types_needs_no_chart_type() {
        let args = parse_args(&argv(&["types"])).unwrap();
        assert_eq!(args.command, Command::Types);
    }

    #[test]
    fn missing_chart_type_is_a_usage_error() {
        assert!(matches!(
            parse_args(&argv(&["render", "data.xml"])),
            Err(CliError::Usage(_))
        ));
    }

    #[test]
    fn both_documents_on_stdin_is_a_usage_error() {
        assert!(matches!(
            parse_args(&argv(&["--type", "PieChart", "--config", "-"])),
            Err(CliError::Usage(_))
        ));
    }

    #[test]
    fn default_out_path_follows_the_data_file() {
        assert_eq!(
            default_out_path(Some("dir/sales.xml"), "svgz"),
            PathBuf::from("dir/sales.svgz")
        );
        assert_eq!(default_out_path(None, "png"), PathBuf::from("out.png"));
    }
}
