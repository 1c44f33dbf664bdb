use anyhow::{Context, Result};
use chartposter::actions::{self, PosterRequest, StageReport};
use chartposter::chart::ChartDataset;
use chartposter::collage::{list_fonts, Columns, FitMode, HexColor, Subset};
use chartposter::configuration::{create_config, get_configuration, ConfigFolder, Settings};
use chartposter::foundation::logging::init_logging;
use chrono::NaiveDate;
use clap::{value_parser, Arg, ArgMatches, Command};
use std::path::PathBuf;

fn week_arg() -> Arg {
    Arg::new("week")
        .long("week")
        .required(true)
        .value_parser(parse_week)
        .help("Chart week as YYYY-MM-DD")
}

fn poster_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("columns")
                .long("columns")
                .value_parser(|s: &str| s.parse::<Columns>())
                .help("Column count or \"auto\""),
        )
        .arg(
            Arg::new("subset")
                .long("subset")
                .value_parser(|s: &str| s.parse::<Subset>())
                .help("small, medium, large or all"),
        )
        .arg(Arg::new("title").long("title").help("Title drawn across the top"))
        .arg(
            Arg::new("subtitle")
                .long("subtitle")
                .help("Smaller line below the title"),
        )
        .arg(
            Arg::new("font")
                .long("font")
                .help("Font file, or a font name inside the fonts folder"),
        )
        .arg(
            Arg::new("background")
                .long("background")
                .value_parser(|s: &str| s.parse::<HexColor>())
                .help("Background colour as #RRGGBB"),
        )
        .arg(
            Arg::new("fit")
                .long("fit")
                .value_parser(|s: &str| s.parse::<FitMode>())
                .help("letterbox or crop"),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .value_parser(value_parser!(PathBuf))
                .help("Where to write the poster"),
        )
}

fn cli() -> Command {
    Command::new("chartposter")
        .about("🎶 Billboard Hot 100 cover art posters 🎶")
        .subcommand(
            Command::new("config").about("🛠️ Create or update the configuration file"),
        )
        .subcommand(
            Command::new("weeks")
                .about("📅 List the chart weeks in the dataset, newest first")
                .arg(
                    Arg::new("limit")
                        .long("limit")
                        .value_parser(value_parser!(usize))
                        .default_value("20"),
                ),
        )
        .subcommand(
            Command::new("performers")
                .about("🎤 Rank performers across the whole dataset")
                .arg(
                    Arg::new("by")
                        .long("by")
                        .value_parser(["appearances", "songs"])
                        .default_value("appearances"),
                )
                .arg(
                    Arg::new("top")
                        .long("top")
                        .value_parser(value_parser!(usize))
                        .default_value("10"),
                ),
        )
        .subcommand(
            Command::new("enrich")
                .about("🔎 Look up one chart week in the catalog and save the snapshot")
                .arg(week_arg()),
        )
        .subcommand(
            Command::new("fetch")
                .about("🖼️ Download the cover art listed in a snapshot")
                .arg(
                    Arg::new("snapshot")
                        .long("snapshot")
                        .required(true)
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("dest")
                        .long("dest")
                        .value_parser(value_parser!(PathBuf)),
                ),
        )
        .subcommand(poster_args(
            Command::new("poster")
                .about("🧩 Compose a poster from a folder of covers")
                .arg(
                    Arg::new("dir")
                        .long("dir")
                        .required(true)
                        .value_parser(value_parser!(PathBuf)),
                ),
        ))
        .subcommand(Command::new("fonts").about("🔤 List the fonts available for titles"))
        .subcommand(poster_args(
            Command::new("run")
                .about("🚀 Enrich, fetch and compose one chart week")
                .arg(week_arg()),
        ))
}

fn parse_week(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| format!("expected a date like 2021-01-02: {e}"))
}

fn poster_request(args: &ArgMatches, dir: PathBuf) -> PosterRequest {
    PosterRequest {
        dir,
        columns: args.get_one::<Columns>("columns").copied(),
        subset: args.get_one::<Subset>("subset").copied().unwrap_or_default(),
        title: args.get_one::<String>("title").cloned(),
        subtitle: args.get_one::<String>("subtitle").cloned(),
        font: args.get_one::<String>("font").cloned(),
        background: args.get_one::<HexColor>("background").copied(),
        fit: args.get_one::<FitMode>("fit").copied(),
        output: args.get_one::<PathBuf>("output").cloned(),
    }
}

fn print_report(report: &StageReport) {
    if report.success {
        println!("\x1b[32m{}\x1b[0m", report.message);
    } else {
        eprintln!("\x1b[1m\x1b[31m{}\x1b[0m", report.message);
    }
}

fn load_settings(cfg_folder: &ConfigFolder) -> Result<Option<Settings>> {
    if !cfg_folder.is_ready() {
        eprintln!(
            "\x1b[1m\x1b[31mConfiguration folder or config.yaml not found. Please run 'chartposter config' first.\x1b[0m"
        );
        return Ok(None);
    }
    let settings = get_configuration(&cfg_folder.config_file)
        .context("Unable to parse configuration file")?;
    init_logging(&settings.logging)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))?;
    Ok(Some(settings))
}

fn open_dataset(settings: &Settings) -> Result<ChartDataset> {
    ChartDataset::open(&settings.dataset_path).with_context(|| {
        format!("Failed to read the chart dataset {}", settings.dataset_path.display())
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = cli().get_matches();
    let cfg_folder = ConfigFolder::new();

    if let Some(("config", _)) = args.subcommand() {
        println!("\x1b[1m\x1b[34mConfiguring chartposter...\x1b[0m");
        return create_config(cfg_folder);
    }
    if args.subcommand().is_none() {
        print_usage();
        return Ok(());
    }

    let Some(settings) = load_settings(&cfg_folder)? else {
        return Ok(());
    };

    let success = match args.subcommand() {
        Some(("weeks", sub)) => {
            let limit = sub.get_one::<usize>("limit").copied().unwrap_or(20);
            let dataset = open_dataset(&settings)?;
            for week in dataset.weeks().into_iter().take(limit) {
                println!("{week}");
            }
            true
        }
        Some(("performers", sub)) => {
            let top = sub.get_one::<usize>("top").copied().unwrap_or(10);
            let dataset = open_dataset(&settings)?;
            let ranking = match sub.get_one::<String>("by").map(String::as_str) {
                Some("songs") => dataset.performer_unique_songs(),
                _ => dataset.performer_appearances(),
            };
            for (rank, entry) in ranking.iter().take(top).enumerate() {
                println!("{:>3}. {} \x1b[33m({})\x1b[0m", rank + 1, entry.performer, entry.count);
            }
            true
        }
        Some(("enrich", sub)) => {
            let Some(week) = sub.get_one::<NaiveDate>("week").copied() else {
                return Ok(());
            };
            println!("\x1b[1m\x1b[34mEnriching chart week {week}...\x1b[0m");
            let report = actions::load_and_enrich(&settings, week).await;
            print_report(&report);
            report.success
        }
        Some(("fetch", sub)) => {
            let Some(snapshot) = sub.get_one::<PathBuf>("snapshot") else {
                return Ok(());
            };
            let dest = sub.get_one::<PathBuf>("dest");
            println!("\x1b[1m\x1b[34mFetching cover art...\x1b[0m");
            let report = actions::fetch_assets(&settings, snapshot, dest.map(PathBuf::as_path)).await;
            print_report(&report);
            report.success
        }
        Some(("poster", sub)) => {
            let Some(dir) = sub.get_one::<PathBuf>("dir").cloned() else {
                return Ok(());
            };
            println!("\x1b[1m\x1b[34mComposing poster...\x1b[0m");
            let report = actions::compose_collage(&settings, &poster_request(sub, dir));
            print_report(&report);
            report.success
        }
        Some(("fonts", _)) => {
            let fonts = list_fonts(&settings.fonts_dir);
            if fonts.is_empty() {
                println!(
                    "\x1b[33mNo .ttf or .otf fonts found in {}\x1b[0m",
                    settings.fonts_dir.display()
                );
            }
            for font in fonts {
                println!("{}", font.display());
            }
            true
        }
        Some(("run", sub)) => {
            let Some(week) = sub.get_one::<NaiveDate>("week").copied() else {
                return Ok(());
            };
            println!("\x1b[1m\x1b[34mBuilding the poster for chart week {week}...\x1b[0m");
            let reports = actions::run(&settings, week, poster_request(sub, PathBuf::new())).await;
            reports.iter().for_each(print_report);
            reports.iter().all(|report| report.success)
        }
        _ => {
            print_usage();
            true
        }
    };

    if !success {
        std::process::exit(1);
    }
    Ok(())
}

fn print_usage() {
    println!("\x1b[1m\x1b[31mInvalid command!\x1b[0m\n");
    println!("📖 Available Commands:");
    println!("  \x1b[1m\x1b[32mchartposter config\x1b[0m              - 🛠️  Create or update configuration file");
    println!("  \x1b[1m\x1b[32mchartposter weeks\x1b[0m               - 📅 List chart weeks");
    println!("  \x1b[1m\x1b[32mchartposter performers\x1b[0m          - 🎤 Rank performers");
    println!("  \x1b[1m\x1b[32mchartposter enrich --week D\x1b[0m     - 🔎 Enrich one week");
    println!("  \x1b[1m\x1b[32mchartposter fetch --snapshot P\x1b[0m  - 🖼️  Download cover art");
    println!("  \x1b[1m\x1b[32mchartposter poster --dir D\x1b[0m      - 🧩 Compose a poster");
    println!("  \x1b[1m\x1b[32mchartposter fonts\x1b[0m               - 🔤 List fonts");
    println!("  \x1b[1m\x1b[32mchartposter run --week D\x1b[0m        - 🚀 All of the above for one week");
    println!("\x1b[33mRun 'chartposter help <command>' for the options of a command.\x1b[0m\n");
}
