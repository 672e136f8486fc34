use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tower::Service;
use tracing::error;
use tracing_subscriber::EnvFilter;

use job_scraper::overpass::DEFAULT_RADIUS_M;
use job_scraper::{
    DirectionsQuery, OverpassClient, ScrapeRequest, ScraperConfig, ScraperError, ScraperService,
    Source, TransitClient, TransitConfig, TransportType,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Reed/Indeed 求人スクレイパー")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 求人を収集して JSON / CSV に保存
    Scrape {
        /// reed | indeed
        #[arg(short, long, default_value = "reed")]
        source: Source,

        #[arg(short, long, default_value = "javascript developer")]
        query: String,

        #[arg(short, long, default_value = "london")]
        location: String,

        /// 0以下なら何も取得しない
        #[arg(short, long, default_value_t = 1, allow_negative_numbers = true)]
        max_pages: i64,

        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// ブラウザを表示して実行
        #[arg(long)]
        headed: bool,

        /// 結果が出ない時にスクリーンショットをログ出力
        #[arg(long)]
        debug: bool,
    },

    /// ODPT から交通データを取得（省略時は全種別）
    Transit {
        /// train | bus | aircraft
        transport: Option<TransportType>,
    },

    /// 乗換案内を取得
    Directions {
        #[arg(long, default_value = "shinjuku")]
        origin: String,

        #[arg(long, default_value = "chiba")]
        destination: String,

        #[arg(long, default_value = "ja")]
        language: String,
    },

    /// 周辺の建物ポリゴンを取得
    Buildings {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        #[arg(long, allow_hyphen_values = true)]
        lng: f64,

        #[arg(long, default_value_t = DEFAULT_RADIUS_M)]
        radius: u32,
    },
}

async fn run(command: Command) -> Result<(), ScraperError> {
    match command {
        Command::Scrape {
            source,
            query,
            location,
            max_pages,
            output_dir,
            headed,
            debug,
        } => {
            let config = ScraperConfig::new()
                .with_output_dir(output_dir)
                .with_headless(!headed)
                .with_debug(debug);
            let request = ScrapeRequest::new(source, query, location)
                .with_config(config)
                .with_max_pages(max_pages);

            let result = ScraperService::new().call(request).await?;
            println!(
                "{} jobs from {} pages ({:?})",
                result.records, result.pages_visited, result.stop
            );
            if let (Some(json), Some(csv)) = (&result.json_path, &result.csv_path) {
                println!("JSON: {}", json.display());
                println!("CSV:  {}", csv.display());
            }
        }
        Command::Transit { transport } => {
            let client = TransitClient::new(TransitConfig::from_env())?;
            let data = match transport {
                Some(transport) => client.fetch_transport_data(transport).await?,
                None => serde_json::to_value(client.fetch_all().await)?,
            };
            println!("{}", serde_json::to_string_pretty(&data)?);
        }
        Command::Directions {
            origin,
            destination,
            language,
        } => {
            let client = TransitClient::new(TransitConfig::from_env())?;
            let query = DirectionsQuery::new(origin, destination).with_language(language);
            let data = client.fetch_directions(&query).await?;
            println!("{}", serde_json::to_string_pretty(&data)?);
        }
        Command::Buildings { lat, lng, radius } => {
            let client = OverpassClient::new()?.with_radius(radius);
            let buildings = client.fetch_buildings(lat, lng).await?;
            println!("{}", serde_json::to_string_pretty(&buildings)?);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    // .env があれば読み込む（APIキーなど）
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,job_scraper=debug")),
        )
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli.command).await {
        error!("{}", e);
        eprintln!("エラー: {}", e);
        std::process::exit(1);
    }
}
