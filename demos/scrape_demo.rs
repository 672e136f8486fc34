use job_scraper::{JobScraper, Scraper, ScraperConfig, SearchParameters, Source};

#[tokio::main]
async fn main() {
    // ログ設定
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    // 環境変数で対象サイトを切り替え（既定は reed）
    let source: Source = std::env::var("JOB_SOURCE")
        .unwrap_or_else(|_| "reed".to_string())
        .parse()
        .expect("JOB_SOURCE must be reed or indeed");

    let config = ScraperConfig::new()
        .with_output_dir("./jobs")
        .with_headless(false); // デバッグ用に表示モード

    let mut scraper = JobScraper::new(source, config);
    let params = SearchParameters::new("javascript developer", "london").with_max_pages(2);

    println!("=== {} Scraper Demo ===", source);

    match scraper.execute(&params).await {
        Ok(harvest) => {
            println!("終了理由: {:?}", harvest.stop);
            if harvest.records.is_empty() {
                println!("保存する求人がありません");
                return;
            }
            match scraper.save(&harvest.records, &params) {
                Ok((json, csv)) => println!("成功! {}件 -> {:?}, {:?}", harvest.records.len(), json, csv),
                Err(e) => eprintln!("保存エラー: {}", e),
            }
        }
        Err(e) => {
            eprintln!("エラー: {}", e);
        }
    }
}
