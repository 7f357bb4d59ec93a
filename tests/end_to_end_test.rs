use anyhow::Result;
use storefront_etl::core::Pipeline;
use storefront_etl::{EtlEngine, LocalStorage, RunConfig, SourceKind, SourcePipeline};
use tempfile::TempDir;

fn run_config(source: SourceKind, input: &str, output: &str) -> RunConfig {
    let mut config = RunConfig::for_source(source);
    config.input_path = input.to_string();
    config.output_path = output.to_string();
    config
}

/// 三筆資料只保留 2019 年且 is_free 有值的那一筆
#[tokio::test]
async fn test_steam_keeps_only_valid_rows() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let raw = concat!(
        "name,release_date,is_free\n",
        "Old Game,\"{'coming_soon': False, 'date': '5 Mar, 2019'}\",False\n",
        "Future Game,\"{'coming_soon': False, 'date': '1 Jan, 2030'}\",False\n",
        "Blank Game,\"{'coming_soon': False, 'date': '5 Mar, 2019'}\",\n",
    );
    std::fs::write(temp_dir.path().join("steam_raw.csv"), raw)?;

    let storage = LocalStorage::new(temp_dir.path().to_str().unwrap());
    let config = run_config(SourceKind::Steam, "steam_raw.csv", "steam_clean.csv");
    let engine = EtlEngine::new(SourcePipeline::new(storage, config));

    let summary = engine.run().await?;
    assert_eq!(summary.row_count, 1);
    assert_eq!(summary.output_path, "steam_clean.csv");

    let output = std::fs::read_to_string(temp_dir.path().join("steam_clean.csv"))?;
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(
        lines[0],
        "name,is_free,genres,categories,effective_date,currency_code,discount_percent,final_price,final_price_usd"
    );
    assert_eq!(lines[1], "Old Game,False,,,2019-03-05,,,,");

    Ok(())
}

#[tokio::test]
async fn test_header_only_input_writes_header_only_output() -> Result<()> {
    let temp_dir = TempDir::new()?;
    std::fs::write(temp_dir.path().join("in.csv"), "name,release_date,is_free\n")?;

    let storage = LocalStorage::new(temp_dir.path().to_str().unwrap());
    let config = run_config(SourceKind::Steam, "in.csv", "out.csv");
    let summary = EtlEngine::new(SourcePipeline::new(storage, config)).run().await?;

    assert_eq!(summary.row_count, 0);
    let output = std::fs::read_to_string(temp_dir.path().join("out.csv"))?;
    assert_eq!(output.lines().count(), 1);
    assert!(output.starts_with("name,is_free,genres"));

    Ok(())
}

#[tokio::test]
async fn test_missing_input_stops_before_writing() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let storage = LocalStorage::new(temp_dir.path().to_str().unwrap());
    let config = run_config(SourceKind::Epic, "nope.json", "epic.csv");
    let pipeline = SourcePipeline::new(storage, config);

    assert!(pipeline.extract().await.is_err());
    assert!(EtlEngine::new(pipeline).run().await.is_err());
    assert!(!temp_dir.path().join("epic.csv").exists());

    Ok(())
}
