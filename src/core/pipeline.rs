use crate::adapters::{loader, writer};
use crate::core::filter::{RowFilter, Verdict};
use crate::core::profile::{render_value, ColumnSource, SourceProfile};
use crate::core::{ConfigProvider, Dataset, Pipeline, Storage, TransformResult};
use crate::domain::model::{Cell, FilterStats, NormalizedRow};
use crate::utils::error::Result;

/// The four-stage normalization pipeline, parameterized by a `SourceProfile`.
pub struct SourcePipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    profile: SourceProfile,
}

impl<S: Storage, C: ConfigProvider> SourcePipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        let profile = SourceProfile::for_source(config.source());
        Self::with_profile(storage, config, profile)
    }

    pub fn with_profile(storage: S, config: C, profile: SourceProfile) -> Self {
        Self {
            storage,
            config,
            profile,
        }
    }

    pub fn profile(&self) -> &SourceProfile {
        &self.profile
    }

    fn row_filter(&self, data: &Dataset) -> RowFilter {
        // CSV sources only enforce the required field when the column exists.
        let required = self
            .profile
            .required_field
            .clone()
            .filter(|field| data.columns.is_empty() || data.columns.contains(field));
        if required.is_none() && self.profile.required_field.is_some() {
            tracing::debug!(
                "Input has no '{}' column, skipping required-field check",
                self.profile.required_field.as_deref().unwrap_or_default()
            );
        }
        RowFilter::new(required, self.profile.year_rule, self.config.year_window())
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for SourcePipeline<S, C> {
    async fn extract(&self) -> Result<Dataset> {
        let path = self.config.input_path();
        tracing::info!("📥 Loading {} export from {}", self.profile.kind, path);

        let bytes = self.storage.read_file(path).await?;
        let dataset = loader::load(&self.profile.format, &bytes, self.profile.kind.name())?;

        tracing::info!("📥 Loaded {} records", dataset.records.len());
        Ok(dataset)
    }

    async fn transform(&self, data: Dataset) -> Result<TransformResult> {
        let plan = self.profile.column_plan(&data.columns);
        let filter = self.row_filter(&data);
        let date_index = self.profile.date_field_index();
        let labels = self.config.tag_labels();
        let rates = self.config.currency_rates();

        let mut stats = FilterStats {
            input_rows: data.records.len(),
            ..FilterStats::default()
        };
        let mut rows: Vec<NormalizedRow> = Vec::with_capacity(data.records.len());

        for record in &data.records {
            let derived: Vec<Cell> = self
                .profile
                .fields
                .iter()
                .map(|field| field.extractor.extract(record, labels, rates))
                .collect();

            let date = date_index.and_then(|idx| derived[idx].as_str());
            match filter.check(record, date) {
                Verdict::Keep => {}
                Verdict::MissingRequired => {
                    stats.missing_required += 1;
                    continue;
                }
                Verdict::OutsideYearWindow => {
                    stats.outside_year_window += 1;
                    continue;
                }
            }

            let row = plan
                .iter()
                .map(|(_, source)| match source {
                    ColumnSource::Field(idx) => derived[*idx].clone(),
                    // Table cells are written back exactly as read.
                    ColumnSource::Passthrough(column) => match record.raw_cell(column) {
                        Some(raw) => Cell::text(raw),
                        None => record
                            .data
                            .get(column)
                            .map(render_value)
                            .unwrap_or(Cell::Empty),
                    },
                })
                .collect();
            rows.push(row);
        }

        tracing::info!(
            "🔄 Kept {} of {} rows ({} missing required field, {} outside {}-{})",
            rows.len(),
            stats.input_rows,
            stats.missing_required,
            stats.outside_year_window,
            self.config.year_window().min,
            self.config.year_window().max
        );

        Ok(TransformResult {
            columns: plan.into_iter().map(|(name, _)| name).collect(),
            rows,
            stats,
        })
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        let output_path = self.config.output_path().to_string();
        let bytes = writer::to_csv(&result.columns, &result.rows)?;
        self.storage.write_file(&output_path, &bytes).await?;

        tracing::info!("💾 Wrote {} rows to {}", result.rows.len(), output_path);
        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RunConfig;
    use crate::core::profile::SourceKind;
    use crate::utils::error::EtlError;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn with_file(path: &str, data: &str) -> Self {
            let files = HashMap::from([(path.to_string(), data.as_bytes().to_vec())]);
            Self {
                files: Arc::new(Mutex::new(files)),
            }
        }

        async fn get_file(&self, path: &str) -> Option<String> {
            let files = self.files.lock().await;
            files
                .get(path)
                .map(|data| String::from_utf8_lossy(data).into_owned())
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                EtlError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    fn steam_csv() -> &'static str {
        concat!(
            "steam_appid,name,release_date,is_free,genres,price_overview,platforms\n",
            "10,Alpha,\"{'coming_soon': False, 'date': '10 Jun, 2021'}\",False,",
            "\"[{'id': '1', 'description': 'Action'}, {'id': '25', 'description': 'Adventure'}]\",",
            "\"{'currency': 'EUR', 'discount_percent': 10, 'final_formatted': '9,99€'}\",",
            "\"{'windows': True}\"\n",
            "20,Beta,\"{'coming_soon': True, 'date': '1 Jan, 2020'}\",False,[],,\n",
            "30,Gamma,\"{'coming_soon': False, 'date': 'Summer 2019'}\",True,[],",
            "\"{'currency': 'USD', 'discount_percent': 0, 'final_formatted': '$4.99'}\",\n",
            "40,Delta,\"{'coming_soon': False, 'date': '3 Mar, 2017'}\",None,[],,\n",
        )
    }

    #[tokio::test]
    async fn test_steam_transform() {
        let storage = MockStorage::with_file("steam_raw.csv", steam_csv());
        let config = RunConfig::for_source(SourceKind::Steam);
        let pipeline = SourcePipeline::new(storage, config);

        let data = pipeline.extract().await.unwrap();
        let result = pipeline.transform(data).await.unwrap();

        assert_eq!(
            result.columns,
            vec![
                "steam_appid",
                "name",
                "is_free",
                "genres",
                "categories",
                "effective_date",
                "currency_code",
                "discount_percent",
                "final_price",
                "final_price_usd",
            ]
        );
        assert_eq!(result.rows.len(), 2);
        assert_eq!(result.stats.missing_required, 1);
        assert_eq!(result.stats.outside_year_window, 1);

        let alpha = &result.rows[0];
        assert_eq!(alpha[1], Cell::text("Alpha"));
        assert_eq!(alpha[3], Cell::text("Action|Adventure"));
        assert_eq!(alpha[4], Cell::Empty);
        assert_eq!(alpha[5], Cell::text("2021-06-10"));
        assert_eq!(alpha[6], Cell::text("EUR"));
        assert_eq!(alpha[7], Cell::Integer(10));
        assert_eq!(alpha[8], Cell::text("9.99"));
        assert!(matches!(alpha[9], Cell::Amount(_)));

        // Unparsed date text is kept and passes on its embedded year.
        let gamma = &result.rows[1];
        assert_eq!(gamma[5], Cell::text("Summer 2019"));
        assert_eq!(gamma[9], Cell::text("4.99"));
    }

    #[tokio::test]
    async fn test_load_writes_configured_output() {
        let storage = MockStorage::with_file("steam_raw.csv", steam_csv());
        let mut config = RunConfig::for_source(SourceKind::Steam);
        config.output_path = "out/steam.csv".to_string();
        let pipeline = SourcePipeline::new(storage.clone(), config);

        let data = pipeline.extract().await.unwrap();
        let result = pipeline.transform(data).await.unwrap();
        let path = pipeline.load(result).await.unwrap();

        assert_eq!(path, "out/steam.csv");
        let csv = storage.get_file("out/steam.csv").await.unwrap();
        assert!(csv.starts_with("steam_appid,name,is_free,genres,categories,effective_date"));
        assert_eq!(csv.lines().count(), 3);
    }

    #[tokio::test]
    async fn test_missing_input_is_fatal() {
        let storage = MockStorage::with_file("other.csv", "");
        let pipeline = SourcePipeline::new(storage, RunConfig::for_source(SourceKind::Steam));
        assert!(matches!(pipeline.extract().await, Err(EtlError::IoError(_))));
    }
}
