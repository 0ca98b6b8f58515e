use crate::domain::model::{AtmRecord, Catalog, GeoPoint};
use crate::utils::error::{FinderError, Result};
use serde::Deserialize;
use std::path::Path;

/// CSV 目錄的一列：`atmId,name,address,latitude,longitude`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CatalogRow {
    atm_id: String,
    name: String,
    address: String,
    latitude: f64,
    longitude: f64,
}

pub async fn load_catalog<P: AsRef<Path>>(path: P) -> Result<Catalog> {
    let path = path.as_ref();
    let data = tokio::fs::read(path).await?;

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    let catalog = match extension.as_deref() {
        Some("csv") => catalog_from_csv(data.as_slice())?,
        Some("json") => catalog_from_json(&data)?,
        _ => {
            return Err(FinderError::invalid_input(format!(
                "unsupported catalog format: {}",
                path.display()
            )))
        }
    };

    tracing::info!("📚 Loaded {} ATMs from {}", catalog.len(), path.display());
    Ok(catalog)
}

pub fn catalog_from_csv<R: std::io::Read>(reader: R) -> Result<Catalog> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    for (index, row) in reader.deserialize::<CatalogRow>().enumerate() {
        let row = row?;
        // 第 1 列是表頭
        let location = GeoPoint::new(row.latitude, row.longitude).map_err(|e| {
            FinderError::invalid_input(format!("catalog row {}: {}", index + 2, e))
        })?;
        records.push(AtmRecord {
            atm_id: row.atm_id,
            name: row.name,
            address: row.address,
            location,
        });
    }

    Catalog::from_records(records)
}

pub fn catalog_from_json(content: &[u8]) -> Result<Catalog> {
    let records: Vec<AtmRecord> = serde_json::from_slice(content)
        .map_err(|e| FinderError::invalid_input(format!("malformed catalog JSON: {}", e)))?;
    Catalog::from_records(records)
}
